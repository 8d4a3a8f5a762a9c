//! The typed parameter surface: one struct of groups (problem, mesh,
//! evaluation, search, control), validated by `check_and_comply`, rather
//! than a stringly-typed bag of entries.

use super::error::NomadError;
use super::point::VariableSpace;
use super::scalar::D;
use super::vector::{AoD, HNorm};
use crate::solvers::nelder_mead::NMCoefficients;

/// Every entry the core consumes, grouped by concern (problem, mesh,
/// evaluation, search, control).
#[derive(Debug, Clone)]
pub struct Parameters {
    pub variable_space: VariableSpace,
    pub x0: AoD,

    pub initial_mesh_size: Option<AoD>,
    pub initial_frame_size: Option<AoD>,
    pub min_mesh_size: AoD,
    pub min_frame_size: AoD,

    pub bb_max_block_size: usize,
    pub max_bb_eval: Option<usize>,
    pub max_eval: Option<usize>,
    pub opportunistic_eval: bool,
    pub h_max_0: D,
    pub h_norm: HNorm,

    pub nm_search: bool,
    pub nm_coefficients: NMCoefficients,
    pub speculative_search_base_factor: f64,
    pub quad_model_search: bool,

    pub seed: u32,
    pub max_iterations: Option<usize>,
    pub max_iteration_per_megaiteration: Option<usize>,
    pub epsilon: f64,
}

impl Parameters {
    /// Builds a parameter set from the two groups with no sane default
    /// (the variable space and the starting point), filling everything
    /// else with sane defaults. `initial_mesh_size`/
    /// `initial_frame_size`/`max_bb_eval` are left unset — exactly one of
    /// the first two, and the third, must be supplied via the `with_*`
    /// builders before `check_and_comply` will accept this set.
    pub fn new(variable_space: VariableSpace, x0: AoD) -> Self {
        let n = variable_space.dimension();
        Parameters {
            variable_space,
            x0,
            initial_mesh_size: None,
            initial_frame_size: None,
            min_mesh_size: AoD::defined(vec![1e-13; n]),
            min_frame_size: AoD::defined(vec![1e-13; n]),
            bb_max_block_size: 1,
            max_bb_eval: None,
            max_eval: None,
            opportunistic_eval: true,
            h_max_0: D::INF,
            h_norm: HNorm::L2,
            nm_search: false,
            nm_coefficients: NMCoefficients::default(),
            speculative_search_base_factor: 2.0,
            quad_model_search: false,
            seed: 0,
            max_iterations: None,
            max_iteration_per_megaiteration: None,
            epsilon: 1e-13,
        }
    }

    pub fn with_initial_frame_size(mut self, frame: AoD) -> Self {
        self.initial_frame_size = Some(frame);
        self
    }

    pub fn with_initial_mesh_size(mut self, mesh: AoD) -> Self {
        self.initial_mesh_size = Some(mesh);
        self
    }

    pub fn with_max_bb_eval(mut self, max_bb_eval: usize) -> Self {
        self.max_bb_eval = Some(max_bb_eval);
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// The initial frame size `Mads::minimize` needs, resolved from
    /// whichever of `initial_frame_size`/`initial_mesh_size` was supplied
    /// (`Delta_0 = delta_0 * sqrt(n)` when only the mesh size is given).
    /// Only meaningful once `check_and_comply` has succeeded.
    pub fn resolved_initial_frame(&self) -> AoD {
        if let Some(frame) = &self.initial_frame_size {
            frame.clone()
        } else {
            let mesh = self
                .initial_mesh_size
                .as_ref()
                .expect("check_and_comply guarantees exactly one of initial_frame_size/initial_mesh_size is set");
            let sqrt_n = (self.variable_space.dimension() as f64).sqrt();
            mesh.scale(sqrt_n)
        }
    }

    /// Validates the variable space itself, then the cross-field rules
    /// specific to this typed surface (conflicting mesh-size parameters, a
    /// required evaluation budget, sane tuning coefficients).
    pub fn check_and_comply(&mut self) -> Result<(), NomadError> {
        self.variable_space.check_and_comply()?;

        let n = self.variable_space.dimension();
        if self.x0.len() != n {
            return Err(NomadError::InvalidParameter("X0 length must match DIMENSION".into()));
        }
        if self.min_mesh_size.len() != n || self.min_frame_size.len() != n {
            return Err(NomadError::InvalidParameter(
                "MIN_MESH_SIZE/MIN_FRAME_SIZE length must match DIMENSION".into(),
            ));
        }

        match (&self.initial_mesh_size, &self.initial_frame_size) {
            (Some(_), Some(_)) => {
                return Err(NomadError::InvalidParameter(
                    "INITIAL_MESH_SIZE and INITIAL_FRAME_SIZE are mutually exclusive".into(),
                ));
            }
            (None, None) => {
                return Err(NomadError::InvalidParameter(
                    "exactly one of INITIAL_MESH_SIZE/INITIAL_FRAME_SIZE must be set".into(),
                ));
            }
            _ => {}
        }

        if self.max_bb_eval.is_none() {
            return Err(NomadError::InvalidParameter("MAX_BB_EVAL must be set".into()));
        }
        if self.bb_max_block_size == 0 {
            return Err(NomadError::InvalidParameter("BB_MAX_BLOCK_SIZE must be >= 1".into()));
        }
        if self.epsilon <= 0.0 {
            return Err(NomadError::InvalidParameter("EPSILON must be > 0".into()));
        }
        match self.h_max_0 {
            D::Value(h) if h > 0.0 => {}
            _ => return Err(NomadError::InvalidParameter("H_MAX_0 must be a positive finite value or INF".into())),
        }
        self.nm_coefficients.validate().map_err(NomadError::InvalidParameter)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::VariableType;

    fn space(n: usize) -> VariableSpace {
        VariableSpace {
            input_type: vec![VariableType::Continuous; n],
            granularity: AoD::zeros(n),
            lb: AoD::undefined(n),
            ub: AoD::undefined(n),
            fixed: vec![None; n],
        }
    }

    #[test]
    fn both_mesh_sizes_set_is_fatal() {
        let mut p = Parameters::new(space(2), AoD::defined(vec![0.0, 0.0]))
            .with_initial_frame_size(AoD::defined(vec![1.0, 1.0]))
            .with_initial_mesh_size(AoD::defined(vec![0.1, 0.1]))
            .with_max_bb_eval(100);
        assert!(p.check_and_comply().is_err());
    }

    #[test]
    fn neither_mesh_size_set_is_fatal() {
        let mut p = Parameters::new(space(2), AoD::defined(vec![0.0, 0.0])).with_max_bb_eval(100);
        assert!(p.check_and_comply().is_err());
    }

    #[test]
    fn missing_max_bb_eval_is_fatal() {
        let mut p = Parameters::new(space(2), AoD::defined(vec![0.0, 0.0])).with_initial_frame_size(AoD::defined(vec![1.0, 1.0]));
        assert!(p.check_and_comply().is_err());
    }

    #[test]
    fn well_formed_parameters_comply() {
        let mut p = Parameters::new(space(2), AoD::defined(vec![0.0, 0.0]))
            .with_initial_frame_size(AoD::defined(vec![1.0, 1.0]))
            .with_max_bb_eval(500);
        assert!(p.check_and_comply().is_ok());
    }

    #[test]
    fn resolves_frame_from_mesh_size() {
        let p = Parameters::new(space(4), AoD::defined(vec![0.0; 4])).with_initial_mesh_size(AoD::defined(vec![1.0; 4]));
        let frame = p.resolved_initial_frame();
        for v in frame.iter() {
            assert!((v.to_f64() - 2.0).abs() < 1e-12);
        }
    }
}
