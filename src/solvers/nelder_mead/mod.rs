//! Standalone Nelder-Mead driver: builds an initial simplex around `x0`
//! and evolves it through the reflective state machine in
//! [`state`] until a stop condition is met. The same state machine backs
//! the MADS `NM_SEARCH` adapter in
//! [`crate::solvers::mads::search::nelder_mead_search`].

pub mod simplex;
pub mod state;

use crate::core::eval_point::{EvalPoint, StepTag};
use crate::core::error::StopReason;
use crate::core::point::{Point, VariableSpace};
use crate::core::summary::Summary;
use crate::core::vector::{AoD, HNorm};
use crate::traits::Function;
use simplex::Simplex;
use state::{step_expand, step_inside_contract, step_outside_contract, step_reflect, NMAction, NMState, ReflectClassification};

/// The Nelder-Mead reflective coefficients: `delta_R = 1` is fixed, the
/// others are tunable but constrained at construction.
#[derive(Debug, Clone, Copy)]
pub struct NMCoefficients {
    pub delta_e: f64,
    pub delta_oc: f64,
    pub delta_ic: f64,
    pub gamma: f64,
}

impl Default for NMCoefficients {
    fn default() -> Self {
        NMCoefficients {
            delta_e: 2.0,
            delta_oc: 0.5,
            delta_ic: -0.5,
            gamma: 0.5,
        }
    }
}

impl NMCoefficients {
    /// Validates `delta_E > 1`, `0 < delta_OC <= 1`, `delta_IC < 0`,
    /// `gamma in (0,1]`.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.delta_e > 1.0) {
            return Err(format!("NM_DELTA_E must be > 1, got {}", self.delta_e));
        }
        if !(self.delta_oc > 0.0 && self.delta_oc <= 1.0) {
            return Err(format!("NM_DELTA_OC must be in (0,1], got {}", self.delta_oc));
        }
        if !(self.delta_ic < 0.0) {
            return Err(format!("NM_DELTA_IC must be < 0, got {}", self.delta_ic));
        }
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(format!("NM_GAMMA must be in (0,1], got {}", self.gamma));
        }
        Ok(())
    }
}

/// `delta_R` is fixed at `1`; exposed for the MADS `NM_SEARCH` adapter in
/// [`crate::solvers::mads::search::nelder_mead_search`].
pub const DELTA_R: f64 = 1.0;

/// Standalone Nelder-Mead minimizer over a [`VariableSpace`].
pub struct NelderMead {
    space: VariableSpace,
    norm: HNorm,
    coeffs: NMCoefficients,
}

impl NelderMead {
    pub fn new(space: VariableSpace, norm: HNorm) -> Self {
        NelderMead {
            space,
            norm,
            coeffs: NMCoefficients::default(),
        }
    }

    /// Overrides the reflection/shrink coefficients. Panics if they
    /// violate the constraints enforced at construction — callers pick
    /// fixed, known-valid coefficients.
    pub fn with_coefficients(mut self, coeffs: NMCoefficients) -> Self {
        coeffs.validate().expect("invalid Nelder-Mead coefficients");
        self.coeffs = coeffs;
        self
    }

    fn eval(&self, problem: &impl Function, x: AoD, tag: StepTag) -> EvalPoint {
        let mut ep = EvalPoint::new(Point::new(x.clone()), tag);
        match problem.evaluate(&x) {
            Ok(outputs) => ep.set_outputs(outputs, self.norm),
            Err(_) => ep.eval_status = crate::core::eval_point::EvalStatus::Failed,
        }
        ep
    }

    /// Builds the initial `n+1`-point simplex: `x0` plus `x0 + edge*e_i`
    /// for each free coordinate (grounded on
    /// `NMInitializeSimplex::createSimplex`'s axis-aligned construction).
    fn initial_simplex(&self, problem: &impl Function, x0: &AoD, edge: f64) -> (Simplex, usize) {
        let n = x0.len();
        let mut pts = Vec::with_capacity(n + 1);
        pts.push(self.eval(problem, x0.clone(), StepTag::Initial));
        for i in 0..n {
            let mut coords = x0.clone();
            coords.set(i, coords[i] + crate::core::scalar::D::Value(edge));
            let snapped = coords.snap_to_bounds(&self.space.lb, &self.space.ub);
            pts.push(self.eval(problem, snapped, StepTag::Initial));
        }
        let count = pts.len();
        (Simplex::new(pts), count)
    }

    /// Runs the reflective state machine until a stop condition is met,
    /// returning a [`Summary`] of the best point found.
    pub fn minimize(&self, problem: &impl Function, x0: &AoD, max_bb_eval: usize) -> Summary {
        let (mut simplex, mut bb_evals) = self.initial_simplex(problem, x0, 1.0);

        if !simplex.is_full_rank() {
            return self.summary(&simplex, x0, bb_evals, StopReason::InitializationFailed);
        }

        let mut stop: Option<StopReason> = None;
        while stop.is_none() {
            if bb_evals >= max_bb_eval {
                stop = Some(StopReason::MaxBbEvalReached);
                break;
            }

            let y0 = simplex.y0_indices();
            let yn = simplex.yn_indices();

            let centroid = simplex.centroid_excluding_worst();
            let worst = simplex.worst().x.coords().clone();
            let x_r = reflect_point(&centroid, &worst, DELTA_R);
            let x_r = x_r.snap_to_bounds(&self.space.lb, &self.space.ub);
            let ep_r = self.eval(problem, x_r, StepTag::Search(crate::core::eval_point::SearchKind::NelderMead));
            bb_evals += 1;

            let classification = ReflectClassification {
                dominates_all_y0: simplex.dominates_all(&ep_r, &y0),
                dominated_by_yn: simplex.dominated_by_any(&ep_r, &yn) && !yn.is_empty(),
                dominated_count: simplex.count_dominated_by(&ep_r),
            };
            let (mut nm_state, mut action) = step_reflect(classification);

            let mut pending_insert: Option<EvalPoint> = None;
            let mut candidates_for_best: Vec<EvalPoint> = vec![ep_r.clone()];

            loop {
                match action {
                    NMAction::EvaluateExpand => {
                        let x_e = reflect_point(&centroid, &worst, self.coeffs.delta_e);
                        let x_e = x_e.snap_to_bounds(&self.space.lb, &self.space.ub);
                        let ep_e = self.eval(problem, x_e, StepTag::Search(crate::core::eval_point::SearchKind::NelderMead));
                        bb_evals += 1;
                        candidates_for_best.push(ep_e);
                        let (s, a) = step_expand();
                        nm_state = s;
                        action = a;
                    }
                    NMAction::EvaluateOutsideContract => {
                        let x_oc = reflect_point(&centroid, &worst, self.coeffs.delta_oc);
                        let x_oc = x_oc.snap_to_bounds(&self.space.lb, &self.space.ub);
                        let ep_oc = self.eval(problem, x_oc, StepTag::Search(crate::core::eval_point::SearchKind::NelderMead));
                        bb_evals += 1;
                        candidates_for_best.push(ep_oc);
                        let (s, a) = step_outside_contract();
                        nm_state = s;
                        action = a;
                    }
                    NMAction::EvaluateInsideContract => {
                        let x_ic = reflect_point(&centroid, &worst, self.coeffs.delta_ic);
                        let x_ic = x_ic.snap_to_bounds(&self.space.lb, &self.space.ub);
                        let ep_ic = self.eval(problem, x_ic, StepTag::Search(crate::core::eval_point::SearchKind::NelderMead));
                        bb_evals += 1;
                        let dominated_by_yn = simplex.dominated_by_any(&ep_ic, &yn) && !yn.is_empty();
                        let (s, a) = step_inside_contract(dominated_by_yn);
                        nm_state = s;
                        action = a;
                        if matches!(nm_state, NMState::InsertInY) {
                            pending_insert = Some(ep_ic);
                        }
                    }
                    NMAction::InsertBetterOf2 => {
                        let best_candidate = candidates_for_best
                            .iter()
                            .min_by(|a, b| simplex::cmp_fh(a, b))
                            .cloned()
                            .expect("candidates_for_best always has at least one entry");
                        pending_insert = Some(best_candidate);
                        action = NMAction::InsertCandidate;
                        continue;
                    }
                    NMAction::InsertCandidate => {
                        let candidate = pending_insert.take().unwrap_or_else(|| ep_r.clone());
                        match simplex.try_insert(candidate) {
                            Some(new_simplex) => {
                                simplex = new_simplex;
                                nm_state = NMState::Continue;
                            }
                            None => {
                                nm_state = NMState::Shrink;
                            }
                        }
                        break;
                    }
                    NMAction::ShrinkSimplex => {
                        nm_state = NMState::Shrink;
                        break;
                    }
                    NMAction::None => break,
                }
            }

            if nm_state == NMState::Shrink {
                let targets = simplex.shrink_targets(self.coeffs.gamma);
                let old_points = simplex.points().to_vec();
                let mut shrunk = Vec::with_capacity(targets.len());
                let mut stalled = false;
                for (i, (old, target)) in old_points.iter().zip(targets).enumerate() {
                    if bb_evals >= max_bb_eval {
                        stop = Some(StopReason::MaxBbEvalReached);
                        shrunk.push(old.clone());
                        continue;
                    }
                    let snapped = target.snap_to_bounds(&self.space.lb, &self.space.ub);
                    // A non-first point that fails to move is too close to
                    // shrink further; stop here rather than insert a
                    // degenerate simplex.
                    if i > 0 && snapped == *old.x.coords() {
                        stop = Some(StopReason::NmStopNoShrink);
                        stalled = true;
                        break;
                    }
                    let ep = self.eval(problem, snapped, StepTag::Search(crate::core::eval_point::SearchKind::NelderMead));
                    bb_evals += 1;
                    shrunk.push(ep);
                }
                if !stalled {
                    simplex = Simplex::new(shrunk);
                }
            }
        }

        self.summary(&simplex, x0, bb_evals, stop.unwrap_or(StopReason::MaxBbEvalReached))
    }

    fn summary(&self, simplex: &Simplex, x0: &AoD, bb_evals: usize, reason: StopReason) -> Summary {
        let best = simplex.best();
        let x: Vec<f64> = best.x.coords().iter().map(|d| d.to_f64()).collect();
        Summary {
            parameter_names: None,
            message: Summary::stop_reason_message(reason),
            x0: x0.iter().map(|d| d.to_f64()).collect(),
            x,
            fx: best.f.to_f64(),
            h: best.h.to_f64().max(0.0),
            h_max: f64::INFINITY,
            mesh_size: Vec::new(),
            bb_evals,
            cache_hits: 0,
            megaiterations: 0,
            feasible: best.is_feasible(),
        }
    }
}

/// `x_t = y_c + delta*(y_c - y_worst)`.
pub fn reflect_point(centroid: &AoD, worst: &AoD, delta: f64) -> AoD {
    let diff = worst.vectorize(centroid);
    centroid.add(&diff.scale(delta))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;
    use crate::core::point::VariableType;
    use crate::core::scalar::D;
    use crate::test_functions::rosenbrock::Rosenbrock;
    use crate::test_functions::sphere::Sphere;

    fn unconstrained_space(n: usize) -> VariableSpace {
        VariableSpace {
            input_type: vec![VariableType::Continuous; n],
            granularity: AoD::zeros(n),
            lb: AoD::undefined(n),
            ub: AoD::undefined(n),
            fixed: vec![None; n],
        }
    }

    #[rstest]
    #[case(2, 500)]
    #[case(3, 1500)]
    #[case(4, 4000)]
    fn converges_on_sphere(#[case] n: usize, #[case] max_bb_eval: usize) {
        let nm = NelderMead::new(unconstrained_space(n), HNorm::L2);
        let x0 = AoD::defined((0..n).map(|i| 3.0 - i as f64).collect());
        let summary = nm.minimize(&Sphere { n }, &x0, max_bb_eval);
        assert!(summary.fx < 1e-2, "n={n} fx={}", summary.fx);
    }

    #[test]
    fn rosenbrock_end_to_end_scenario() {
        // Nelder-Mead standalone, Rosenbrock n=2.
        let nm = NelderMead::new(unconstrained_space(2), HNorm::L2).with_coefficients(NMCoefficients {
            delta_e: 2.0,
            delta_oc: 0.5,
            delta_ic: -0.5,
            gamma: 0.5,
        });
        let x0 = AoD::defined(vec![-1.2, 1.0]);
        let summary = nm.minimize(&Rosenbrock { n: 2 }, &x0, 400);
        assert!(summary.fx < 1.0, "fx={}", summary.fx);
    }

    #[test]
    fn initial_simplex_is_full_rank_for_nondegenerate_start() {
        let nm = NelderMead::new(unconstrained_space(3), HNorm::L2);
        let x0 = AoD::defined(vec![0.0, 0.0, 0.0]);
        let (simplex, count) = nm.initial_simplex(&Sphere { n: 3 }, &x0, 1.0);
        assert_eq!(count, 4);
        assert!(simplex.is_full_rank());
    }

    #[test]
    fn reflect_point_formula() {
        let centroid = AoD::defined(vec![1.0, 1.0]);
        let worst = AoD::defined(vec![0.0, 0.0]);
        let reflected = reflect_point(&centroid, &worst, 1.0);
        assert_eq!(reflected, AoD::defined(vec![2.0, 2.0]));
    }

    #[test]
    fn reflect_point_formula_at_fractional_delta() {
        let centroid = AoD::defined(vec![1.0 / 3.0, 2.0 / 3.0]);
        let worst = AoD::defined(vec![-1.0, -2.0]);
        let reflected = reflect_point(&centroid, &worst, 0.5);
        assert_relative_eq!(reflected[0].to_f64(), 1.0 / 3.0 + 0.5 * (1.0 / 3.0 + 1.0), epsilon = 1e-12);
        assert_relative_eq!(reflected[1].to_f64(), 2.0 / 3.0 + 0.5 * (2.0 / 3.0 + 2.0), epsilon = 1e-12);
    }

    #[test]
    fn coefficient_validation_rejects_bad_delta_e() {
        let bad = NMCoefficients {
            delta_e: 0.5,
            ..NMCoefficients::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn default_coefficients_are_valid() {
        assert!(NMCoefficients::default().validate().is_ok());
        let _ = D::ZERO;
    }
}
