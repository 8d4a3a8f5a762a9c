//! Hot-restart snapshot: the minimal serializable state needed to resume a
//! run later — megaiteration counter, barrier, mesh, RNG triple, and
//! evaluation counters. Cache serialization is orthogonal and not part of
//! this shape. File I/O itself is out of scope; only the serializable
//! shape is built here, round-tripped with `serde_json` in tests.

use serde::{Deserialize, Serialize};

use super::barrier::BarrierSnapshot;
use super::error::NomadError;
use super::mesh::MeshSnapshot;

/// Evaluation counters carried across a hot restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalCounters {
    pub bb_evals: usize,
    pub cache_hits: usize,
}

/// The full hot-restart snapshot of one running algorithm instance.
/// Deliberately carries no simplex state: resuming mid-Nelder-Mead
/// iteration would need to serialize a live simplex and its reflective
/// state, so callers must not capture or apply this snapshot while
/// `NM_SEARCH` is the active search — see
/// [`forbid_during_nelder_mead_search`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotRestartState {
    pub megaiteration: usize,
    pub barrier: BarrierSnapshot,
    pub mesh: MeshSnapshot,
    pub rng_seed: (u32, u32, u32),
    pub eval_counters: EvalCounters,
}

/// Guards the hot-restart entry point: `HotRestartState` has no field for
/// mid-Nelder-Mead-Search state, so capturing or applying it while that
/// search is active would silently drop the simplex.
pub fn forbid_during_nelder_mead_search(current_search_is_nelder_mead: bool) -> Result<(), NomadError> {
    if current_search_is_nelder_mead {
        return Err(NomadError::InitializationFailure(
            "cannot capture or apply hot-restart state while NM_SEARCH is active".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::barrier::ProgressiveBarrier;
    use crate::core::eval_point::{EvalPoint, StepTag};
    use crate::core::mesh::GMesh;
    use crate::core::point::Point;
    use crate::core::scalar::D;
    use crate::core::vector::{AoD, HNorm};

    fn sample_state() -> HotRestartState {
        let mut barrier = ProgressiveBarrier::new(D::Value(5.0));
        let mut ep = EvalPoint::new(Point::new(AoD::defined(vec![1.0, 2.0])), StepTag::Poll);
        ep.set_outputs(AoD::defined(vec![3.0, -1.0]), HNorm::L2);
        barrier.update_with_points(&[ep]);

        let mesh = GMesh::initial(
            &AoD::undefined(2),
            &AoD::undefined(2),
            &AoD::zeros(2),
            AoD::zeros(2),
            Some(AoD::defined(vec![1.0, 1.0])),
            None,
            AoD::defined(vec![1e-9, 1e-9]),
            AoD::defined(vec![1e-9, 1e-9]),
        );

        HotRestartState {
            megaiteration: 12,
            barrier: barrier.snapshot(),
            mesh: mesh.snapshot(),
            rng_seed: (1, 2, 3),
            eval_counters: EvalCounters { bb_evals: 40, cache_hits: 6 },
        }
    }

    #[test]
    fn roundtrips_through_json() {
        let state = sample_state();
        let json = serde_json::to_string(&state).expect("hot-restart state serializes");
        let back: HotRestartState = serde_json::from_str(&json).expect("hot-restart state deserializes");
        assert_eq!(back.megaiteration, 12);
        assert_eq!(back.rng_seed, (1, 2, 3));
        assert_eq!(back.eval_counters.bb_evals, 40);

        let restored_barrier = ProgressiveBarrier::restore(back.barrier);
        assert_eq!(restored_barrier.feasible_incumbents().len(), 1);
        let restored_mesh = GMesh::restore(&back.mesh);
        assert_eq!(restored_mesh.dimension(), 2);
    }

    #[test]
    fn nelder_mead_search_active_is_fatal() {
        assert!(forbid_during_nelder_mead_search(true).is_err());
        assert!(forbid_during_nelder_mead_search(false).is_ok());
    }
}
