//! Trial-point set management and the postprocessing hook.

use std::sync::Arc;

use tracing::debug;

use super::barrier::{ProgressiveBarrier, SuccessType};
use super::eval_point::{EvalPoint, EvalStatus, StepTag};
use super::mesh::GMesh;
use super::point::Point;
use super::vector::{AoD, HNorm};
use crate::traits::EvaluatorPool;

/// Holds the trial points generated by one Search/Poll step, deduplicating
/// by `x` and recording provenance.
#[derive(Debug, Default)]
pub struct TrialPointSet {
    points: Vec<EvalPoint>,
}

impl TrialPointSet {
    pub fn new() -> Self {
        TrialPointSet { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[EvalPoint] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [EvalPoint] {
        &mut self.points
    }

    /// `insertTrialPoint`: first insert wins on duplicate `x`.
    pub fn insert_trial_point(
        &mut self,
        x: Point,
        generated_from: Option<Point>,
        gen_step: StepTag,
        mesh: Option<Arc<GMesh>>,
    ) -> bool {
        if self.points.iter().any(|e| e.x == x) {
            return false;
        }
        let mut e = EvalPoint::new(x, gen_step);
        e.generated_from = generated_from;
        e.mesh = mesh;
        self.points.push(e);
        true
    }

    /// Inserts an already-evaluated point (e.g. a cache-search dominator)
    /// directly, skipping the oracle. First insert wins on
    /// duplicate `x`, as in [`Self::insert_trial_point`].
    pub fn insert_evaluated(&mut self, e: EvalPoint) -> bool {
        if self.points.iter().any(|o| o.x == e.x) {
            return false;
        }
        self.points.push(e);
        true
    }

    /// Bound-snap then mesh-project. Returns `false` (and does not insert
    /// anything) if the result collapses onto `center` — the caller must
    /// discard such a candidate.
    pub fn snap_to_bounds_and_project(
        &self,
        candidate: &AoD,
        lb: &AoD,
        ub: &AoD,
        center: &AoD,
        mesh: &GMesh,
    ) -> Option<AoD> {
        let snapped = candidate.snap_to_bounds(lb, ub);
        let projected = mesh.project_on_mesh(&snapped, center);
        if &projected == center {
            None
        } else {
            Some(projected)
        }
    }

    /// Hands every point to the evaluator pool and updates their status.
    pub fn eval_trial_points(&mut self, pool: &dyn EvaluatorPool, opportunistic: bool) {
        if self.points.is_empty() {
            return;
        }
        pool.evaluate_block(&mut self.points, opportunistic)
            .expect("reference evaluator pools do not fail outright; per-point failures are carried in EvalStatus");
        debug!(n = self.points.len(), "trial points evaluated");
    }

    /// Feeds the evaluated set into the barrier, then returns the success
    /// level and the direction of the most-improving accepted point (used
    /// by the caller to decide `mesh.enlarge` vs `mesh.refine`). Clears
    /// the set afterward.
    pub fn post_processing(
        &mut self,
        barrier: &mut ProgressiveBarrier,
        frame_center: &AoD,
        norm: HNorm,
    ) -> (SuccessType, Option<AoD>) {
        let evaluated: Vec<EvalPoint> = self
            .points
            .iter()
            .filter(|e| e.eval_status != EvalStatus::Pending)
            .cloned()
            .collect();
        let success = barrier.update_with_points(&evaluated);

        let best_direction = evaluated
            .iter()
            .filter(|e| e.is_ok())
            .min_by(|a, b| {
                let ka = (a.h != super::scalar::D::ZERO, a.f.value());
                let kb = (b.h != super::scalar::D::ZERO, b.f.value());
                ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|e| frame_center.vectorize(e.x.coords()));

        let _ = norm;
        self.points.clear();
        (success, best_direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::Point;
    use crate::core::scalar::D;

    #[test]
    fn insert_trial_point_dedups_by_x() {
        let mut set = TrialPointSet::new();
        let x = Point::new(AoD::defined(vec![1.0, 2.0]));
        assert!(set.insert_trial_point(x.clone(), None, StepTag::Poll, None));
        assert!(!set.insert_trial_point(x, None, StepTag::Poll, None));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn insert_evaluated_skips_reevaluation() {
        let mut set = TrialPointSet::new();
        let mut e = EvalPoint::new(Point::new(AoD::defined(vec![3.0])), StepTag::Search(crate::core::eval_point::SearchKind::Cache));
        e.set_outputs(AoD::defined(vec![1.0, -1.0]), HNorm::L2);
        assert!(set.insert_evaluated(e.clone()));
        assert!(!set.insert_evaluated(e));
        assert_eq!(set.len(), 1);
        assert_eq!(set.points()[0].eval_status, EvalStatus::Ok);
    }

    #[test]
    fn opportunistic_success_stops_dispatch_and_enlarges_along_winner() {
        // Opportunistic success: a Poll batch of 8 points where
        // point #2 is a full success. The pool dispatches at most 2 oracle
        // calls, the barrier reports one `full` transition, and the mesh
        // enlarges along that point's direction.
        use std::convert::Infallible;
        use std::sync::atomic::{AtomicUsize, Ordering};

        use crate::core::mesh::GMesh;
        use crate::core::scalar::D;
        use crate::evaluator::SerialEvaluator;
        use crate::traits::Function;

        struct CountedBatch {
            calls: AtomicUsize,
        }
        impl Function for CountedBatch {
            type Error = Infallible;
            fn evaluate(&self, x: &AoD) -> Result<AoD, Infallible> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let f = if x[0].to_f64() == 1.0 { -5.0 } else { 20.0 };
                Ok(AoD::defined(vec![f, -1.0]))
            }
        }

        let problem = CountedBatch { calls: AtomicUsize::new(0) };
        let evaluator = SerialEvaluator::new(&problem, HNorm::L2);

        let mut barrier = ProgressiveBarrier::new(D::INF);
        let mut seed = EvalPoint::new(Point::new(AoD::defined(vec![-1.0])), StepTag::Initial);
        seed.set_outputs(AoD::defined(vec![10.0, -1.0]), HNorm::L2);
        barrier.update_with_points(&[seed]);

        let frame_center = AoD::defined(vec![0.0]);
        let mut set = TrialPointSet::new();
        for x in 0..8 {
            set.insert_trial_point(Point::new(AoD::defined(vec![x as f64])), None, StepTag::Poll, None);
        }
        set.eval_trial_points(&evaluator, true);
        assert_eq!(
            problem.calls.load(Ordering::SeqCst),
            2,
            "opportunistic dispatch should stop right after the first full success"
        );

        let (success, direction) = set.post_processing(&mut barrier, &frame_center, HNorm::L2);
        assert_eq!(success, SuccessType::Full);
        let d = direction.expect("a direction is reported on success");
        assert_eq!(d, AoD::defined(vec![1.0]));

        let mut mesh = GMesh::initial(
            &AoD::undefined(1),
            &AoD::undefined(1),
            &frame_center,
            AoD::zeros(1),
            Some(AoD::defined(vec![1.0])),
            None,
            AoD::defined(vec![1e-9]),
            AoD::defined(vec![1e-9]),
        );
        let frame_before = mesh.frame(0).to_f64();
        mesh.enlarge(&d, 0.1, true);
        assert!(mesh.frame(0).to_f64() > frame_before);
    }

    #[test]
    fn collapse_onto_center_is_rejected() {
        let set = TrialPointSet::new();
        let mesh = GMesh::initial(
            &AoD::undefined(1),
            &AoD::undefined(1),
            &AoD::defined(vec![1.0]),
            AoD::zeros(1),
            Some(AoD::defined(vec![1.0])),
            None,
            AoD::defined(vec![1e-9]),
            AoD::defined(vec![1e-9]),
        );
        let center = AoD::defined(vec![0.0]);
        let candidate = AoD::defined(vec![1e-12]);
        let lb = AoD::new(vec![D::Undefined]);
        let ub = AoD::new(vec![D::Undefined]);
        let result = set.snap_to_bounds_and_project(&candidate, &lb, &ub, &center, &mesh);
        assert_eq!(result, None);
    }
}
