//! Reference evaluator pools.
//!
//! The core has exactly two suspension points and no other concurrency
//! need, so parallelism here is plain OS threads via
//! `std::thread::scope` rather than an async runtime.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::core::eval_point::EvalPoint;
use crate::core::error::NomadError;
use crate::core::vector::HNorm;
use crate::traits::{EvaluatorPool, Function};

/// Serial reference evaluator: evaluates points one at a time, in order.
/// Deterministic — used in tests that exercise reproducibility.
pub struct SerialEvaluator<'f, F: Function> {
    function: &'f F,
    norm: HNorm,
}

impl<'f, F: Function> SerialEvaluator<'f, F> {
    pub fn new(function: &'f F, norm: HNorm) -> Self {
        SerialEvaluator { function, norm }
    }
}

impl<F: Function + Sync> EvaluatorPool for SerialEvaluator<'_, F> {
    fn evaluate_block(&self, points: &mut [EvalPoint], opportunistic: bool) -> Result<(), NomadError> {
        let mut full_success_seen = false;
        let mut dispatched = 0usize;
        for e in points.iter_mut() {
            if opportunistic && full_success_seen {
                break;
            }
            dispatched += 1;
            match self.function.evaluate(e.x.coords()) {
                Ok(outputs) => {
                    e.set_outputs(outputs, self.norm);
                    if e.is_feasible() {
                        full_success_seen = true;
                    }
                }
                Err(_) => {
                    e.eval_status = crate::core::eval_point::EvalStatus::Failed;
                }
            }
        }
        debug!(dispatched, opportunistic, "serial evaluator block done");
        Ok(())
    }
}

/// Thread-pool evaluator: dispatches the block across `n_threads` OS
/// threads via a scoped spawn, one chunk per thread. Each point is still
/// evaluated exactly once; barrier post-processing downstream is single
/// threaded, so this pool only needs to parallelize the oracle calls
/// themselves.
pub struct ThreadPoolEvaluator<'f, F: Function> {
    function: &'f F,
    norm: HNorm,
    n_threads: usize,
}

impl<'f, F: Function> ThreadPoolEvaluator<'f, F> {
    pub fn new(function: &'f F, norm: HNorm, n_threads: usize) -> Self {
        ThreadPoolEvaluator {
            function,
            norm,
            n_threads: n_threads.max(1),
        }
    }
}

impl<F: Function + Sync> EvaluatorPool for ThreadPoolEvaluator<'_, F>
where
    F::Error: Send,
{
    fn evaluate_block(&self, points: &mut [EvalPoint], opportunistic: bool) -> Result<(), NomadError> {
        let stop = AtomicBool::new(false);
        let chunk_size = points.len().div_ceil(self.n_threads).max(1);

        std::thread::scope(|scope| {
            for chunk in points.chunks_mut(chunk_size) {
                let function = self.function;
                let norm = self.norm;
                let stop = &stop;
                scope.spawn(move || {
                    for e in chunk.iter_mut() {
                        if opportunistic && stop.load(Ordering::Relaxed) {
                            break;
                        }
                        match function.evaluate(e.x.coords()) {
                            Ok(outputs) => {
                                e.set_outputs(outputs, norm);
                                if opportunistic && e.is_feasible() {
                                    stop.store(true, Ordering::Relaxed);
                                }
                            }
                            Err(_) => {
                                e.eval_status = crate::core::eval_point::EvalStatus::Failed;
                            }
                        }
                    }
                });
            }
        });
        debug!(n_threads = self.n_threads, opportunistic, "thread-pool evaluator block done");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::Point;
    use crate::core::vector::AoD;
    use std::convert::Infallible;

    struct Sphere;
    impl Function for Sphere {
        type Error = Infallible;
        fn evaluate(&self, x: &AoD) -> Result<AoD, Infallible> {
            let f: f64 = x.iter().map(|d| d.to_f64().powi(2)).sum();
            Ok(AoD::defined(vec![f]))
        }
    }

    fn trial(x: f64) -> EvalPoint {
        EvalPoint::new(Point::new(AoD::defined(vec![x])), crate::core::eval_point::StepTag::Poll)
    }

    #[test]
    fn serial_evaluates_all_points() {
        let f = Sphere;
        let pool = SerialEvaluator::new(&f, HNorm::L2);
        let mut pts = vec![trial(1.0), trial(2.0), trial(3.0)];
        pool.evaluate_block(&mut pts, false).unwrap();
        assert!(pts.iter().all(|p| p.is_ok()));
        assert_eq!(pts[1].f, crate::core::scalar::D::Value(4.0));
    }

    #[test]
    fn thread_pool_evaluates_all_points() {
        let f = Sphere;
        let pool = ThreadPoolEvaluator::new(&f, HNorm::L2, 4);
        let mut pts: Vec<_> = (0..20).map(|i| trial(i as f64)).collect();
        pool.evaluate_block(&mut pts, false).unwrap();
        assert!(pts.iter().all(|p| p.is_ok()));
    }

    #[test]
    fn opportunistic_stops_dispatch_after_full_success() {
        // x=0 is feasible immediately (no constraints => h == undefined
        // when outputs has only one entry; use a constrained function).
        struct Constrained;
        impl Function for Constrained {
            type Error = Infallible;
            fn evaluate(&self, x: &AoD) -> Result<AoD, Infallible> {
                Ok(AoD::defined(vec![x[0].to_f64(), -1.0]))
            }
        }
        let f2 = Constrained;
        let pool2 = SerialEvaluator::new(&f2, HNorm::L2);
        let mut pts = vec![trial(1.0), trial(2.0), trial(3.0), trial(4.0)];
        pool2.evaluate_block(&mut pts, true).unwrap();
        assert!(pts[0].is_ok());
        assert_eq!(pts[1].eval_status, crate::core::eval_point::EvalStatus::Pending);
        assert_eq!(pts[2].eval_status, crate::core::eval_point::EvalStatus::Pending);
        assert_eq!(pts[3].eval_status, crate::core::eval_point::EvalStatus::Pending);
    }
}
