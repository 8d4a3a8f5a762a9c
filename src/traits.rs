//! External interface contracts: the blackbox oracle, the evaluator pool,
//! and the cache. `Function::evaluate` returns the objective plus the
//! constraint outputs the barrier needs, rather than a single scalar.

use crate::core::eval_point::EvalPoint;
use crate::core::error::NomadError;
use crate::core::point::Point;
use crate::core::vector::AoD;

/// The blackbox oracle: `f(x)` plus constraint outputs, no gradients.
pub trait Function {
    type Error: std::error::Error;

    /// Evaluates the oracle at `x`, returning `[OBJ, CSTR_1, .., CSTR_m]`.
    fn evaluate(&self, x: &AoD) -> Result<AoD, Self::Error>;
}

/// A callable that accepts a block of `m >= 1` trial points and returns,
/// for each, either an output vector or a failed evaluation. Implementations
/// must be thread-safe if the pool is parallel.
pub trait EvaluatorPool: Send + Sync {
    /// Evaluates every point in `points`, writing outputs/status in
    /// place. When `opportunistic` is true, the pool may stop dispatching
    /// further points in the block after the first point it observes to
    /// be a full barrier success (already-dispatched points still run to
    /// completion) — the exact cutoff point is left to the implementer.
    fn evaluate_block(&self, points: &mut [EvalPoint], opportunistic: bool) -> Result<(), NomadError>;
}

/// The cache contract: lookup/insert of previously evaluated points, keyed
/// by `x`.
pub trait Cache: Send + Sync {
    fn find(&self, x: &Point) -> Option<EvalPoint>;
    fn insert(&self, e: EvalPoint) -> usize;
    fn find_best_feas(&self) -> Option<EvalPoint>;
    fn find_best_inf(&self, h_max: crate::core::scalar::D) -> Option<EvalPoint>;
    fn clear(&self);
    fn reset_nb_cache_hits(&self);
    fn nb_cache_hits(&self) -> usize;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn all_points(&self) -> Vec<EvalPoint>;
}
