//! Cache search: synchronizes multiple parallel MADS instances by
//! proposing cached points that already dominate the current incumbents.
//! These carry an evaluation already, so the caller treats them as
//! immediately `full` without a further oracle call.

use crate::core::eval_point::{EvalPoint, SearchKind, StepTag};
use crate::cache::find_dominators;
use crate::traits::Cache;

/// Points in `cache` dominating every point in `incumbents`, retagged with
/// `StepTag::Search(SearchKind::Cache)` provenance.
pub fn cache_search_candidates(cache: &dyn Cache, incumbents: &[EvalPoint]) -> Vec<EvalPoint> {
    find_dominators(cache, incumbents)
        .into_iter()
        .map(|mut e| {
            e.gen_step = StepTag::Search(SearchKind::Cache);
            e
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::core::point::Point;
    use crate::core::vector::{AoD, HNorm};

    fn ok_point(x: f64, f: f64) -> EvalPoint {
        let mut e = EvalPoint::new(Point::new(AoD::defined(vec![x])), StepTag::Poll);
        e.set_outputs(AoD::defined(vec![f, -1.0]), HNorm::L2);
        e
    }

    #[test]
    fn finds_dominating_cached_points() {
        let cache = InMemoryCache::new();
        cache.insert(ok_point(0.0, 10.0));
        cache.insert(ok_point(1.0, 1.0));
        let incumbent = ok_point(2.0, 5.0);
        let candidates = cache_search_candidates(&cache, &[incumbent]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].f, crate::core::scalar::D::Value(1.0));
        assert_eq!(candidates[0].gen_step, StepTag::Search(SearchKind::Cache));
    }
}
