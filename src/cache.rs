//! Reference in-memory cache. The cache owns the canonical `EvalPoint`
//! storage in an arena and hands out either a `usize` handle (`insert`,
//! `get`) or a full clone (`find`, `all_points`) depending on the caller.
//! Barrier and simplex go through the clone-returning methods and keep
//! their own `Vec<EvalPoint>` copies rather than holding handles back into
//! the arena.

use std::sync::Mutex;

use crate::core::eval_point::{dominates, EvalPoint};
use crate::core::point::Point;
use crate::core::scalar::D;
use crate::traits::Cache;

/// An index into a [`InMemoryCache`]'s arena.
pub type EvalPointHandle = usize;

struct Inner {
    arena: Vec<EvalPoint>,
    hits: usize,
}

/// Reference `Cache` implementation: a mutex-guarded arena with linear
/// lookup by coordinate equality. Adequate for tests and small runs; a
/// production cache would index by a hash of the (quantized) coordinates.
pub struct InMemoryCache {
    inner: Mutex<Inner>,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        InMemoryCache {
            inner: Mutex::new(Inner {
                arena: Vec::new(),
                hits: 0,
            }),
        }
    }
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: EvalPointHandle) -> Option<EvalPoint> {
        self.inner.lock().expect("cache mutex poisoned").arena.get(handle).cloned()
    }
}

impl Cache for InMemoryCache {
    fn find(&self, x: &Point) -> Option<EvalPoint> {
        let mut guard = self.inner.lock().expect("cache mutex poisoned");
        let found = guard.arena.iter().find(|e| &e.x == x).cloned();
        if found.is_some() {
            guard.hits += 1;
        }
        found
    }

    fn insert(&self, e: EvalPoint) -> usize {
        let mut guard = self.inner.lock().expect("cache mutex poisoned");
        if let Some(idx) = guard.arena.iter().position(|existing| existing.x == e.x) {
            return idx;
        }
        guard.arena.push(e);
        guard.arena.len() - 1
    }

    fn find_best_feas(&self) -> Option<EvalPoint> {
        let guard = self.inner.lock().expect("cache mutex poisoned");
        guard
            .arena
            .iter()
            .filter(|e| e.is_feasible())
            .min_by(|a, b| a.f.partial_cmp(&b.f).unwrap_or(std::cmp::Ordering::Equal))
            .cloned()
    }

    fn find_best_inf(&self, h_max: D) -> Option<EvalPoint> {
        let guard = self.inner.lock().expect("cache mutex poisoned");
        guard
            .arena
            .iter()
            .filter(|e| e.is_ok() && !e.is_feasible())
            .filter(|e| matches!(e.h.partial_cmp(&h_max), Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal)))
            .min_by(|a, b| {
                a.h.partial_cmp(&b.h)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.f.partial_cmp(&b.f).unwrap_or(std::cmp::Ordering::Equal))
            })
            .cloned()
    }

    fn clear(&self) {
        let mut guard = self.inner.lock().expect("cache mutex poisoned");
        guard.arena.clear();
        guard.hits = 0;
    }

    fn reset_nb_cache_hits(&self) {
        self.inner.lock().expect("cache mutex poisoned").hits = 0;
    }

    fn nb_cache_hits(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").hits
    }

    fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").arena.len()
    }

    fn all_points(&self) -> Vec<EvalPoint> {
        self.inner.lock().expect("cache mutex poisoned").arena.clone()
    }
}

/// Points in `cache` that dominate every point in `incumbents` — the
/// cache-search primitive.
pub fn find_dominators(cache: &dyn Cache, incumbents: &[EvalPoint]) -> Vec<EvalPoint> {
    cache
        .all_points()
        .into_iter()
        .filter(|candidate| {
            candidate.is_ok()
                && incumbents
                    .iter()
                    .all(|inc| dominates(candidate.f, candidate.h, inc.f, inc.h))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::eval_point::StepTag;
    use crate::core::vector::{AoD, HNorm};

    fn ok_point(x: f64, f: f64) -> EvalPoint {
        let mut e = EvalPoint::new(Point::new(AoD::defined(vec![x])), StepTag::Poll);
        e.set_outputs(AoD::defined(vec![f, -1.0]), HNorm::L2);
        e
    }

    #[test]
    fn insert_is_idempotent_on_x() {
        let cache = InMemoryCache::new();
        let h1 = cache.insert(ok_point(1.0, 5.0));
        let h2 = cache.insert(ok_point(1.0, 5.0));
        assert_eq!(h1, h2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn find_tracks_hits() {
        let cache = InMemoryCache::new();
        cache.insert(ok_point(2.0, 1.0));
        assert_eq!(cache.nb_cache_hits(), 0);
        assert!(cache.find(&Point::new(AoD::defined(vec![2.0]))).is_some());
        assert_eq!(cache.nb_cache_hits(), 1);
        assert!(cache.find(&Point::new(AoD::defined(vec![9.0]))).is_none());
        assert_eq!(cache.nb_cache_hits(), 1);
    }

    #[test]
    fn find_best_feas_picks_minimum_f() {
        let cache = InMemoryCache::new();
        cache.insert(ok_point(1.0, 5.0));
        cache.insert(ok_point(2.0, 1.0));
        cache.insert(ok_point(3.0, 9.0));
        let best = cache.find_best_feas().unwrap();
        assert_eq!(best.f, crate::core::scalar::D::Value(1.0));
    }
}
