//! Progressive barrier: feasible and infeasible incumbent antichains
//! plus an adaptive infeasibility threshold `hMax`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::eval_point::{dominates, EvalPoint};
use super::scalar::D;

/// Step outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SuccessType {
    Unsuccessful,
    Partial,
    Full,
}

/// The progressive barrier: feasible/infeasible incumbent antichains plus
/// an adaptive threshold `hMax`.
#[derive(Debug, Clone)]
pub struct ProgressiveBarrier {
    x_feas: Vec<EvalPoint>,
    x_inf: Vec<EvalPoint>,
    h_max: D,
}

impl ProgressiveBarrier {
    pub fn new(h_max: D) -> Self {
        ProgressiveBarrier {
            x_feas: Vec::new(),
            x_inf: Vec::new(),
            h_max,
        }
    }

    pub fn h_max(&self) -> D {
        self.h_max
    }

    pub fn feasible_incumbents(&self) -> &[EvalPoint] {
        &self.x_feas
    }

    pub fn infeasible_incumbents(&self) -> &[EvalPoint] {
        &self.x_inf
    }

    /// The best feasible point under `f`, if any.
    pub fn current_incumbent_feas(&self) -> Option<&EvalPoint> {
        self.x_feas
            .iter()
            .min_by(|a, b| a.f.partial_cmp(&b.f).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// The best infeasible point under `(h, f)` lexicographic order, if
    /// any.
    pub fn current_incumbent_inf(&self) -> Option<&EvalPoint> {
        self.x_inf.iter().min_by(|a, b| {
            a.h.partial_cmp(&b.h)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.f.partial_cmp(&b.f).unwrap_or(std::cmp::Ordering::Equal))
        })
    }

    /// Classifies the outcome of admitting a candidate.
    pub fn success_type(&self, f_candidate: D, h_candidate: D) -> SuccessType {
        if h_candidate == D::ZERO {
            let full = match self.current_incumbent_feas() {
                None => true,
                Some(best) => matches!(
                    f_candidate.partial_cmp(&best.f),
                    Some(std::cmp::Ordering::Less)
                ),
            };
            if full {
                return SuccessType::Full;
            }
        }
        if self
            .x_inf
            .iter()
            .all(|inf| dominates(f_candidate, h_candidate, inf.f, inf.h))
            && !self.x_inf.is_empty()
        {
            return SuccessType::Full;
        }
        if h_candidate.is_defined()
            && matches!(h_candidate.partial_cmp(&self.h_max), Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal))
            && self.undominated_among_infeasibles(f_candidate, h_candidate)
        {
            return SuccessType::Partial;
        }
        SuccessType::Unsuccessful
    }

    fn undominated_among_infeasibles(&self, f: D, h: D) -> bool {
        !self.x_inf.iter().any(|inf| dominates(inf.f, inf.h, f, h))
    }

    /// Insert a batch of newly evaluated points. Returns the max
    /// [`SuccessType`] observed.
    pub fn update_with_points(&mut self, points: &[EvalPoint]) -> SuccessType {
        let mut best = SuccessType::Unsuccessful;
        for e in points {
            if !e.is_ok() {
                continue;
            }
            let st = self.success_type(e.f, e.h);
            if e.is_feasible() {
                self.insert_feasible(e.clone());
            } else if let Some(cmp) = e.h.partial_cmp(&self.h_max) {
                if cmp != std::cmp::Ordering::Greater {
                    self.insert_infeasible(e.clone());
                }
            }
            best = best.max(st);
        }
        debug!(?best, n_feas = self.x_feas.len(), n_inf = self.x_inf.len(), "barrier updated");
        best
    }

    fn insert_feasible(&mut self, e: EvalPoint) {
        if self.x_feas.iter().any(|o| dominates(o.f, o.h, e.f, e.h)) {
            return;
        }
        self.x_feas.retain(|o| !dominates(e.f, e.h, o.f, o.h));
        if !self.x_feas.iter().any(|o| o.x == e.x) {
            self.x_feas.push(e);
        }
    }

    fn insert_infeasible(&mut self, e: EvalPoint) {
        if self.x_inf.iter().any(|o| dominates(o.f, o.h, e.f, e.h)) {
            return;
        }
        self.x_inf.retain(|o| !dominates(e.f, e.h, o.f, o.h));
        if !self.x_inf.iter().any(|o| o.x == e.x) {
            self.x_inf.push(e);
        }
    }

    /// Set the threshold; evicts any infeasible incumbent with `h > h'`.
    /// The core never raises `hMax` — callers enforce monotonicity by
    /// always deriving the new value from
    /// [`Self::worst_h_below_current`].
    pub fn set_h_max(&mut self, h_prime: D) {
        self.h_max = h_prime;
        self.x_inf.retain(|e| {
            matches!(
                e.h.partial_cmp(&h_prime),
                Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal)
            )
        });
        debug!(h_max = ?self.h_max, "barrier hMax set");
    }

    /// Largest `h` strictly below the current `hMax` still held by the
    /// barrier — the value the driver feeds into [`Self::set_h_max`] after
    /// a successful iteration.
    pub fn worst_h_below_current(&self) -> Option<D> {
        self.x_inf
            .iter()
            .map(|e| e.h)
            .filter(|h| matches!(h.partial_cmp(&self.h_max), Some(std::cmp::Ordering::Less)))
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// `xFeas` is an antichain under `(f,h)` dominance.
    pub fn feasible_is_antichain(&self) -> bool {
        for (i, a) in self.x_feas.iter().enumerate() {
            for (j, b) in self.x_feas.iter().enumerate() {
                if i != j && dominates(a.f, a.h, b.f, b.h) {
                    return false;
                }
            }
        }
        true
    }

    pub fn infeasible_is_antichain(&self) -> bool {
        for (i, a) in self.x_inf.iter().enumerate() {
            for (j, b) in self.x_inf.iter().enumerate() {
                if i != j && dominates(a.f, a.h, b.f, b.h) {
                    return false;
                }
            }
        }
        true
    }

    /// Captures both incumbent sets and the current `hMax` for hot
    /// restart.
    pub fn snapshot(&self) -> BarrierSnapshot {
        BarrierSnapshot {
            x_feas: self.x_feas.clone(),
            x_inf: self.x_inf.clone(),
            h_max: self.h_max,
        }
    }

    /// Rebuilds a barrier from a previously captured [`BarrierSnapshot`].
    pub fn restore(snapshot: BarrierSnapshot) -> ProgressiveBarrier {
        ProgressiveBarrier {
            x_feas: snapshot.x_feas,
            x_inf: snapshot.x_inf,
            h_max: snapshot.h_max,
        }
    }
}

/// Serializable snapshot of the barrier's incumbent sets and threshold
/// for hot restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarrierSnapshot {
    pub x_feas: Vec<EvalPoint>,
    pub x_inf: Vec<EvalPoint>,
    pub h_max: D,
}
