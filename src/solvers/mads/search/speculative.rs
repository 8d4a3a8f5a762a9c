//! Speculative / line search: extends the direction that produced the
//! current frame center, then refines with a quadratic fit once that
//! direction has succeeded repeatedly.

use std::cell::RefCell;

use crate::core::vector::AoD;

use super::{SearchContext, SearchMethod};

/// The measured triple `(f0, fu, fv)` from the last doubling/halving batch
/// along a direction, plus how many consecutive full successes have been
/// observed along (approximately) that same axis.
struct History {
    direction: AoD,
    f0: f64,
    fu: f64,
    fv: f64,
    streak: u32,
}

/// `x_c + alpha*d` for `alpha` in doubling-then-halving order, `d = x_c -
/// x_p`. `base_factor` scales the doubling step (`SPECULATIVE_SEARCH_BASE_FACTOR`).
/// After two consecutive full successes along the same axis, the next call
/// instead proposes the analytic minimum of a quadratic fit through the
/// three measured points `(0, u, v)`.
pub struct SpeculativeSearch {
    pub base_factor: f64,
    history: RefCell<Option<History>>,
}

impl Default for SpeculativeSearch {
    fn default() -> Self {
        SpeculativeSearch { base_factor: 2.0, history: RefCell::new(None) }
    }
}

impl SpeculativeSearch {
    pub fn new(base_factor: f64) -> Self {
        SpeculativeSearch { base_factor, history: RefCell::new(None) }
    }

    /// Records the measured outcome of the doubling/halving pair this call
    /// proposed, so a later call along the same axis can attempt the
    /// quadratic-fit refinement. Called by the driver once the pair has
    /// been evaluated; `full_success` resets the streak when false.
    pub fn observe(&self, direction: AoD, f0: f64, fu: f64, fv: f64, full_success: bool) {
        let mut history = self.history.borrow_mut();
        let streak = match history.as_ref() {
            Some(prev) if full_success && on_same_axis(&prev.direction, &direction) => prev.streak + 1,
            _ if full_success => 1,
            _ => 0,
        };
        *history = Some(History { direction, f0, fu, fv, streak });
    }

    /// Drops any recorded history, forcing the next call to re-measure a
    /// fresh doubling/halving pair before a quadratic fit can be attempted.
    pub fn clear(&self) {
        *self.history.borrow_mut() = None;
    }
}

/// True if `a` and `b` point along the same line, up to sign and scale —
/// a full success rescales the direction each megaiteration without
/// changing its axis.
fn on_same_axis(a: &AoD, b: &AoD) -> bool {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for i in 0..a.len().min(b.len()) {
        let ai = a[i].to_f64();
        let bi = b[i].to_f64();
        dot += ai * bi;
        norm_a += ai * ai;
        norm_b += bi * bi;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return false;
    }
    (dot.abs() / (norm_a.sqrt() * norm_b.sqrt())) > 1.0 - 1e-9
}

impl SearchMethod for SpeculativeSearch {
    fn generate_trial_points_final(&self, ctx: &SearchContext) -> Vec<AoD> {
        let Some(predecessor) = ctx.predecessor else {
            return Vec::new();
        };
        let d = predecessor.vectorize(ctx.frame_center);

        if let Some(hist) = self.history.borrow().as_ref() {
            if hist.streak >= 2 && on_same_axis(&hist.direction, &d) {
                if let Some(t) = quadratic_fit_step(hist.f0, self.base_factor, hist.fu, 1.0 / self.base_factor, hist.fv, 1e-12) {
                    return vec![ctx.frame_center.add(&d.scale(t))];
                }
            }
        }

        [self.base_factor, 1.0 / self.base_factor]
            .iter()
            .map(|&alpha| ctx.frame_center.add(&d.scale(alpha)))
            .collect()
    }
}

/// Fits `f(t) = a*t^2 + b*t + f0` through `(0,f0)`, `(u,fu)`, `(v,fv)` and
/// returns the analytic minimizer `t = -b/(2a)`. Abandoned (returns `None`)
/// if the fit is not convex (`a <= 0`) or the linear term vanishes (`b` is
/// within `eps` of zero).
pub fn quadratic_fit_step(f0: f64, u: f64, fu: f64, v: f64, fv: f64, eps: f64) -> Option<f64> {
    if u == 0.0 || v == 0.0 || (u - v).abs() < 1e-15 {
        return None;
    }
    let det = u * v * (u - v);
    if det.abs() < 1e-15 {
        return None;
    }
    let rhs_u = fu - f0;
    let rhs_v = fv - f0;
    let a = (rhs_u * v - rhs_v * u) / det;
    let b = (u * u * rhs_v - v * v * rhs_u) / det;

    if a <= 0.0 || b.abs() < eps {
        return None;
    }
    Some(-b / (2.0 * a))
}
