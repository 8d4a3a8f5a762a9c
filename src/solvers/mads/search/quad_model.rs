//! Quadratic-model search: a separate provider produces candidates and the
//! core only routes them through the trial-point/mesh-projection path. A
//! real quadratic regression fitter is out of scope; this is the routing
//! seam only, exercised by [`NoOpQuadModel`].

use crate::core::vector::AoD;

use super::SearchContext;

/// Produces candidate trial points from an external surrogate model. The
/// core never fits a model itself — it only routes whatever a provider
/// returns through the same `insertTrialPoint`/mesh-projection path as
/// every other Search method.
pub trait ModelSearchProvider {
    fn propose(&self, ctx: &SearchContext) -> Vec<AoD>;
}

/// The default provider: no model is fit, so it proposes nothing. Keeps
/// `QUAD_MODEL_SEARCH` toggleable without requiring a real fitter to be
/// wired in.
pub struct NoOpQuadModel;

impl ModelSearchProvider for NoOpQuadModel {
    fn propose(&self, _ctx: &SearchContext) -> Vec<AoD> {
        Vec::new()
    }
}
