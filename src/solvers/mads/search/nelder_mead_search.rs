//! Nelder-Mead as a MADS Search method: wraps one reflective step and
//! routes its single candidate through the same trial-point path as every
//! other Search, rather than re-implementing simplex management. Shrink is
//! disabled in this mode — a failed insertion just leaves the simplex
//! untouched for the next megaiteration.

use crate::core::vector::AoD;
use crate::solvers::nelder_mead::simplex::Simplex;
use crate::solvers::nelder_mead::{reflect_point, DELTA_R};

/// Produces the reflection candidate `x_t` for one simplex, to be
/// evaluated and then inserted via [`Simplex::try_insert`] by the caller.
/// Returns nothing if the simplex has fewer than 2 points (no centroid is
/// defined).
pub fn reflect_candidate(simplex: &Simplex) -> Vec<AoD> {
    if simplex.n_plus_1() < 2 {
        return Vec::new();
    }
    let centroid = simplex.centroid_excluding_worst();
    let worst = simplex.worst().x.coords().clone();
    vec![reflect_point(&centroid, &worst, DELTA_R)]
}
