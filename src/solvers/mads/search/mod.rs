//! Composable Search methods. Each implements
//! [`SearchMethod::generate_trial_points_final`] and respects the mesh
//! projection and duplicate-suppression rule; [`cache_search`] and
//! [`nelder_mead_search`] operate on already-evaluated points or a live
//! simplex and so are exposed as free functions rather than through the
//! trait.

pub mod cache_search;
pub mod int_line_search;
pub mod nelder_mead_search;
pub mod quad_model;
pub mod speculative;

use crate::core::mesh::GMesh;
use crate::core::point::VariableType;
use crate::core::vector::AoD;

/// The shared context every Search method reads from — a plain struct
/// threaded through by the caller rather than a singleton, so each method
/// stays free of global state.
pub struct SearchContext<'a> {
    pub frame_center: &'a AoD,
    pub predecessor: Option<&'a AoD>,
    pub mesh: &'a GMesh,
    pub lb: &'a AoD,
    pub ub: &'a AoD,
    pub input_type: &'a [VariableType],
}

/// Common contract: produce zero or more trial points around the frame
/// center. Enabled independently by configuration.
pub trait SearchMethod {
    fn generate_trial_points_final(&self, ctx: &SearchContext) -> Vec<AoD>;
}
