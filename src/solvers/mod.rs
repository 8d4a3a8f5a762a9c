//! Minimization algorithms: MADS (mesh + progressive barrier +
//! megaiteration + composable Search methods) and Nelder-Mead (reflective
//! state machine, usable standalone or as a MADS Search).

/// Mesh Adaptive Direct Search: the megaiteration driver, poll direction
/// generation, and composable search methods.
pub mod mads;

/// The Nelder-Mead reflective state machine.
pub mod nelder_mead;
