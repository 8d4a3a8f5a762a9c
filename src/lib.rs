//! `nomad_core` implements the Mesh Adaptive Direct Search (MADS) family of
//! derivative-free blackbox optimization algorithms: a granular
//! anisotropic mesh, a progressive barrier for constrained search, the
//! MADS megaiteration (Search then Poll), and a Nelder-Mead reflective
//! state machine usable either as a MADS Search or standalone. The
//! objective and constraints are exposed only as an opaque oracle
//! (`f(x)`, `c_j(x) <= 0`) through the [`traits::Function`] trait — no
//! gradients are used or required.
//!
//! # Quick start
//!
//! ```rust
//! use std::convert::Infallible;
//! use nomad_core::core::{AoD, HNorm, VariableSpace, VariableType, D};
//! use nomad_core::traits::Function;
//! use nomad_core::solvers::nelder_mead::NelderMead;
//!
//! struct Rosenbrock;
//! impl Function for Rosenbrock {
//!     type Error = Infallible;
//!     fn evaluate(&self, x: &AoD) -> Result<AoD, Infallible> {
//!         let f = 100.0 * (x[1].to_f64() - x[0].to_f64().powi(2)).powi(2)
//!             + (1.0 - x[0].to_f64()).powi(2);
//!         Ok(AoD::defined(vec![f]))
//!     }
//! }
//!
//! let problem = Rosenbrock;
//! let space = VariableSpace {
//!     input_type: vec![VariableType::Continuous; 2],
//!     granularity: AoD::zeros(2),
//!     lb: AoD::undefined(2),
//!     ub: AoD::undefined(2),
//!     fixed: vec![None; 2],
//! };
//! let x0 = AoD::defined(vec![-1.2, 1.0]);
//! let nm = NelderMead::new(space, HNorm::L2);
//! let summary = nm.minimize(&problem, &x0, 400);
//! assert!(summary.fx < 1.0);
//! ```
//!
//! # Scope
//!
//! This crate implements the iteration *engine* only (mesh, barrier,
//! megaiteration, Nelder-Mead). The evaluator pool's scheduling internals,
//! the cache's storage engine, configuration loading, a CLI, the
//! multi-objective DMultiMads variant, surrogate models, hot-restart file
//! I/O, and language bindings are external collaborators, consumed here
//! only through the contracts in [`traits`].
#![warn(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown,
    clippy::missing_safety_doc,
    clippy::perf,
    clippy::style
)]
#![allow(clippy::needless_range_loop)]

/// Numeric primitives, mesh, barrier, eval point, and iteration utilities.
pub mod core;

/// External interface contracts: `Function`, `EvaluatorPool`, `Cache`.
pub mod traits;

/// Reference in-memory cache implementation.
pub mod cache;

/// Reference evaluator pool implementations (serial and thread-pool).
pub mod evaluator;

/// MADS and Nelder-Mead solvers.
pub mod solvers;

/// Standard blackbox test functions used across the test suite.
pub mod test_functions;

/// Re-export the `nalgebra` crate, used internally by the simplex rank
/// test (`solvers::nelder_mead::simplex`).
pub use nalgebra;

/// A floating-point number type.
pub type Float = f64;

/// The mathematical constant $`\pi`$.
pub const PI: Float = std::f64::consts::PI;
