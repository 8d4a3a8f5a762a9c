//! Standard blackbox test functions used by the benchmark and integration
//! test suites.

/// The Rosenbrock "banana" function, unconstrained.
pub mod rosenbrock;
/// The sphere function, unconstrained.
pub mod sphere;
/// Constrained scenarios: a constrained quadratic and an integer packing
/// problem.
pub mod constrained;
