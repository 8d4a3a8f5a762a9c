/// Progressive barrier: feasible/infeasible incumbent sets.
pub mod barrier;
/// Error and stop-reason taxonomy.
pub mod error;
/// `EvalPoint` and its dominance relation.
pub mod eval_point;
/// Hot-restart snapshot: megaiteration, barrier, mesh, RNG, eval counters.
pub mod hot_restart;
/// Trial-point set management and the postprocessing hook.
pub mod iteration_utils;
/// Granular anisotropic mesh.
pub mod mesh;
/// Typed parameter surface and `checkAndComply` validation.
pub mod parameters;
/// `Point` and the variable-space description.
pub mod point;
/// Process-wide reproducible RNG.
pub mod rng;
/// Arithmetic scalar with a distinguished undefined value.
pub mod scalar;
/// Fixed-variable projection between full and sub spaces.
pub mod subproblem;
/// `Summary` type for the result of a run.
pub mod summary;
/// Fixed-length vector of scalars.
pub mod vector;

pub use barrier::{ProgressiveBarrier, SuccessType};
pub use error::{NomadError, StopReason};
pub use eval_point::{dominates, EvalPoint, EvalStatus, EvalType, SearchKind, StepTag};
pub use hot_restart::{EvalCounters, HotRestartState};
pub use iteration_utils::TrialPointSet;
pub use mesh::GMesh;
pub use parameters::Parameters;
pub use point::{Point, VariableSpace, VariableType};
pub use scalar::D;
pub use subproblem::Subproblem;
pub use summary::Summary;
pub use vector::{AoD, HNorm};
