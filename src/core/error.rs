use thiserror::Error;

/// The two-track error taxonomy: parameter validation is a hard failure
/// surfaced through `Result`; everything else algorithmic (exhaustion,
/// interrupts, invariant repairs) travels as a [`StopReason`] value, never
/// as an exception.
#[derive(Debug, Error)]
pub enum NomadError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("initialization failed: {0}")]
    InitializationFailure(String),

    #[error("evaluation failed for trial point")]
    EvaluationFailure,
}

/// Why an algorithm instance stopped. These are never returned as `Err`:
/// they are the normal output of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxBbEvalReached,
    MaxEvalReached,
    MaxIterationsReached,
    MeshStop,
    ObjectiveTargetReached,
    FeasibilityReached,
    InfeasibleOnlyHMaxCollapsed,
    UserInterrupt,
    InitializationFailed,
    NmStopNoShrink,
    NmSingleCompleted,
    /// An algorithmic structure was found to have silently drifted out of
    /// its documented invariant (e.g. a simplex insertion that would drop
    /// `rank(DZ)` below `n`) and was rolled back rather than accepted.
    /// Logged via `tracing::warn!` at the rollback site; this is a repair,
    /// not a crash, so it travels as data rather than as an `Err`.
    InternalInvariantViolation,
    Undefined,
}

impl StopReason {
    /// True if this run state must be treated as terminal for the owning
    /// algorithm (vs. a local, recoverable condition). All current
    /// variants are terminal; the enum is kept even so future
    /// per-megaiteration conditions can be distinguished from run-ending
    /// ones without changing call sites.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StopReason::Undefined)
    }
}
