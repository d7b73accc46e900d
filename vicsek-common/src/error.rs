use thiserror::Error;

/// Errors raised by the simulation core.
///
/// `InvalidArgument` is a caller/configuration error and is always reported
/// before any step executes. `InvariantViolation` signals an arithmetic defect
/// detected at the end of a step; the run is aborted and its partial
/// trajectory discarded.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invariant violated at step {step}: {detail}")]
    InvariantViolation { step: usize, detail: String },
    #[error("simulation already completed all {steps} steps")]
    AlreadyComplete { steps: usize },
}

impl SimError {
    /// True for the defect class (not recoverable by fixing the inputs).
    pub fn is_defect(&self) -> bool {
        matches!(self, SimError::InvariantViolation { .. })
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidArgument(msg.into())
    }
}
