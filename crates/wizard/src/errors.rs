use thiserror::Error;

use crate::step::StepId;

/// Fatal conditions for a wizard instance.
///
/// Recoverable input problems never appear here; they travel as values
/// (`SubmitOutcome::Invalid`) so the caller always keeps a consistent state
/// to re-prompt from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// A transition named a step id that is not in the registry. Indicates a
    /// malformed step graph; the instance fails closed and stays on its
    /// pre-transition state.
    #[error("unknown step: {0}")]
    UnknownStep(StepId),

    /// Submit or back-navigation after the terminal state was reached.
    #[error("wizard already completed")]
    Completed,

    /// Hand-off requested while the flow is still running.
    #[error("wizard still in progress at step {0}")]
    InProgress(StepId),

    /// The session worker owning this wizard is gone (handle outlived it).
    #[error("wizard session closed")]
    SessionClosed,

    /// Registry construction: the same step id was registered twice.
    #[error("duplicate step id: {0}")]
    DuplicateStep(StepId),

    /// Registry construction: the designated entry step was never registered.
    #[error("entry step not registered: {0}")]
    UnknownEntry(StepId),
}

/// Rejection of a submitted answer. Guaranteed side-effect free: when one of
/// these comes back, step, configuration and history are untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("input must not be empty")]
    EmptyInput,

    #[error("unknown choice: {0}")]
    UnknownChoice(String),

    #[error("select at least one option")]
    EmptySelection,

    #[error("answer does not fit step kind: expected {expected}")]
    KindMismatch { expected: &'static str },

    /// A step-specific validator turned the value down (format checks,
    /// token shapes and the like). Carries the validator's message verbatim.
    #[error("{0}")]
    Rejected(String),
}
