use thiserror::Error;

/// Internal error taxonomy for the automation core.
///
/// These never cross the `Driver` boundary: every public operation catches them
/// and folds them into an [`crate::AutomationResult`] envelope.
#[derive(Error, Debug)]
pub enum AutomationError {
    /// A required element or control could not be located after exhausting
    /// every fallback selector.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A wait primitive's deadline elapsed.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A selector string could not be parsed.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// A precondition on UI state failed (disabled submit after typed
    /// confirmation, missing privilege, missing required field).
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The host page surfaced an error toast/alert; the message is the
    /// toast's text content, verbatim.
    #[error("Page reported error: {0}")]
    PageError(String),

    /// Multiple plausible successful outcomes were possible and none occurred.
    #[error("Ambiguous outcome: {0}")]
    AmbiguousOutcome(String),

    /// The DOM engine (CDP transport, page evaluation) failed.
    #[error("Engine error: {0}")]
    EngineError(String),

    /// A REST collaborator call failed.
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<serde_json::Error> for AutomationError {
    fn from(e: serde_json::Error) -> Self {
        AutomationError::EngineError(format!("JSON decode failed: {e}"))
    }
}
