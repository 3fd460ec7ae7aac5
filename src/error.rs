use thiserror::Error;

/// Session-level failures of [`crate::Prompt::read_line`].
///
/// Ordinary cancellation by the user (interrupt key) is not an error; it yields a
/// `PromptResult` with `is_success == false`.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by caller")]
    Cancelled,
    #[error("key event channel closed before a result was produced")]
    InputClosed,
}
