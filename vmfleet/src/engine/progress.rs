//! Progress handles for long-running engine calls.

use async_trait::async_trait;
use vmfleet_shared::RemoteError;
use vmfleet_shared::constants::result_code;

/// Handle to an in-flight remote operation.
#[async_trait]
pub trait ProgressHandle: Send {
    /// Wait until the operation reaches a terminal state.
    async fn wait_for_completion(&mut self);

    /// Whether the handle itself is still valid.
    fn is_ok(&self) -> bool;

    /// Terminal result code; zero means success.
    fn result_code(&self) -> i32;

    fn error_text(&self) -> Option<String> {
        None
    }

    /// Request cancellation. Passed through opaquely; returns whether the
    /// engine accepted the request.
    fn cancel(&mut self) -> bool {
        false
    }
}

/// Block the calling action on `progress` and turn a non-zero result
/// into a [`RemoteError`].
pub async fn await_progress(mut progress: Box<dyn ProgressHandle>) -> Result<(), RemoteError> {
    progress.wait_for_completion().await;

    if !progress.is_ok() {
        return Err(RemoteError::new(
            result_code::UNKNOWN_FAILURE,
            progress
                .error_text()
                .unwrap_or_else(|| "progress handle became invalid".to_string()),
        ));
    }

    let code = progress.result_code();
    if code != result_code::OK {
        return Err(RemoteError::new(
            code,
            progress
                .error_text()
                .unwrap_or_else(|| "operation failed".to_string()),
        ));
    }
    Ok(())
}
