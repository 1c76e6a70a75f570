use thiserror::Error;

/// Result alias for subprocess operations.
pub type SubprocessResult<T> = Result<T, SubprocessError>;

/// Core error types for subprocess lifecycle and pipe I/O
#[derive(Error, Debug)]
pub enum SubprocessError {
    #[error("native process handle already released")]
    HandleReleased,

    #[error("exit code unavailable: {0}")]
    ExitCodeUnavailable(String),

    #[error("pipe I/O failed: {0}")]
    PipeIo(String),

    #[error("wait interrupted")]
    Interrupted,

    #[error("failed to spawn waiter thread: {0}")]
    WaiterSpawn(#[source] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl SubprocessError {
    /// Check if this error is a misuse of the handle lifecycle
    pub fn is_illegal_state(&self) -> bool {
        matches!(
            self,
            SubprocessError::HandleReleased | SubprocessError::ExitCodeUnavailable(_)
        )
    }

    /// Check if this error came from caller-side cancellation
    pub fn is_interrupted(&self) -> bool {
        matches!(self, SubprocessError::Interrupted)
    }
}

impl From<SubprocessError> for std::io::Error {
    fn from(err: SubprocessError) -> Self {
        std::io::Error::other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SubprocessError::PipeIo("pipe broken".to_string());
        let display = format!("{error}");
        assert!(display.contains("pipe I/O failed"));
        assert!(display.contains("pipe broken"));

        let error = SubprocessError::ExitCodeUnavailable("access denied".to_string());
        let display = format!("{error}");
        assert!(display.contains("exit code unavailable"));
    }

    #[test]
    fn test_error_categorization() {
        // Illegal-state errors
        assert!(SubprocessError::HandleReleased.is_illegal_state());
        assert!(SubprocessError::ExitCodeUnavailable("test".to_string()).is_illegal_state());

        // Everything else is not
        assert!(!SubprocessError::PipeIo("test".to_string()).is_illegal_state());
        assert!(!SubprocessError::Interrupted.is_illegal_state());

        assert!(SubprocessError::Interrupted.is_interrupted());
        assert!(!SubprocessError::HandleReleased.is_interrupted());
    }

    #[test]
    fn test_io_error_conversion() {
        let error = SubprocessError::PipeIo("pipe broken".to_string());
        let io_error: std::io::Error = error.into();
        assert!(io_error.to_string().contains("pipe broken"));

        let error = SubprocessError::HandleReleased;
        let io_error: std::io::Error = error.into();
        assert!(io_error.to_string().contains("already released"));
    }
}
