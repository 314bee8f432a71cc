use bfskmodem_core::ModemError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Modem(#[from] ModemError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Unsupported signal format: {0}")]
    UnsupportedFormat(String),

    #[error("Bad sample on line {line}: {source}")]
    BadSample {
        line: usize,
        source: std::num::ParseFloatError,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl CliError {
    /// Whether the caller supplied something unusable, as opposed to an
    /// environment or internal failure
    pub fn is_client_error(&self) -> bool {
        if let CliError::Wav(hound::Error::IoError(_)) = self {
            return false;
        }
        matches!(
            self,
            CliError::Wav(_)
                | CliError::Modem(_)
                | CliError::Json(_)
                | CliError::Base64(_)
                | CliError::UnsupportedFormat(_)
                | CliError::BadSample { .. }
                | CliError::BadRequest(_)
        )
    }
}
