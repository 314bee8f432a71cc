use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModemError {
    #[error("Invalid channel parameter: {0}")]
    InvalidParameter(String),

    #[error("Session is already running")]
    SessionBusy,

    #[error("Invalid PCM data: {0}")]
    InvalidPcm(String),
}

pub type Result<T> = std::result::Result<T, ModemError>;
