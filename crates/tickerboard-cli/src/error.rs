use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickerboard_core::ValidationError),

    #[error("{0}")]
    FetchFailed(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Logging(_) => 1,
            Self::Validation(_) => 2,
            Self::FetchFailed(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
