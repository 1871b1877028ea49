use std::path::PathBuf;

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] pregao_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid value for {name}: {message}")]
    Env { name: &'static str, message: String },

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Config { .. } => 2,
            Self::Env { .. } => 2,
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

impl From<pregao_core::CoreError> for CliError {
    fn from(error: pregao_core::CoreError) -> Self {
        match error {
            pregao_core::CoreError::Validation(error) => Self::Validation(error),
            pregao_core::CoreError::Serialization(error) => Self::Serialization(error),
            pregao_core::CoreError::Csv(error) => Self::Io(std::io::Error::other(error)),
            pregao_core::CoreError::Io(error) => Self::Io(error),
        }
    }
}
