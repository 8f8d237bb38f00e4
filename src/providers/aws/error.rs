use std::path::PathBuf;

use thiserror::Error;

/// AWS CLI errors.
///
/// SECURITY: error messages must NEVER contain credential material. Only
/// stderr from the `aws` binary is quoted, and the binary redacts its own
/// secrets.
#[derive(Debug, Error)]
pub enum AwsError {
    /// The `aws` binary is not on PATH
    #[error("aws binary not found: {0}")]
    ToolNotFound(#[from] which::Error),

    /// The binary could not be spawned
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    /// Credentials missing, expired, or rejected
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Any other non-zero exit from the CLI
    #[error("aws {action} failed: {message}")]
    Api { action: String, message: String },

    /// CLI produced output we could not parse
    #[error("failed to parse aws {action} output: {message}")]
    Parse { action: String, message: String },
}

impl From<AwsError> for crate::providers::ProviderError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Auth { message } => crate::providers::ProviderError::Auth(message),
            other => crate::providers::ProviderError::Aws(other.to_string()),
        }
    }
}
