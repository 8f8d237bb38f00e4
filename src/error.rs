use thiserror::Error;

use crate::providers::ProviderError;
use crate::reconcile::ReconcileError;
use crate::terraform::TerraformError;

/// Unified error for the deploy pipeline. Any of these terminates the run
/// with a non-zero exit.
#[derive(Debug, Error)]
pub enum TsrError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Terraform(#[from] TerraformError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("step '{name}' failed: {message}")]
    Step { name: &'static str, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}
