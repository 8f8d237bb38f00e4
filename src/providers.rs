pub mod aws;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::DeployConfig;
use crate::resource::ResourceIdentity;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("aws error: {0}")]
    Aws(String),
}

/// Existence lookup against the cloud provider. Lookups never mutate
/// provider-side state.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Preflight: credentials resolve and, when an account id is configured,
    /// the caller belongs to it.
    async fn verify(&self) -> Result<(), ProviderError>;

    async fn exists(&self, identity: &ResourceIdentity) -> Result<bool, ProviderError>;
}

pub fn get_provider(name: &str, config: &DeployConfig) -> Result<Box<dyn Provider>, ProviderError> {
    match name {
        "aws" => Ok(Box::new(aws::AwsProvider::discover(config)?)),
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}
