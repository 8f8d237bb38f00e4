mod cli;
mod error;
mod types;

pub use cli::AwsCli;
pub use error::AwsError;
pub use types::{CallerIdentity, is_policy_arn};

use async_trait::async_trait;

use super::{Provider, ProviderError};
use crate::config::DeployConfig;
use crate::resource::ResourceIdentity;

pub struct AwsProvider {
    cli: AwsCli,
    expected_account: Option<String>,
}

impl AwsProvider {
    /// Locates the `aws` binary on PATH.
    pub fn discover(config: &DeployConfig) -> Result<Self, ProviderError> {
        let cli = AwsCli::discover(&config.region)?;
        Ok(Self::with_cli(cli, config.account_id.clone()))
    }

    pub fn with_cli(cli: AwsCli, expected_account: Option<String>) -> Self {
        Self {
            cli,
            expected_account,
        }
    }
}

#[async_trait]
impl Provider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn verify(&self) -> Result<(), ProviderError> {
        let identity = self.cli.caller_identity().await?;

        tracing::info!(
            account = %identity.account,
            arn = %identity.arn,
            "caller identity verified"
        );

        if let Some(expected) = &self.expected_account {
            if identity.account != *expected {
                return Err(ProviderError::Auth(format!(
                    "credentials belong to account {}, expected {}",
                    identity.account, expected
                )));
            }
        }

        Ok(())
    }

    async fn exists(&self, identity: &ResourceIdentity) -> Result<bool, ProviderError> {
        Ok(self.cli.role_exists(&identity.name).await?)
    }
}
