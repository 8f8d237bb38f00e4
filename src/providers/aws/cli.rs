use std::path::PathBuf;
use std::process::Output;

use tokio::process::Command;

use super::error::AwsError;
use super::types::{CallerIdentity, GetRoleResponse};

/// Lowercased stderr markers for a clean "entity does not exist" response.
const NOT_FOUND_MARKERS: &[&str] = &["nosuchentity", "cannot be found"];

/// Lowercased stderr markers for credential problems.
const AUTH_MARKERS: &[&str] = &[
    "accessdenied",
    "access denied",
    "expiredtoken",
    "invalidclienttokenid",
    "unable to locate credentials",
    "signaturedoesnotmatch",
];

/// Thin wrapper over the `aws` binary. Every call is a blocking subprocess
/// awaited to completion; one invocation per query, no retries.
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    region: String,
}

impl AwsCli {
    pub fn discover(region: &str) -> Result<Self, AwsError> {
        let program = which::which("aws")?;
        Ok(Self::with_program(program, region))
    }

    /// NOTE: Primarily used for testing with stub binaries.
    pub fn with_program(program: PathBuf, region: &str) -> Self {
        Self {
            program,
            region: region.to_string(),
        }
    }

    async fn run(&self, action: &str, args: &[&str]) -> Result<Output, AwsError> {
        tracing::debug!(action, "running aws cli");

        Command::new(&self.program)
            .args(args)
            .args(["--region", &self.region, "--output", "json"])
            .output()
            .await
            .map_err(|source| AwsError::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    pub async fn caller_identity(&self) -> Result<CallerIdentity, AwsError> {
        let action = "sts get-caller-identity";
        let output = self.run(action, &["sts", "get-caller-identity"]).await?;

        if !output.status.success() {
            return Err(classify_failure(action, &output.stderr));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| AwsError::Parse {
            action: action.to_string(),
            message: e.to_string(),
        })
    }

    /// Existence probe for an IAM role. A `NoSuchEntity` response is a clean
    /// absent, not an error.
    pub async fn role_exists(&self, role_name: &str) -> Result<bool, AwsError> {
        let action = "iam get-role";
        let output = self
            .run(action, &["iam", "get-role", "--role-name", role_name])
            .await?;

        if output.status.success() {
            let response: GetRoleResponse =
                serde_json::from_slice(&output.stdout).map_err(|e| AwsError::Parse {
                    action: action.to_string(),
                    message: e.to_string(),
                })?;
            tracing::debug!(role = %response.role.role_name, arn = %response.role.arn, "role found");
            return Ok(true);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if matches_marker(&stderr, NOT_FOUND_MARKERS) {
            tracing::debug!(role = %role_name, "role not found");
            return Ok(false);
        }

        Err(classify_failure(action, &output.stderr))
    }
}

fn matches_marker(stderr: &str, markers: &[&str]) -> bool {
    let lowered = stderr.to_lowercase();
    markers.iter().any(|marker| lowered.contains(marker))
}

fn classify_failure(action: &str, stderr: &[u8]) -> AwsError {
    let message = String::from_utf8_lossy(stderr).trim().to_string();

    if matches_marker(&message, AUTH_MARKERS) {
        AwsError::Auth { message }
    } else {
        AwsError::Api {
            action: action.to_string(),
            message,
        }
    }
}
