use std::path::PathBuf;
use std::process::Output;

use async_trait::async_trait;
use thiserror::Error;

use super::state::{ImportError, StateStore};
use crate::resource::ResourceAddress;

/// Lowercased stderr markers for an import whose address is already in state.
const ALREADY_MANAGED_MARKERS: &[&str] =
    &["already managed by terraform", "resource already managed"];

/// Lowercased stderr markers for an import whose remote object is gone.
const REMOTE_MISSING_MARKERS: &[&str] = &["cannot import non-existent remote object"];

#[derive(Debug, Error)]
pub enum TerraformError {
    /// The `terraform` binary is not on PATH
    #[error("terraform binary not found: {0}")]
    ToolNotFound(#[from] which::Error),

    /// The binary could not be spawned
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    /// Non-zero exit from a terraform command
    #[error("terraform {action} failed: {message}")]
    Command { action: String, message: String },
}

/// Thin wrapper over the `terraform` binary, run from the infrastructure
/// directory. One subprocess per call, awaited to completion, no retries.
#[derive(Debug, Clone)]
pub struct TerraformCli {
    program: PathBuf,
    workdir: PathBuf,
}

impl TerraformCli {
    pub fn discover(workdir: impl Into<PathBuf>) -> Result<Self, TerraformError> {
        let program = which::which("terraform")?;
        Ok(Self::with_program(program, workdir))
    }

    /// NOTE: Primarily used for testing with stub binaries.
    pub fn with_program(program: PathBuf, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program,
            workdir: workdir.into(),
        }
    }

    async fn run(&self, action: &str, args: &[&str]) -> Result<Output, TerraformError> {
        tracing::debug!(action, "running terraform");

        tokio::process::Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .await
            .map_err(|source| TerraformError::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    /// Runs with inherited stdio so plan/apply progress stays visible.
    async fn run_passthrough(&self, action: &str, args: &[&str]) -> Result<(), TerraformError> {
        tracing::debug!(action, "running terraform");

        let status = tokio::process::Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .status()
            .await
            .map_err(|source| TerraformError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(TerraformError::Command {
                action: action.to_string(),
                message: format!("exited with {status}"),
            })
        }
    }

    /// Whether the address exists in persisted state. A non-zero exit means
    /// the address is unknown to the tool, which is not an error here.
    pub async fn state_show(&self, address: &ResourceAddress) -> Result<bool, TerraformError> {
        let output = self
            .run(
                "state show",
                &["state", "show", "-no-color", address.as_str()],
            )
            .await?;
        Ok(output.status.success())
    }

    pub async fn import(
        &self,
        address: &ResourceAddress,
        external_id: &str,
    ) -> Result<(), ImportError> {
        let output = self
            .run(
                "import",
                &[
                    "import",
                    "-input=false",
                    "-no-color",
                    address.as_str(),
                    external_id,
                ],
            )
            .await
            .map_err(|e| ImportError::Tool {
                message: e.to_string(),
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(classify_import_failure(address, &output.stderr))
    }

    pub async fn select_workspace(&self, name: &str) -> Result<(), TerraformError> {
        let output = self
            .run(
                "workspace select",
                &["workspace", "select", "-or-create", name],
            )
            .await?;

        if output.status.success() {
            tracing::info!(workspace = %name, "workspace selected");
            return Ok(());
        }

        Err(TerraformError::Command {
            action: "workspace select".to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    pub async fn apply(&self) -> Result<(), TerraformError> {
        self.run_passthrough("apply", &["apply", "-input=false", "-auto-approve"])
            .await
    }

    /// Reads a root output value verbatim; the caller treats it as opaque.
    pub async fn output_raw(&self, name: &str) -> Result<String, TerraformError> {
        let output = self.run("output", &["output", "-raw", name]).await?;

        if !output.status.success() {
            return Err(TerraformError::Command {
                action: "output".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl StateStore for TerraformCli {
    async fn is_tracked(&self, address: &ResourceAddress) -> bool {
        match self.state_show(address).await {
            Ok(tracked) => tracked,
            Err(e) => {
                // Unknown-to-the-tool reads as untracked; a later import
                // surfaces the real problem.
                tracing::warn!(address = %address, error = %e, "state query failed, treating as untracked");
                false
            }
        }
    }

    async fn import(
        &self,
        address: &ResourceAddress,
        external_id: &str,
    ) -> Result<(), ImportError> {
        TerraformCli::import(self, address, external_id).await
    }
}

fn classify_import_failure(address: &ResourceAddress, stderr: &[u8]) -> ImportError {
    let message = String::from_utf8_lossy(stderr).trim().to_string();
    let lowered = message.to_lowercase();

    if ALREADY_MANAGED_MARKERS.iter().any(|m| lowered.contains(m)) {
        ImportError::AlreadyManaged {
            address: address.to_string(),
        }
    } else if REMOTE_MISSING_MARKERS.iter().any(|m| lowered.contains(m)) {
        ImportError::RemoteMissing {
            address: address.to_string(),
        }
    } else {
        ImportError::Tool { message }
    }
}
