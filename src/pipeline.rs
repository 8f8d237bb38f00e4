use std::path::{Path, PathBuf};

use crate::config::DeployConfig;
use crate::error::TsrError;
use crate::providers;
use crate::reconcile::{ReconcileResult, Reconciler};
use crate::resource::{AttachmentSpec, ResourceAddress, ResourceIdentity};
use crate::terraform::TerraformCli;

#[derive(Debug, Clone, PartialEq)]
pub enum StepStatus {
    Completed,
    Skipped,
    /// Completed, but some items were downgraded to warnings
    Warned,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => f.write_str("ok"),
            Self::Skipped => f.write_str("skipped"),
            Self::Warned => f.write_str("warnings"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub name: &'static str,
    pub status: StepStatus,
    pub detail: String,
}

impl StepReport {
    fn completed(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: StepStatus::Completed,
            detail: detail.into(),
        }
    }

    fn skipped(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: StepStatus::Skipped,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DeployReport {
    pub steps: Vec<StepReport>,
    pub reconcile: Option<ReconcileResult>,
    /// Opaque value from the provisioning tool, reported verbatim.
    pub service_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub infra_dir: PathBuf,
    pub build_cmd: String,
    pub sync_source: PathBuf,
    pub skip_build: bool,
    pub skip_sync: bool,
}

/// What a single reconciliation run operates on: one parent role plus its
/// ordered grant set.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileRequest {
    pub identity: ResourceIdentity,
    pub address: ResourceAddress,
    pub attachments: Vec<AttachmentSpec>,
}

impl ReconcileRequest {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self::with_overrides(config, None, &[])
    }

    pub fn with_overrides(
        config: &DeployConfig,
        role: Option<&str>,
        attachment_pairs: &[(String, String)],
    ) -> Self {
        let role_name = role
            .map(str::to_string)
            .unwrap_or_else(|| config.role_name());

        let attachments = if attachment_pairs.is_empty() {
            config.default_attachments_for(&role_name)
        } else {
            attachment_pairs
                .iter()
                .map(|(address, arn)| {
                    AttachmentSpec::role_policy(
                        ResourceAddress::new(address.clone()),
                        &role_name,
                        arn,
                    )
                })
                .collect()
        };

        Self {
            identity: ResourceIdentity::new(role_name),
            address: config.role_address(),
            attachments,
        }
    }
}

/// Provider preflight followed by the reconciliation routine. Shared by the
/// standalone `reconcile` command and the deploy pipeline.
pub async fn run_reconcile(
    config: &DeployConfig,
    infra_dir: &Path,
    request: &ReconcileRequest,
) -> Result<ReconcileResult, TsrError> {
    let terraform = TerraformCli::discover(infra_dir)?;
    reconcile_with(config, &terraform, request).await
}

async fn reconcile_with(
    config: &DeployConfig,
    terraform: &TerraformCli,
    request: &ReconcileRequest,
) -> Result<ReconcileResult, TsrError> {
    let provider = providers::get_provider("aws", config)?;
    provider.verify().await?;

    let reconciler = Reconciler::new(provider.as_ref(), terraform);
    let result = reconciler
        .reconcile(&request.identity, &request.address, &request.attachments)
        .await?;
    Ok(result)
}

/// The full deploy sequence: build, workspace, reconcile, apply, sync,
/// report. Strictly sequential; the first fatal step ends the run.
pub async fn deploy(
    config: &DeployConfig,
    options: &DeployOptions,
) -> Result<DeployReport, TsrError> {
    let mut report = DeployReport::default();

    if options.skip_build {
        report
            .steps
            .push(StepReport::skipped("build", "skipped by flag"));
    } else {
        run_build(&options.build_cmd).await?;
        report
            .steps
            .push(StepReport::completed("build", options.build_cmd.clone()));
    }

    let terraform = TerraformCli::discover(&options.infra_dir)?;
    terraform.select_workspace(&config.environment).await?;
    report
        .steps
        .push(StepReport::completed("workspace", config.environment.clone()));

    let request = ReconcileRequest::from_config(config);
    let result = reconcile_with(config, &terraform, &request).await?;
    let warnings = result.warning_count();
    report.steps.push(StepReport {
        name: "reconcile",
        status: if warnings == 0 {
            StepStatus::Completed
        } else {
            StepStatus::Warned
        },
        detail: format!("{} ({warnings} warnings)", result.parent),
    });
    report.reconcile = Some(result);

    terraform.apply().await?;
    report.steps.push(StepReport::completed("apply", ""));

    if options.skip_sync {
        report
            .steps
            .push(StepReport::skipped("sync", "skipped by flag"));
    } else {
        run_sync(config, &options.sync_source).await?;
        report
            .steps
            .push(StepReport::completed("sync", config.static_bucket()));
    }

    // Absence of the output is a reporting gap, not a failed deploy.
    match terraform.output_raw("service_url").await {
        Ok(url) => {
            report
                .steps
                .push(StepReport::completed("report", url.clone()));
            report.service_url = Some(url);
        }
        Err(e) => {
            tracing::warn!(error = %e, "service_url output unavailable");
            report
                .steps
                .push(StepReport::skipped("report", "service_url unavailable"));
        }
    }

    Ok(report)
}

async fn run_build(build_cmd: &str) -> Result<(), TsrError> {
    let words = shell_words::split(build_cmd)
        .map_err(|e| TsrError::Config(format!("invalid build command: {e}")))?;
    let (program, args) = words
        .split_first()
        .ok_or_else(|| TsrError::Config("empty build command".to_string()))?;

    tracing::info!(command = %build_cmd, "running build");

    let status = tokio::process::Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|e| TsrError::Step {
            name: "build",
            message: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(TsrError::Step {
            name: "build",
            message: format!("exited with {status}"),
        })
    }
}

async fn run_sync(config: &DeployConfig, source: &Path) -> Result<(), TsrError> {
    let aws = which::which("aws").map_err(|e| TsrError::Step {
        name: "sync",
        message: e.to_string(),
    })?;
    let bucket = config.static_bucket();

    tracing::info!(source = %source.display(), bucket = %bucket, "syncing static assets");

    let status = tokio::process::Command::new(aws)
        .arg("s3")
        .arg("sync")
        .arg(source)
        .arg(&bucket)
        .args(["--region", &config.region, "--delete"])
        .status()
        .await
        .map_err(|e| TsrError::Step {
            name: "sync",
            message: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(TsrError::Step {
            name: "sync",
            message: format!("exited with {status}"),
        })
    }
}
