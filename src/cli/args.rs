use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DeployConfig;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build, reconcile state, apply infrastructure, and sync assets
    Deploy(DeployArgs),
    /// Adopt existing provider resources into provisioning state
    Reconcile(ReconcileArgs),
}

#[derive(clap::Args, Debug)]
pub struct TargetArgs {
    /// Deployment environment
    #[arg(default_value = "dev")]
    pub environment: String,

    /// Project name
    #[arg(default_value = "twin")]
    pub project: String,

    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Expected account of the active credentials
    #[arg(long, env = "AWS_ACCOUNT_ID")]
    pub account_id: Option<String>,
}

impl TargetArgs {
    pub fn to_config(&self) -> DeployConfig {
        DeployConfig::new(
            &self.environment,
            &self.project,
            &self.region,
            self.account_id.clone(),
        )
    }
}

#[derive(clap::Args, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Terraform working directory
    #[arg(long, default_value = "infra")]
    pub infra_dir: PathBuf,

    /// Build command run before provisioning
    #[arg(long, default_value = "npm run build")]
    pub build_cmd: String,

    /// Directory of built static assets
    #[arg(long, default_value = "dist")]
    pub sync_source: PathBuf,

    #[arg(long)]
    pub skip_build: bool,

    #[arg(long)]
    pub skip_sync: bool,
}

#[derive(clap::Args, Debug)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Terraform working directory
    #[arg(long, default_value = "infra")]
    pub infra_dir: PathBuf,

    /// Role name override (defaults to <project>-<environment>-exec)
    #[arg(long)]
    pub role: Option<String>,

    /// Grant override as ADDRESS=POLICY_ARN, repeatable
    #[arg(long = "attach", value_name = "ADDRESS=POLICY_ARN", value_parser = parse_attachment)]
    pub attachments: Vec<(String, String)>,
}

fn parse_attachment(input: &str) -> Result<(String, String), String> {
    let (address, arn) = input
        .split_once('=')
        .ok_or_else(|| format!("expected ADDRESS=POLICY_ARN, got '{input}'"))?;
    if address.is_empty() {
        return Err(format!("expected ADDRESS=POLICY_ARN, got '{input}'"));
    }
    if !crate::providers::aws::is_policy_arn(arn) {
        return Err(format!("'{arn}' is not an IAM policy ARN"));
    }
    Ok((address.to_string(), arn.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    #[test]
    fn test_deploy_defaults() {
        let cli = Cli::parse_from(["tsr", "deploy"]);

        if let Command::Deploy(args) = cli.command {
            assert_eq!(args.target.environment, "dev");
            assert_eq!(args.target.project, "twin");
            assert_eq!(args.build_cmd, "npm run build");
            assert_eq!(args.infra_dir, PathBuf::from("infra"));
            assert!(!args.skip_build);
            assert!(!args.skip_sync);
        } else {
            panic!("Expected Deploy command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_deploy_positional_environment_and_project() {
        let cli = Cli::parse_from(["tsr", "deploy", "staging", "atlas"]);

        if let Command::Deploy(args) = cli.command {
            assert_eq!(args.target.environment, "staging");
            assert_eq!(args.target.project, "atlas");
        } else {
            panic!("Expected Deploy command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_reconcile_role_override() {
        let cli = Cli::parse_from(["tsr", "reconcile", "--role=legacy-exec"]);

        if let Command::Reconcile(args) = cli.command {
            assert_eq!(args.role, Some("legacy-exec".to_string()));
            assert!(args.attachments.is_empty());
        } else {
            panic!("Expected Reconcile command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_reconcile_attach_is_repeatable() {
        let cli = Cli::parse_from([
            "tsr",
            "reconcile",
            "--attach",
            "aws_iam_role_policy_attachment.logs=arn:aws:iam::aws:policy/CloudWatchLogsFullAccess",
            "--attach",
            "aws_iam_role_policy_attachment.queue=arn:aws:iam::aws:policy/AmazonSQSFullAccess",
        ]);

        if let Command::Reconcile(args) = cli.command {
            assert_eq!(args.attachments.len(), 2);
            assert_eq!(
                args.attachments[0].0,
                "aws_iam_role_policy_attachment.logs"
            );
            assert_eq!(
                args.attachments[1].1,
                "arn:aws:iam::aws:policy/AmazonSQSFullAccess"
            );
        } else {
            panic!("Expected Reconcile command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_attach_rejects_missing_separator() {
        let result = Cli::try_parse_from(["tsr", "reconcile", "--attach", "no-separator"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_attachment_rejects_empty_sides() {
        assert!(parse_attachment("=arn:aws:iam::aws:policy/Foo").is_err());
        assert!(parse_attachment("aws_iam_role_policy_attachment.logs=").is_err());
    }

    #[test]
    fn test_parse_attachment_rejects_bare_policy_name() {
        let result = parse_attachment("aws_iam_role_policy_attachment.logs=CloudWatchLogsFullAccess");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("not an IAM policy ARN"));
    }

    #[test]
    #[serial]
    fn test_region_from_env_var_fallback() {
        let region_backup = std::env::var("AWS_REGION").ok();

        unsafe {
            std::env::set_var("AWS_REGION", "eu-west-1");
        }

        let cli = Cli::parse_from(["tsr", "deploy"]);

        unsafe {
            match region_backup {
                Some(region) => std::env::set_var("AWS_REGION", region),
                None => std::env::remove_var("AWS_REGION"),
            }
        }

        if let Command::Deploy(args) = cli.command {
            assert_eq!(args.target.region, "eu-west-1");
        } else {
            panic!("Expected Deploy command, got {:?}", cli.command);
        }
    }

    #[test]
    #[serial]
    fn test_region_cli_flag_takes_precedence_over_env() {
        let region_backup = std::env::var("AWS_REGION").ok();

        unsafe {
            std::env::set_var("AWS_REGION", "eu-west-1");
        }

        let cli = Cli::parse_from(["tsr", "deploy", "--region=us-west-2"]);

        unsafe {
            match region_backup {
                Some(region) => std::env::set_var("AWS_REGION", region),
                None => std::env::remove_var("AWS_REGION"),
            }
        }

        if let Command::Deploy(args) = cli.command {
            assert_eq!(args.target.region, "us-west-2");
        } else {
            panic!("Expected Deploy command, got {:?}", cli.command);
        }
    }

    #[test]
    #[serial]
    fn test_account_id_absent_without_env() {
        let account_backup = std::env::var("AWS_ACCOUNT_ID").ok();
        unsafe {
            std::env::remove_var("AWS_ACCOUNT_ID");
        }

        let cli = Cli::parse_from(["tsr", "reconcile"]);

        unsafe {
            if let Some(account) = account_backup {
                std::env::set_var("AWS_ACCOUNT_ID", account);
            }
        }

        if let Command::Reconcile(args) = cli.command {
            assert!(args.target.account_id.is_none());
        } else {
            panic!("Expected Reconcile command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_to_config_carries_target() {
        let cli = Cli::parse_from([
            "tsr",
            "deploy",
            "prod",
            "twin",
            "--region=us-west-2",
            "--account-id=123456789012",
        ]);

        if let Command::Deploy(args) = cli.command {
            let config = args.target.to_config();
            assert_eq!(config.environment, "prod");
            assert_eq!(config.project, "twin");
            assert_eq!(config.region, "us-west-2");
            assert_eq!(config.account_id, Some("123456789012".to_string()));
        } else {
            panic!("Expected Deploy command, got {:?}", cli.command);
        }
    }
}
