mod cli;
mod config;
mod error;
mod output;
mod pipeline;
mod providers;
mod reconcile;
mod resource;
mod terraform;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use pipeline::{DeployOptions, ReconcileRequest};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Deploy(args) => {
            let config = args.target.to_config();
            let options = DeployOptions {
                infra_dir: args.infra_dir,
                build_cmd: args.build_cmd,
                sync_source: args.sync_source,
                skip_build: args.skip_build,
                skip_sync: args.skip_sync,
            };

            let report = pipeline::deploy(&config, &options).await?;

            if let Some(result) = &report.reconcile {
                println!("{}", output::reconcile_tree(&config.role_address(), result));
            }
            println!("{}", output::step_table(&report.steps));
            if let Some(url) = &report.service_url {
                println!("service url: {url}");
            }
        }
        Command::Reconcile(args) => {
            let config = args.target.to_config();
            let request =
                ReconcileRequest::with_overrides(&config, args.role.as_deref(), &args.attachments);

            let result = pipeline::run_reconcile(&config, &args.infra_dir, &request).await?;

            tracing::info!(
                parent = %result.parent,
                warnings = result.warning_count(),
                "reconciliation complete"
            );
            println!("{}", output::reconcile_tree(&request.address, &result));
        }
    }

    Ok(())
}
