//! # secstache
//!
//! Fill Mustache templates with secrets from AWS Secrets Manager.
//!
//! Every `--asm` identifier is fetched and its JSON object payload merged into
//! one mapping. Each `*.mustache` file given is rendered to the same path
//! without the suffix; with no files, standard input is rendered to standard
//! output.

use anyhow::Result;
use clap::Parser;
use secstache::cli::Cli;
use secstache::constants::DEFAULT_LOG_FILTER;
use secstache::pipeline;
use secstache::provider::AwsSecretsManager;
use tracing::{debug, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so rendered output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    debug!("Configuration: {:?}", config);

    let client = AwsSecretsManager::new(&config).await;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let report = pipeline::run(&cli.run_options(), &client, stdin.lock(), &mut stdout).await?;

    if !report.failed.is_empty() {
        warn!(
            "{} of {} templates failed to render",
            report.failed.len(),
            report.failed.len() + report.rendered.len()
        );
    }

    Ok(())
}
