//! # CLI
//!
//! Command-line arguments for `secstache`.
//!
//! ## Usage
//!
//! ```bash
//! # Create db.conf from db.conf.mustache using secrets stored under "prod/db"
//! secstache --asm prod/db db.conf.mustache
//!
//! # Pin a secret version and render standard input
//! secstache --asm prod/db:3f1a2b4c --strict < app.env.mustache > app.env
//! ```

use crate::config::SecstacheConfig;
use crate::pipeline::RunOptions;
use clap::Parser;
use std::path::PathBuf;

const EXAMPLE: &str = "EXAMPLE:
\tCreate db.conf from db.conf.mustache using secrets in AWS Secret Manager under \"prod/db\"

\t\tsecstache --asm prod/db db.conf.mustache";

/// Fill mustache template(s) with secrets from secret store(s)
#[derive(Debug, Parser)]
#[command(name = "secstache", version)]
#[command(about = "Fill mustache template(s) with secrets from secret store(s).", long_about = None)]
#[command(after_help = EXAMPLE)]
pub struct Cli {
    /// Mustache files to process; standard input is rendered to standard output when none are given
    #[arg(value_name = "file1.mustache")]
    pub files: Vec<PathBuf>,

    /// AWS Secret Manager key, `name` or `name:version` (repeatable)
    #[arg(long = "asm", value_name = "key")]
    pub asm: Vec<String>,

    /// Fail if a tag key is not found
    #[arg(long)]
    pub strict: bool,

    /// AWS region (defaults to the AWS SDK provider chain)
    #[arg(long)]
    pub region: Option<String>,

    /// Secrets Manager endpoint override [env: AWS_SECRETS_MANAGER_ENDPOINT]
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Timeout for each Secrets Manager call [env: SECSTACHE_TIMEOUT_SECS] [default: 30]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            files: self.files.clone(),
            identifiers: self.asm.clone(),
            strict: self.strict,
            ..RunOptions::default()
        }
    }

    /// Environment configuration with this invocation's overrides applied
    pub fn config(&self) -> SecstacheConfig {
        SecstacheConfig::from_env().with_overrides(
            self.region.clone(),
            self.endpoint_url.clone(),
            self.timeout_secs,
        )
    }
}
