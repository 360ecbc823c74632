//! # Constants
//!
//! Default values shared by the CLI, configuration and pipeline.

/// Suffix a template file must carry; the rendered file drops it
pub const TEMPLATE_SUFFIX: &str = ".mustache";

/// Default per-operation timeout for AWS Secrets Manager calls (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the operation timeout
pub const TIMEOUT_ENV: &str = "SECSTACHE_TIMEOUT_SECS";

/// Environment variable overriding the Secrets Manager endpoint
pub const ENDPOINT_ENV: &str = "AWS_SECRETS_MANAGER_ENDPOINT";

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "secstache=info";

/// Maximum nesting of `{{> partial}}` inclusions
pub const MAX_PARTIAL_DEPTH: usize = 32;
