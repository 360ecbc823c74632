//! # Configuration
//!
//! Run settings loaded from environment variables, overridable from the CLI.
//!
//! All settings have sensible defaults. The AWS region and credentials are left
//! to the AWS SDK default provider chain unless a region is given explicitly.

use crate::constants::{DEFAULT_TIMEOUT_SECS, ENDPOINT_ENV, TIMEOUT_ENV};
use std::time::Duration;

/// Secrets Manager client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecstacheConfig {
    /// AWS region; `None` defers to the SDK provider chain (`AWS_REGION`, profile, IMDS)
    pub region: Option<String>,
    /// Endpoint override, e.g. a local mock of Secrets Manager
    pub endpoint_url: Option<String>,
    /// Upper bound for a single Secrets Manager operation
    pub timeout: Duration,
}

impl Default for SecstacheConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SecstacheConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            region: None,
            endpoint_url: lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()),
            timeout: Duration::from_secs(var_or_default(
                &lookup,
                TIMEOUT_ENV,
                DEFAULT_TIMEOUT_SECS,
            )),
        }
    }

    /// Apply CLI overrides on top of the environment
    #[must_use]
    pub fn with_overrides(
        mut self,
        region: Option<String>,
        endpoint_url: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        if region.is_some() {
            self.region = region;
        }
        if endpoint_url.is_some() {
            self.endpoint_url = endpoint_url;
        }
        if let Some(secs) = timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }
}

/// Read variable or return default value
fn var_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
