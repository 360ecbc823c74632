//! # Secret Source Providers
//!
//! The [`SecretSource`] trait is the boundary to the remote secret store.
//!
//! - `aws`: AWS Secrets Manager
//! - `memory`: in-process store used by tests

pub mod aws;
pub mod memory;

pub use aws::AwsSecretsManager;
pub use memory::MemorySecretSource;

use crate::error::SecretFetchError;
use async_trait::async_trait;
use std::fmt;

/// A store that returns the raw JSON payload of a secret
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch the payload stored under `key`, optionally pinned to `version`
    async fn fetch(&self, key: &str, version: Option<&str>) -> Result<String, SecretFetchError>;
}

/// User-supplied `name[:version]` selecting one secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretIdentifier {
    pub name: String,
    pub version: Option<String>,
}

impl SecretIdentifier {
    /// Split on the first `:`. An empty version means "latest".
    /// Returns `None` when the name part is empty.
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, version) = match raw.split_once(':') {
            Some((name, version)) => (name, Some(version)),
            None => (raw, None),
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            version: version.filter(|v| !v.is_empty()).map(str::to_string),
        })
    }
}

impl fmt::Display for SecretIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}
