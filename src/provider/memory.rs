//! # In-Memory Secret Source
//!
//! Serves payloads from a map. Used by the loader and pipeline tests.

use super::SecretSource;
use crate::error::SecretFetchError;
use async_trait::async_trait;
use std::collections::HashMap;

/// In-memory [`SecretSource`]
///
/// Payloads are stored per name, either as the latest value or pinned to a
/// version. Names registered with [`MemorySecretSource::with_failure`] always
/// fail with the given error.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretSource {
    latest: HashMap<String, String>,
    versions: HashMap<(String, String), String>,
    failures: HashMap<String, SecretFetchError>,
}

impl MemorySecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` as the latest value of `name`
    #[must_use]
    pub fn with_secret(mut self, name: impl Into<String>, payload: impl Into<String>) -> Self {
        self.latest.insert(name.into(), payload.into());
        self
    }

    /// Store `payload` under a specific `version` of `name`
    #[must_use]
    pub fn with_version(
        mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        self.versions
            .insert((name.into(), version.into()), payload.into());
        self
    }

    /// Make every fetch of `name` fail with `error`
    #[must_use]
    pub fn with_failure(mut self, name: impl Into<String>, error: SecretFetchError) -> Self {
        self.failures.insert(name.into(), error);
        self
    }
}

#[async_trait]
impl SecretSource for MemorySecretSource {
    async fn fetch(&self, key: &str, version: Option<&str>) -> Result<String, SecretFetchError> {
        if let Some(error) = self.failures.get(key) {
            return Err(error.clone());
        }

        let payload = match version {
            Some(version) => self.versions.get(&(key.to_string(), version.to_string())),
            None => self.latest.get(key),
        };

        payload.cloned().ok_or_else(|| SecretFetchError::NotFound {
            key: key.to_string(),
        })
    }
}
