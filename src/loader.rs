//! # Secret Loader
//!
//! Fetches every requested identifier, parses each payload as a flat JSON
//! object and merges the results into one [`SecretMap`].
//!
//! A failing identifier never aborts the batch. Each identifier produces a
//! [`LoadOutcome`] so callers can see exactly which secrets contributed.

use crate::error::{LoadError, SecretParseError};
use crate::provider::{SecretIdentifier, SecretSource};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Combined key/value mapping handed to the renderer
pub type SecretMap = BTreeMap<String, Value>;

/// Result of loading a single identifier
#[derive(Debug)]
pub struct LoadOutcome {
    /// Identifier exactly as supplied
    pub identifier: String,
    /// Number of keys merged, or why the identifier was skipped
    pub result: Result<usize, LoadError>,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Merged secrets plus the per-identifier outcomes, in input order
#[derive(Debug, Default)]
pub struct LoadReport {
    pub secrets: SecretMap,
    pub outcomes: Vec<LoadOutcome>,
}

impl LoadReport {
    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &LoadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_loaded())
    }
}

/// Load and merge all identifiers. Later identifiers win on key collisions.
pub async fn load_secrets<S>(source: &S, identifiers: &[String]) -> LoadReport
where
    S: SecretSource + ?Sized,
{
    let mut report = LoadReport::default();

    for raw in identifiers {
        let result = load_one(source, raw).await.map(|secrets| {
            let count = secrets.len();
            report.secrets.extend(secrets);
            count
        });

        match &result {
            Ok(count) => info!("Loaded {} keys from secret '{}'", count, raw),
            Err(e) => warn!("Failed to load secrets from secret '{}': {}", raw, e),
        }

        report.outcomes.push(LoadOutcome {
            identifier: raw.clone(),
            result,
        });
    }

    report
}

async fn load_one<S>(source: &S, raw: &str) -> Result<SecretMap, LoadError>
where
    S: SecretSource + ?Sized,
{
    let identifier = SecretIdentifier::parse(raw).ok_or_else(|| LoadError::InvalidIdentifier {
        identifier: raw.to_string(),
    })?;

    let payload = source
        .fetch(&identifier.name, identifier.version.as_deref())
        .await?;

    Ok(parse_payload(&payload)?)
}

/// Parse a secret payload. Anything other than a JSON object is rejected.
pub fn parse_payload(payload: &str) -> Result<SecretMap, SecretParseError> {
    match serde_json::from_str::<Value>(payload)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(SecretParseError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SecretFetchError;
    use crate::provider::MemorySecretSource;
    use serde_json::json;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_payload_object() {
        let map = parse_payload(r#"{"user":"alice","port":5432,"tls":true}"#).unwrap();
        assert_eq!(map["user"], json!("alice"));
        assert_eq!(map["port"], json!(5432));
        assert_eq!(map["tls"], json!(true));
    }

    #[test]
    fn test_parse_payload_rejects_non_object() {
        let err = parse_payload(r#"["a","b"]"#).unwrap_err();
        assert!(matches!(err, SecretParseError::NotAnObject { found: "array" }));

        let err = parse_payload("plain-text-password").unwrap_err();
        assert!(matches!(err, SecretParseError::InvalidJson(_)));
    }

    #[tokio::test]
    async fn test_disjoint_payloads_merge_to_union() {
        let source = MemorySecretSource::new()
            .with_secret("a", r#"{"one":"1"}"#)
            .with_secret("b", r#"{"two":"2"}"#);

        let report = load_secrets(&source, &ids(&["a", "b"])).await;

        assert_eq!(report.secrets.len(), 2);
        assert_eq!(report.secrets["one"], json!("1"));
        assert_eq!(report.secrets["two"], json!("2"));
        assert_eq!(report.failures().count(), 0);
    }

    #[tokio::test]
    async fn test_later_identifier_wins() {
        let source = MemorySecretSource::new()
            .with_secret("base", r#"{"host":"db.internal","user":"base"}"#)
            .with_secret("override", r#"{"user":"admin"}"#);

        let report = load_secrets(&source, &ids(&["base", "override"])).await;
        assert_eq!(report.secrets["user"], json!("admin"));
        assert_eq!(report.secrets["host"], json!("db.internal"));

        let report = load_secrets(&source, &ids(&["override", "base"])).await;
        assert_eq!(report.secrets["user"], json!("base"));
    }

    #[tokio::test]
    async fn test_versioned_identifier() {
        let source = MemorySecretSource::new()
            .with_secret("app", r#"{"token":"new"}"#)
            .with_version("app", "v1", r#"{"token":"old"}"#);

        let report = load_secrets(&source, &ids(&["app:v1"])).await;
        assert_eq!(report.secrets["token"], json!("old"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_skipped() {
        let source = MemorySecretSource::new()
            .with_secret("good", r#"{"key":"value"}"#)
            .with_failure(
                "denied",
                SecretFetchError::AccessDenied {
                    key: "denied".to_string(),
                    message: "not authorized".to_string(),
                },
            );

        let report = load_secrets(&source, &ids(&["denied", "missing", "good"])).await;

        assert_eq!(report.secrets.len(), 1);
        assert_eq!(report.outcomes.len(), 3);
        assert!(matches!(
            report.outcomes[0].result,
            Err(LoadError::Fetch(SecretFetchError::AccessDenied { .. }))
        ));
        assert!(matches!(
            report.outcomes[1].result,
            Err(LoadError::Fetch(SecretFetchError::NotFound { .. }))
        ));
        assert!(matches!(report.outcomes[2].result, Ok(1)));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_skipped() {
        let source = MemorySecretSource::new()
            .with_secret("broken", "{not json")
            .with_secret("good", r#"{"key":"value"}"#);

        let report = load_secrets(&source, &ids(&["broken", "good"])).await;

        assert_eq!(report.secrets.len(), 1);
        assert!(matches!(
            report.outcomes[0].result,
            Err(LoadError::Parse(SecretParseError::InvalidJson(_)))
        ));
    }

    #[tokio::test]
    async fn test_empty_name_is_invalid() {
        let source = MemorySecretSource::new();
        let report = load_secrets(&source, &ids(&[":v1"])).await;
        assert!(report.secrets.is_empty());
        assert!(matches!(
            report.outcomes[0].result,
            Err(LoadError::InvalidIdentifier { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_identifiers_yields_empty_report() {
        let source = MemorySecretSource::new();
        let report = load_secrets(&source, &[]).await;
        assert!(report.secrets.is_empty());
        assert!(report.outcomes.is_empty());
    }
}
