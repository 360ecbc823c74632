//! # AWS Secrets Manager Client
//!
//! Client for reading secret values from AWS Secrets Manager.
//!
//! The client is constructed once per run from a [`SecstacheConfig`] and passed
//! to the loader. SDK errors are mapped onto [`SecretFetchError`].

mod auth;

use super::SecretSource;
use crate::config::SecstacheConfig;
use crate::error::SecretFetchError;
use async_trait::async_trait;
use aws_sdk_secretsmanager::config::http::HttpResponse;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use tracing::{debug, debug_span, Instrument};

pub use self::auth::create_sdk_config;

/// AWS Secrets Manager provider implementation
pub struct AwsSecretsManager {
    client: SecretsManagerClient,
    region: Option<String>,
}

impl std::fmt::Debug for AwsSecretsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretsManager")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsSecretsManager {
    /// Create a new AWS Secrets Manager client
    pub async fn new(config: &SecstacheConfig) -> Self {
        let sdk_config = create_sdk_config(config).await;
        let region = sdk_config.region().map(ToString::to_string);
        debug!("AWS Secrets Manager client created (region: {:?})", region);

        Self {
            client: SecretsManagerClient::new(&sdk_config),
            region,
        }
    }
}

#[async_trait]
impl SecretSource for AwsSecretsManager {
    async fn fetch(&self, key: &str, version: Option<&str>) -> Result<String, SecretFetchError> {
        let span = debug_span!(
            "aws.secretsmanager.secret.get",
            secret.name = key,
            secret.version = version.unwrap_or("latest")
        );

        async move {
            let output = self
                .client
                .get_secret_value()
                .secret_id(key)
                .set_version_id(version.map(str::to_string))
                .send()
                .await
                .map_err(|e| classify_sdk_error(key, &e))?;

            output
                .secret_string()
                .map(str::to_string)
                .ok_or_else(|| SecretFetchError::NoSecretString {
                    key: key.to_string(),
                })
        }
        .instrument(span)
        .await
    }
}

/// Map an SDK failure onto the fetch error taxonomy
fn classify_sdk_error(
    key: &str,
    error: &SdkError<GetSecretValueError, HttpResponse>,
) -> SecretFetchError {
    let message = DisplayErrorContext(error).to_string();
    match error {
        SdkError::TimeoutError(_) => SecretFetchError::Timeout {
            key: key.to_string(),
        },
        SdkError::DispatchFailure(failure) if failure.is_timeout() => SecretFetchError::Timeout {
            key: key.to_string(),
        },
        SdkError::DispatchFailure(_) => SecretFetchError::Network {
            key: key.to_string(),
            message,
        },
        SdkError::ServiceError(service) => classify_service_error(key, service.err().code(), message),
        _ => SecretFetchError::Other {
            key: key.to_string(),
            message,
        },
    }
}

/// Map a Secrets Manager error code onto the fetch error taxonomy
fn classify_service_error(key: &str, code: Option<&str>, message: String) -> SecretFetchError {
    match code {
        Some("ResourceNotFoundException") => SecretFetchError::NotFound {
            key: key.to_string(),
        },
        Some(
            "AccessDeniedException"
            | "AccessDenied"
            | "UnrecognizedClientException"
            | "InvalidSignatureException"
            | "ExpiredTokenException",
        ) => SecretFetchError::AccessDenied {
            key: key.to_string(),
            message,
        },
        _ => SecretFetchError::Other {
            key: key.to_string(),
            message,
        },
    }
}
