//! # AWS Secrets Manager Authentication
//!
//! Handles AWS SDK configuration and authentication setup.

use crate::config::SecstacheConfig;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::info;

/// Create AWS SDK config using the default credential chain
///
/// Credentials come from the environment, shared profile, SSO, web identity or
/// instance metadata, whichever the SDK finds first. Every operation is bounded
/// by the configured timeout and the SDK's own retries are disabled.
pub async fn create_sdk_config(config: &SecstacheConfig) -> SdkConfig {
    let timeout_config = TimeoutConfig::builder()
        .operation_timeout(config.timeout)
        .build();

    let mut builder = aws_config::defaults(BehaviorVersion::latest())
        .timeout_config(timeout_config)
        .retry_config(RetryConfig::disabled());

    if let Some(region) = &config.region {
        info!("Using AWS region {}", region);
        builder = builder.region(Region::new(region.clone()));
    }

    // Route requests to a local mock or VPC endpoint instead of the public AWS endpoint
    if let Some(endpoint) = &config.endpoint_url {
        info!("Routing AWS Secrets Manager requests to {}", endpoint);
        builder = builder.endpoint_url(endpoint);
    }

    builder.load().await
}
