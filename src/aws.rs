use aws_config::{retry::RetryConfig, BehaviorVersion, Region, SdkConfig};

/// Shared SDK configuration for a region. Credentials come from the default provider chain.
pub(crate) async fn sdk_config(region: &str, retry: RetryConfig) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .retry_config(retry)
        .load()
        .await
}
