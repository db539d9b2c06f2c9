//! Shared AWS SDK configuration

use aws_config::{BehaviorVersion, Region, SdkConfig};
#[cfg(feature = "aws-rekognition")]
use aws_sdk_rekognition::config::Credentials;
#[cfg(all(feature = "aws-transcribe", not(feature = "aws-rekognition")))]
use aws_sdk_transcribe::config::Credentials;
use modera_core::AwsSettings;

/// Load SDK configuration for the configured region.
///
/// Static credentials from settings take precedence; otherwise the default
/// provider chain (environment, profile, instance metadata) applies.
pub async fn load_sdk_config(aws: &AwsSettings) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));

    if let Some((access_key_id, secret_access_key)) = aws.static_credentials() {
        loader = loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "modera-config",
        ));
    }

    loader.load().await
}
