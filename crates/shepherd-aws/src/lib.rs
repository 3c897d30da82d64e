//! AWS backends for bundle-shepherd.
//!
//! Implements the service ports of `shepherd_core`:
//! - CodeBuild for builds and projects
//! - CloudWatch Logs for project log groups
//! - EventBridge for build-state-change routing
//! - KMS for secret decryption

pub mod codebuild;
pub mod events;
pub mod kms;
pub mod logs;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};

pub use codebuild::CodeBuildService;
pub use events::EventBridgeService;
pub use kms::KmsDecryptor;
pub use logs::CloudWatchLogService;

/// One client per AWS service, sharing a single SDK configuration.
#[derive(Clone)]
pub struct AwsServices {
    pub builds: Arc<CodeBuildService>,
    pub logs: Arc<CloudWatchLogService>,
    pub events: Arc<EventBridgeService>,
    pub decryptor: Arc<KmsDecryptor>,
}

impl AwsServices {
    /// Load credentials from the default provider chain for `region`.
    pub async fn load(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::from_config(&config)
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self {
            builds: Arc::new(CodeBuildService::new(aws_sdk_codebuild::Client::new(config))),
            logs: Arc::new(CloudWatchLogService::new(
                aws_sdk_cloudwatchlogs::Client::new(config),
            )),
            events: Arc::new(EventBridgeService::new(aws_sdk_eventbridge::Client::new(
                config,
            ))),
            decryptor: Arc::new(KmsDecryptor::new(aws_sdk_kms::Client::new(config))),
        }
    }
}
