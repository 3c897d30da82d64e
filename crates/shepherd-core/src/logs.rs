//! Log service port.

use async_trait::async_trait;

use crate::{ProjectName, Result};

/// Days the build logs of a project are kept.
pub const LOG_RETENTION_DAYS: i32 = 14;

/// Log group the build service writes a project's logs to.
pub fn log_group_name(project: &ProjectName) -> String {
    format!("/aws/codebuild/{}", project)
}

/// Result of a log group creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogGroupOutcome {
    Created,
    AlreadyExists,
}

/// Trait for log service backends.
#[async_trait]
pub trait LogService: Send + Sync {
    /// Create a log group. An existing group is reported, not failed.
    async fn create_log_group(&self, name: &str) -> Result<LogGroupOutcome>;

    /// Set how long events in a log group are kept.
    async fn put_retention_policy(&self, name: &str, days: i32) -> Result<()>;
}
