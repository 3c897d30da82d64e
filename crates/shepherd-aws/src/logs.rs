//! CloudWatch Logs backend for the log service port.

use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::Client;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use shepherd_core::logs::{LogGroupOutcome, LogService};
use shepherd_core::{Error, Result, Service};

pub struct CloudWatchLogService {
    client: Client,
}

impl CloudWatchLogService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogService for CloudWatchLogService {
    async fn create_log_group(&self, name: &str) -> Result<LogGroupOutcome> {
        match self.client.create_log_group().log_group_name(name).send().await {
            Ok(_) => Ok(LogGroupOutcome::Created),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_already_exists_exception()) =>
            {
                Ok(LogGroupOutcome::AlreadyExists)
            }
            Err(err) => Err(Error::upstream(
                Service::Logs,
                "CreateLogGroup",
                DisplayErrorContext(err),
            )),
        }
    }

    async fn put_retention_policy(&self, name: &str, days: i32) -> Result<()> {
        self.client
            .put_retention_policy()
            .log_group_name(name)
            .retention_in_days(days)
            .send()
            .await
            .map_err(|e| {
                Error::upstream(Service::Logs, "PutRetentionPolicy", DisplayErrorContext(e))
            })?;
        Ok(())
    }
}
