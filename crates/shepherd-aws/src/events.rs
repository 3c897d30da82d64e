//! EventBridge backend for the event service port.

use async_trait::async_trait;
use aws_sdk_eventbridge::Client;
use aws_sdk_eventbridge::error::DisplayErrorContext;
use aws_sdk_eventbridge::types::{RuleState, Target};
use shepherd_core::events::{EventService, NotificationRule, RuleTarget};
use shepherd_core::{Error, Result, Service};

pub struct EventBridgeService {
    client: Client,
}

impl EventBridgeService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventService for EventBridgeService {
    async fn put_rule(&self, rule: &NotificationRule) -> Result<String> {
        let output = self
            .client
            .put_rule()
            .name(&rule.name)
            .description(&rule.description)
            .event_pattern(rule.event_pattern.to_string())
            .state(RuleState::Enabled)
            .send()
            .await
            .map_err(|e| Error::upstream(Service::Events, "PutRule", DisplayErrorContext(e)))?;

        Ok(output.rule_arn().unwrap_or(&rule.name).to_string())
    }

    async fn put_target(&self, rule_name: &str, target: &RuleTarget) -> Result<()> {
        let target = Target::builder()
            .id(&target.id)
            .arn(&target.arn)
            .build()
            .map_err(|e| Error::upstream(Service::Events, "PutTargets", e))?;

        let output = self
            .client
            .put_targets()
            .rule(rule_name)
            .targets(target)
            .send()
            .await
            .map_err(|e| {
                Error::upstream(Service::Events, "PutTargets", DisplayErrorContext(e))
            })?;

        // PutTargets reports per-target failures in a successful response.
        if let Some(entry) = output.failed_entries().first() {
            return Err(Error::upstream(
                Service::Events,
                "PutTargets",
                format!(
                    "target {} rejected: {}",
                    entry.target_id().unwrap_or_default(),
                    entry.error_message().unwrap_or("unknown error")
                ),
            ));
        }

        Ok(())
    }
}
