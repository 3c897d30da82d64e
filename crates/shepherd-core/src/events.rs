//! Event service port, notification rules and build-state-change events.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::build::BuildPhase;
use crate::{Error, ProjectName, Result};

/// Target id used for the status relay on every rule.
pub const STATUS_RELAY_TARGET_ID: &str = "status-relay";

/// Rule routing build-state-change events of one project to the status relay.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRule {
    pub name: String,
    pub description: String,
    pub event_pattern: serde_json::Value,
}

impl NotificationRule {
    /// Rule matching every phase change of `project`'s builds. The rule is
    /// named after the project.
    pub fn for_project(project: &ProjectName) -> Self {
        let phases: Vec<&str> = BuildPhase::ALL.iter().map(|p| p.as_str()).collect();

        Self {
            name: project.to_string(),
            description: format!("Build state changes for {}", project),
            event_pattern: json!({
                "source": ["aws.codebuild"],
                "detail-type": ["CodeBuild Build State Change"],
                "detail": {
                    "build-status": phases,
                    "project-name": [project.as_str()],
                }
            }),
        }
    }
}

/// Endpoint a rule delivers matching events to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTarget {
    pub id: String,
    pub arn: String,
}

/// Trait for event service backends.
#[async_trait]
pub trait EventService: Send + Sync {
    /// Create or update an enabled rule. Returns the rule ARN.
    async fn put_rule(&self, rule: &NotificationRule) -> Result<String>;

    /// Attach a target to an existing rule.
    async fn put_target(&self, rule_name: &str, target: &RuleTarget) -> Result<()>;
}

/// Build-state-change notification received by the status relay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildStateChange {
    pub detail: BuildStateDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildStateDetail {
    #[serde(rename = "build-id")]
    pub build_id: String,
    #[serde(rename = "build-status")]
    pub build_status: BuildPhase,
}

impl BuildStateChange {
    pub fn new(build_id: impl Into<String>, phase: BuildPhase) -> Self {
        Self {
            detail: BuildStateDetail {
                build_id: build_id.into(),
                build_status: phase,
            },
        }
    }

    /// Parse an event envelope. Unknown phases are rejected.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::InvalidEvent(e.to_string()))
    }

    pub fn build_id(&self) -> &str {
        &self.detail.build_id
    }

    pub fn phase(&self) -> BuildPhase {
        self.detail.build_status
    }
}
