//! Backends for router and activation tests that never leave the process.

use std::sync::Arc;

use async_trait::async_trait;
use shepherd_config::{PartialConfig, RuntimeConfig};
use shepherd_core::build::{Build, BuildRequest, BuildService};
use shepherd_core::events::{EventService, NotificationRule, RuleTarget};
use shepherd_core::logs::{LogGroupOutcome, LogService};
use shepherd_core::project::{BuildProject, ProjectSpec};
use shepherd_core::secret::SecretDecryptor;
use shepherd_core::{Error, ProjectName, Result, Service};

use crate::activation::Backends;

pub const WEBHOOK_SECRET: &str = "hook-secret";

pub fn config() -> RuntimeConfig {
    PartialConfig::from_vars([
        ("GITHUB_ACCESS_TOKEN", "Z2gtY2lwaGVy"),
        ("NPM_ACCESS_TOKEN", "bnBtLWNpcGhlcg=="),
        ("AWS_ACCOUNT_ID", "123456789012"),
        ("AWS_REGION", "us-east-1"),
        ("ARTIFACT_BUCKET", "bundles"),
        ("PROJECT_ROLE", "bundle-shepherd-project"),
        (
            "STATUS_RELAY_TARGET",
            "arn:aws:lambda:us-east-1:123456789012:function:relay",
        ),
        ("GITHUB_WEBHOOK_SECRET", WEBHOOK_SECRET),
    ])
    .and_then(PartialConfig::build)
    .unwrap()
}

/// Knows no projects or builds and refuses every write.
pub struct OfflineServices {
    fail_decryption: bool,
}

impl OfflineServices {
    pub fn backends() -> Backends {
        Self::wire(Self {
            fail_decryption: false,
        })
    }

    pub fn backends_failing_decryption() -> Backends {
        Self::wire(Self {
            fail_decryption: true,
        })
    }

    fn wire(services: Self) -> Backends {
        let services = Arc::new(services);
        Backends {
            builds: services.clone(),
            logs: services.clone(),
            events: services.clone(),
            decryptor: services,
        }
    }
}

fn offline(service: Service, operation: &'static str) -> Error {
    Error::upstream(service, operation, "offline")
}

#[async_trait]
impl BuildService for OfflineServices {
    async fn find_project(&self, _name: &ProjectName) -> Result<Option<BuildProject>> {
        Ok(None)
    }

    async fn create_project(&self, _spec: &ProjectSpec) -> Result<BuildProject> {
        Err(offline(Service::Build, "CreateProject"))
    }

    async fn start_build(&self, _request: &BuildRequest) -> Result<Build> {
        Err(offline(Service::Build, "StartBuild"))
    }

    async fn find_build(&self, _id: &str) -> Result<Option<Build>> {
        Ok(None)
    }
}

#[async_trait]
impl LogService for OfflineServices {
    async fn create_log_group(&self, _name: &str) -> Result<LogGroupOutcome> {
        Err(offline(Service::Logs, "CreateLogGroup"))
    }

    async fn put_retention_policy(&self, _name: &str, _days: i32) -> Result<()> {
        Err(offline(Service::Logs, "PutRetentionPolicy"))
    }
}

#[async_trait]
impl EventService for OfflineServices {
    async fn put_rule(&self, _rule: &NotificationRule) -> Result<String> {
        Err(offline(Service::Events, "PutRule"))
    }

    async fn put_target(&self, _rule_name: &str, _target: &RuleTarget) -> Result<()> {
        Err(offline(Service::Events, "PutTargets"))
    }
}

#[async_trait]
impl SecretDecryptor for OfflineServices {
    async fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if self.fail_decryption {
            return Err(Error::Decryption("key is disabled".to_string()));
        }
        Ok(format!("plain:{}", ciphertext))
    }
}
