//! Per-request composition of the workflows.
//!
//! Every webhook or build-state event gets its own [`Activation`]: a fresh
//! [`ActivationId`], freshly decrypted secrets and a GitHub client bound to
//! them. Nothing decrypted outlives the request.

use std::sync::Arc;

use shepherd_aws::AwsServices;
use shepherd_config::RuntimeConfig;
use shepherd_core::build::BuildService;
use shepherd_core::events::{BuildStateChange, EventService};
use shepherd_core::logs::LogService;
use shepherd_core::repository::{PushEvent, SourceHost};
use shepherd_core::secret::{SecretDecryptor, Secrets};
use shepherd_core::{ActivationId, Result};
use shepherd_workflow::{
    BuildDispatcher, ConfigResolver, ProjectProvisioner, ProvisioningSettings, RelayOutcome,
    StatusRelay, TriggerOutcome, TriggerWorkflow,
};
use tracing::{Instrument, Span, info, info_span};

use crate::services::github::GitHubClient;

/// Service backends shared by all activations.
#[derive(Clone)]
pub struct Backends {
    pub builds: Arc<dyn BuildService>,
    pub logs: Arc<dyn LogService>,
    pub events: Arc<dyn EventService>,
    pub decryptor: Arc<dyn SecretDecryptor>,
}

impl From<AwsServices> for Backends {
    fn from(aws: AwsServices) -> Self {
        Self {
            builds: aws.builds,
            logs: aws.logs,
            events: aws.events,
            decryptor: aws.decryptor,
        }
    }
}

/// One trigger or relay run.
pub struct Activation {
    id: ActivationId,
    span: Span,
    trigger: TriggerWorkflow,
    relay: StatusRelay,
}

impl Activation {
    /// Decrypt the activation's secrets and wire the workflows to them.
    pub async fn start(config: &RuntimeConfig, backends: &Backends) -> Result<Self> {
        Self::start_with(config, backends, |token| {
            Arc::new(GitHubClient::new(token)) as Arc<dyn SourceHost>
        })
        .await
    }

    /// Like [`Activation::start`], with a custom source host built from the
    /// decrypted GitHub token.
    pub async fn start_with(
        config: &RuntimeConfig,
        backends: &Backends,
        source_host: impl FnOnce(&str) -> Arc<dyn SourceHost>,
    ) -> Result<Self> {
        let id = ActivationId::new();
        let span = info_span!("activation", id = %id);

        let secrets = Secrets::decrypt(backends.decryptor.as_ref(), &config.encrypted_github_token)
            .instrument(span.clone())
            .await?;
        let host = source_host(secrets.github_token());

        let settings = ProvisioningSettings {
            artifacts: config.artifacts.clone(),
            service_role: config.project_role_arn.clone(),
            status_relay_target: config.status_relay_target.clone(),
            use_oauth: config.use_oauth,
            encrypted_npm_token: config.encrypted_npm_token.clone(),
        };

        let trigger = TriggerWorkflow::new(
            ConfigResolver::new(host.clone()),
            ProjectProvisioner::new(
                backends.builds.clone(),
                backends.logs.clone(),
                backends.events.clone(),
                settings,
                secrets,
            ),
            BuildDispatcher::new(backends.builds.clone(), config.artifacts.clone()),
            config.registry.clone(),
        );
        let relay =
            StatusRelay::new(backends.builds.clone(), host).with_console_region(config.region());

        Ok(Self {
            id,
            span,
            trigger,
            relay,
        })
    }

    pub fn id(&self) -> ActivationId {
        self.id
    }

    /// Run the trigger workflow for a push.
    pub async fn trigger(&self, push: &PushEvent) -> Result<TriggerOutcome> {
        async {
            info!(repo = %push.repository, sha = %push.after, "Trigger activation started");
            self.trigger.run(push).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Run the status relay for a build-state change.
    pub async fn relay(&self, event: &BuildStateChange) -> Result<RelayOutcome> {
        async {
            info!(build_id = %event.build_id(), phase = %event.phase(), "Relay activation started");
            self.relay.relay(event).await
        }
        .instrument(self.span.clone())
        .await
    }
}
