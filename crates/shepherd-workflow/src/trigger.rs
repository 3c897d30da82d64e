//! Push-triggered bundle builds.

use serde::Serialize;
use shepherd_core::build::Build;
use shepherd_core::repository::PushEvent;
use shepherd_core::{ImageRegistry, ProjectName, Result};
use tracing::info;

use crate::dispatcher::BuildDispatcher;
use crate::provisioner::{ProjectProvisioner, ProvisionOptions};
use crate::resolver::ConfigResolver;

/// What a push activation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriggerOutcome {
    Dispatched { build: Build },
    Skipped { reason: String },
}

/// Resolves, provisions and dispatches a build for one pushed commit.
pub struct TriggerWorkflow {
    resolver: ConfigResolver,
    provisioner: ProjectProvisioner,
    dispatcher: BuildDispatcher,
    registry: ImageRegistry,
}

impl TriggerWorkflow {
    pub fn new(
        resolver: ConfigResolver,
        provisioner: ProjectProvisioner,
        dispatcher: BuildDispatcher,
        registry: ImageRegistry,
    ) -> Self {
        Self {
            resolver,
            provisioner,
            dispatcher,
            registry,
        }
    }

    pub async fn run(&self, push: &PushEvent) -> Result<TriggerOutcome> {
        let repo = &push.repository;
        let sha = push.after.as_str();

        if push.is_deletion() {
            info!(repo = %repo, git_ref = ?push.r#ref, "Push deleted its ref, skipping");
            return Ok(TriggerOutcome::Skipped {
                reason: "ref deleted".to_string(),
            });
        }

        let config = self.resolver.resolve(repo, sha).await?;

        // Reject an unbuildable image before anything is provisioned for it.
        BuildDispatcher::build_script_override(&config)?;

        let image_uri = self.registry.image_uri(&config.image);
        let name = ProjectName::derive(&repo.owner, &repo.name, &image_uri);

        let options = ProvisionOptions {
            name,
            repo: repo.clone(),
            image_uri,
            compute_size: config.compute_size,
        };
        self.provisioner.ensure(&options).await?;

        let build = self
            .dispatcher
            .dispatch(&options.name, repo, sha, &config)
            .await?;

        Ok(TriggerOutcome::Dispatched { build })
    }
}
