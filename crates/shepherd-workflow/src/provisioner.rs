//! Build project lookup and provisioning.
//!
//! Provisioning is a fixed sequence of five steps, each finished before the
//! next starts:
//!
//! 1. create the project's log group (an existing group counts as success)
//! 2. set the log retention policy
//! 3. create the build project
//! 4. create the rule routing the project's build-state changes
//! 5. attach the status relay as the rule's target
//!
//! Any failing step aborts the sequence with [`Error::Provisioning`]. Steps
//! that already completed are not rolled back.

use std::sync::Arc;

use shepherd_core::build::BuildService;
use shepherd_core::events::{EventService, NotificationRule, RuleTarget, STATUS_RELAY_TARGET_ID};
use shepherd_core::logs::{LOG_RETENTION_DAYS, LogGroupOutcome, LogService, log_group_name};
use shepherd_core::project::{
    ArtifactBinding, ArtifactLocation, BuildProject, ComputeBinding, ProjectSpec, SecretVariable,
    SourceBinding,
};
use shepherd_core::repository::RepoRef;
use shepherd_core::secret::Secrets;
use shepherd_core::settings::ComputeSize;
use shepherd_core::{Error, ProjectName, ProvisionStep, Result};
use tracing::{info, warn};

/// Environment variable carrying the encrypted npm token into builds.
pub const NPM_TOKEN_VARIABLE: &str = "NPM_ACCESS_TOKEN";

/// Deployment-wide settings applied to every provisioned project.
#[derive(Debug, Clone)]
pub struct ProvisioningSettings {
    pub artifacts: ArtifactLocation,
    pub service_role: String,
    pub status_relay_target: String,
    pub use_oauth: bool,
    pub encrypted_npm_token: String,
}

/// The project to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOptions {
    pub name: ProjectName,
    pub repo: RepoRef,
    pub image_uri: String,
    pub compute_size: ComputeSize,
}

/// Finds build projects and creates missing ones.
pub struct ProjectProvisioner {
    builds: Arc<dyn BuildService>,
    logs: Arc<dyn LogService>,
    events: Arc<dyn EventService>,
    settings: ProvisioningSettings,
    secrets: Secrets,
}

impl ProjectProvisioner {
    pub fn new(
        builds: Arc<dyn BuildService>,
        logs: Arc<dyn LogService>,
        events: Arc<dyn EventService>,
        settings: ProvisioningSettings,
        secrets: Secrets,
    ) -> Self {
        Self {
            builds,
            logs,
            events,
            settings,
            secrets,
        }
    }

    /// Look up a project. `None` when it does not exist yet.
    pub async fn locate(&self, name: &ProjectName) -> Result<Option<BuildProject>> {
        self.builds.find_project(name).await
    }

    /// Return the existing project, provisioning it first if it is missing.
    ///
    /// Callers must not run this concurrently for the same project: nothing
    /// guards against two activations both finding the project absent.
    pub async fn ensure(&self, options: &ProvisionOptions) -> Result<BuildProject> {
        if let Some(project) = self.locate(&options.name).await? {
            info!(project = %options.name, "Found existing build project");
            return Ok(project);
        }

        info!(project = %options.name, "Build project not found, provisioning");
        self.provision(options).await
    }

    /// Run the provisioning sequence for a project that does not exist yet.
    pub async fn provision(&self, options: &ProvisionOptions) -> Result<BuildProject> {
        let name = &options.name;
        let fail = |step: ProvisionStep| move |e: Error| Error::provisioning(name.as_str(), step, e);

        let log_group = log_group_name(name);
        match self
            .logs
            .create_log_group(&log_group)
            .await
            .map_err(fail(ProvisionStep::CreateLogGroup))?
        {
            LogGroupOutcome::Created => info!(log_group = %log_group, "Created log group"),
            LogGroupOutcome::AlreadyExists => {
                warn!(log_group = %log_group, "Log group already exists, reusing it")
            }
        }

        self.logs
            .put_retention_policy(&log_group, LOG_RETENTION_DAYS)
            .await
            .map_err(fail(ProvisionStep::PutRetentionPolicy))?;

        let spec = self.project_spec(options);
        let project = self
            .builds
            .create_project(&spec)
            .await
            .map_err(fail(ProvisionStep::CreateProject))?;
        info!(project = %name, arn = ?project.arn, "Created build project");

        let rule = NotificationRule::for_project(name);
        let rule_arn = self
            .events
            .put_rule(&rule)
            .await
            .map_err(fail(ProvisionStep::PutRule))?;

        let target = RuleTarget {
            id: STATUS_RELAY_TARGET_ID.to_string(),
            arn: self.settings.status_relay_target.clone(),
        };
        self.events
            .put_target(&rule.name, &target)
            .await
            .map_err(fail(ProvisionStep::PutTargets))?;
        info!(project = %name, rule = %rule_arn, "Routed build state changes to status relay");

        Ok(project)
    }

    fn project_spec(&self, options: &ProvisionOptions) -> ProjectSpec {
        let repo = &options.repo;

        ProjectSpec {
            name: options.name.clone(),
            description: format!("Bundles for {}", repo),
            source: SourceBinding::github(
                &repo.owner,
                &repo.name,
                self.settings.use_oauth,
                self.secrets.github_token(),
            ),
            artifacts: ArtifactBinding {
                bucket: self.settings.artifacts.bucket.clone(),
                path: self.settings.artifacts.path_for(&repo.name),
                name: repo.name.clone(),
            },
            environment: ComputeBinding {
                image: options.image_uri.clone(),
                size: options.compute_size,
                secret: SecretVariable {
                    name: NPM_TOKEN_VARIABLE.to_string(),
                    encrypted_value: self.settings.encrypted_npm_token.clone(),
                },
            },
            service_role: self.settings.service_role.clone(),
        }
    }
}
