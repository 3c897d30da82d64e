//! Build dispatch.

use std::sync::Arc;

use shepherd_core::build::{ArtifactOverride, Build, BuildRequest, BuildService};
use shepherd_core::buildspec::default_build_script;
use shepherd_core::project::ArtifactLocation;
use shepherd_core::repository::RepoRef;
use shepherd_core::settings::ResolvedConfig;
use shepherd_core::{Error, ProjectName, Result};
use tracing::info;

/// Starts builds for commits.
pub struct BuildDispatcher {
    builds: Arc<dyn BuildService>,
    artifacts: ArtifactLocation,
}

impl BuildDispatcher {
    pub fn new(builds: Arc<dyn BuildService>, artifacts: ArtifactLocation) -> Self {
        Self { builds, artifacts }
    }

    /// Build script override for `config`: the built-in script for its image,
    /// unless the commit brings its own.
    pub fn build_script_override(config: &ResolvedConfig) -> Result<Option<&'static str>> {
        if config.has_custom_build_script {
            Ok(None)
        } else {
            default_build_script(&config.image).map(Some)
        }
    }

    /// Start a build of commit `sha` in `project`.
    ///
    /// The artifact is written as `<sha>.zip` under the repository's artifact
    /// path. No retry is attempted.
    pub async fn dispatch(
        &self,
        project: &ProjectName,
        repo: &RepoRef,
        sha: &str,
        config: &ResolvedConfig,
    ) -> Result<Build> {
        let build_script_override = Self::build_script_override(config)?;

        let request = BuildRequest {
            project_name: project.clone(),
            source_version: sha.to_string(),
            artifacts: ArtifactOverride {
                bucket: self.artifacts.bucket.clone(),
                path: self.artifacts.path_for(&repo.name),
                name: format!("{}.zip", sha),
            },
            build_script_override: build_script_override.map(String::from),
        };

        let build = self
            .builds
            .start_build(&request)
            .await
            .map_err(|e| Error::dispatch(project.as_str(), e))?;

        info!(
            project = %project,
            sha = %sha,
            build_id = %build.id,
            default_build_script = request.build_script_override.is_some(),
            "Started build"
        );

        Ok(build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use shepherd_core::settings::ComputeSize;

    fn project() -> ProjectName {
        ProjectName::derive("org", "repo", "bundle-shepherd:nodejs6.x")
    }

    fn config(custom: bool, image: &str) -> ResolvedConfig {
        ResolvedConfig {
            has_custom_build_script: custom,
            image: image.to_string(),
            compute_size: ComputeSize::Small,
        }
    }

    #[tokio::test]
    async fn test_dispatch_with_default_script() {
        let harness = Harness::new();
        let repo = RepoRef::new("org", "repo");

        let build = harness
            .dispatcher()
            .dispatch(&project(), &repo, "abc123", &config(false, "nodejs6.x"))
            .await
            .unwrap();

        assert_eq!(build.source_version.as_deref(), Some("abc123"));
        let started = harness.builds.started.lock().unwrap();
        let request = &started[0];
        assert_eq!(request.project_name, project());
        assert_eq!(request.source_version, "abc123");
        assert_eq!(
            request.artifacts,
            ArtifactOverride {
                bucket: "bundles".to_string(),
                path: "shepherd/repo".to_string(),
                name: "abc123.zip".to_string(),
            }
        );
        assert_eq!(
            request.build_script_override.as_deref(),
            Some(default_build_script("nodejs6.x").unwrap())
        );
    }

    #[tokio::test]
    async fn test_custom_script_is_not_overridden() {
        let harness = Harness::new();
        let repo = RepoRef::new("org", "repo");

        harness
            .dispatcher()
            .dispatch(&project(), &repo, "abc123", &config(true, "ruby2.5"))
            .await
            .unwrap();

        let started = harness.builds.started.lock().unwrap();
        assert!(started[0].build_script_override.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_image_without_custom_script() {
        let harness = Harness::new();
        let repo = RepoRef::new("org", "repo");

        let err = harness
            .dispatcher()
            .dispatch(&project(), &repo, "abc123", &config(false, "ruby2.5"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedImage(_)));
        assert!(harness.calls().is_empty());
    }

    #[tokio::test]
    async fn test_start_failure_is_tagged() {
        let harness = Harness::with(|_, builds, _| builds.fail_start = true);
        let repo = RepoRef::new("org", "repo");

        let err = harness
            .dispatcher()
            .dispatch(&project(), &repo, "abc123", &config(false, "nodejs6.x"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Dispatch { ref project, .. } if project == "org_repo_nodejs6_x"));
    }
}
