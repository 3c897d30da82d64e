//! Build status relay.
//!
//! Turns a build-state-change event into a commit status on the source host.

use std::sync::Arc;

use serde::Serialize;
use shepherd_core::build::{BuildService, console_url};
use shepherd_core::events::BuildStateChange;
use shepherd_core::repository::{RepoRef, SourceHost};
use shepherd_core::status::{CommitState, CommitStatus};
use shepherd_core::{Error, Result};
use tracing::{debug, info};

/// What the relay did with an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RelayOutcome {
    Published {
        repo: RepoRef,
        sha: String,
        state: CommitState,
    },
    /// The build is unknown or expired; nothing was published.
    BuildNotFound,
}

/// Publishes commit statuses for build-state changes.
pub struct StatusRelay {
    builds: Arc<dyn BuildService>,
    host: Arc<dyn SourceHost>,
    console_region: Option<String>,
}

impl StatusRelay {
    pub fn new(builds: Arc<dyn BuildService>, host: Arc<dyn SourceHost>) -> Self {
        Self {
            builds,
            host,
            console_region: None,
        }
    }

    /// Link published statuses to the build console of `region`.
    pub fn with_console_region(mut self, region: impl Into<String>) -> Self {
        self.console_region = Some(region.into());
        self
    }

    pub async fn relay(&self, event: &BuildStateChange) -> Result<RelayOutcome> {
        let phase = event.phase();

        let Some(build) = self.builds.find_build(event.build_id()).await? else {
            info!(build_id = %event.build_id(), phase = %phase, "Build not found, nothing to relay");
            return Ok(RelayOutcome::BuildNotFound);
        };

        let repo = build
            .source_location
            .as_deref()
            .and_then(RepoRef::from_source_location)
            .ok_or_else(|| {
                Error::InvalidEvent(format!(
                    "build {} has no GitHub source location",
                    build.id
                ))
            })?;

        let sha = build.commit_sha().ok_or_else(|| {
            Error::InvalidEvent(format!("build {} has no source version", build.id))
        })?;

        let target_url = self
            .console_region
            .as_deref()
            .map(|region| console_url(region, &build.id));
        let status = CommitStatus::for_phase(phase, target_url);

        debug!(build_id = %build.id, terminal = phase.is_terminal(), "Publishing commit status");
        self.host.create_commit_status(&repo, sha, &status).await?;

        info!(
            repo = %repo,
            sha = %sha,
            phase = %phase,
            state = %status.state,
            "Published commit status"
        );

        Ok(RelayOutcome::Published {
            repo,
            sha: sha.to_string(),
            state: status.state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use shepherd_core::build::{Build, BuildPhase};

    fn register_build(harness: &Harness, id: &str, location: Option<&str>, sha: Option<&str>) {
        harness.builds.builds.lock().unwrap().insert(
            id.to_string(),
            Build {
                id: id.to_string(),
                source_location: location.map(String::from),
                source_version: sha.map(String::from),
                ..Default::default()
            },
        );
    }

    #[tokio::test]
    async fn test_succeeded_build_publishes_success() {
        let harness = Harness::new();
        register_build(
            &harness,
            "b1",
            Some("https://token@github.com/org/repo.git"),
            Some("abc123"),
        );

        let outcome = harness
            .relay()
            .relay(&BuildStateChange::new("b1", BuildPhase::Succeeded))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RelayOutcome::Published {
                repo: RepoRef::new("org", "repo"),
                sha: "abc123".to_string(),
                state: CommitState::Success,
            }
        );
        let statuses = harness.host.statuses.lock().unwrap();
        let (repo, sha, status) = &statuses[0];
        assert_eq!(repo.full_name(), "org/repo");
        assert_eq!(sha, "abc123");
        assert_eq!(status.state, CommitState::Success);
        assert_eq!(status.description, "Your build succeeded");
        assert!(status.target_url.is_none());
    }

    #[tokio::test]
    async fn test_unknown_build_is_a_no_op() {
        let harness = Harness::new();

        let outcome = harness
            .relay()
            .relay(&BuildStateChange::new("missing", BuildPhase::Failed))
            .await
            .unwrap();

        assert_eq!(outcome, RelayOutcome::BuildNotFound);
        assert!(harness.host.statuses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stopped_build_links_console() {
        let harness = Harness::new();
        register_build(
            &harness,
            "p:b2",
            Some("https://github.com/org/repo.git"),
            Some("def456"),
        );

        harness
            .relay()
            .with_console_region("us-east-1")
            .relay(&BuildStateChange::new("p:b2", BuildPhase::Stopped))
            .await
            .unwrap();

        let statuses = harness.host.statuses.lock().unwrap();
        let status = &statuses[0].2;
        assert_eq!(status.state, CommitState::Error);
        assert_eq!(status.description, "Your build encountered an error");
        assert_eq!(
            status.target_url.as_deref(),
            Some("https://console.aws.amazon.com/codebuild/home?region=us-east-1#/builds/p:b2/view/new")
        );
    }

    #[tokio::test]
    async fn test_publish_failure_surfaces() {
        let harness = Harness::with(|host, _, _| host.fail_statuses = true);
        register_build(
            &harness,
            "b1",
            Some("https://github.com/org/repo.git"),
            Some("abc123"),
        );

        let err = harness
            .relay()
            .relay(&BuildStateChange::new("b1", BuildPhase::InProgress))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_build_without_source_version() {
        let harness = Harness::new();
        register_build(&harness, "b1", Some("https://github.com/org/repo.git"), None);

        let err = harness
            .relay()
            .relay(&BuildStateChange::new("b1", BuildPhase::Failed))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
    }

    #[tokio::test]
    async fn test_build_from_other_host_is_rejected() {
        let harness = Harness::new();
        register_build(
            &harness,
            "b1",
            Some("https://bitbucket.org/org/repo.git"),
            Some("abc123"),
        );

        let err = harness
            .relay()
            .relay(&BuildStateChange::new("b1", BuildPhase::Succeeded))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEvent(ref message) if message == "build b1 has no GitHub source location"
        ));
        assert!(harness.host.statuses.lock().unwrap().is_empty());
    }
}
