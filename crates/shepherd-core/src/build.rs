//! Build service port and build types.
//!
//! The build service owns projects and build executions; this system only
//! looks them up, creates projects and starts builds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::project::{BuildProject, ProjectSpec};
use crate::{Error, ProjectName, Result};

/// Lifecycle phase of a build, as reported in build-state-change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildPhase {
    InProgress,
    Succeeded,
    Failed,
    Stopped,
}

impl BuildPhase {
    /// All phases the notification rule subscribes to.
    pub const ALL: [BuildPhase; 4] = [
        BuildPhase::InProgress,
        BuildPhase::Succeeded,
        BuildPhase::Failed,
        BuildPhase::Stopped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuildPhase::InProgress => "IN_PROGRESS",
            BuildPhase::Succeeded => "SUCCEEDED",
            BuildPhase::Failed => "FAILED",
            BuildPhase::Stopped => "STOPPED",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, BuildPhase::InProgress)
    }
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BuildPhase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BuildPhase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| Error::InvalidEvent(format!("unknown build phase: {}", s)))
    }
}

/// Build descriptor returned by the build service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: String,
    pub arn: Option<String>,
    pub project_name: Option<String>,
    /// Source location of the project, possibly with an embedded token.
    #[serde(skip_serializing)]
    pub source_location: Option<String>,
    /// Version requested when the build was started.
    pub source_version: Option<String>,
    /// Commit the build service actually checked out.
    pub resolved_source_version: Option<String>,
    pub build_status: Option<String>,
}

impl Build {
    /// Commit the build ran against. The resolved commit wins over the
    /// requested version, which may be a branch name.
    pub fn commit_sha(&self) -> Option<&str> {
        [
            self.resolved_source_version.as_deref(),
            self.source_version.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|sha| !sha.is_empty())
    }
}

/// Console page showing a build and its logs.
pub fn console_url(region: &str, build_id: &str) -> String {
    format!(
        "https://console.aws.amazon.com/codebuild/home?region={}#/builds/{}/view/new",
        region, build_id
    )
}

/// Artifact settings that replace the project's defaults for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOverride {
    pub bucket: String,
    pub path: String,
    pub name: String,
}

/// Request to start one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub project_name: ProjectName,
    pub source_version: String,
    pub artifacts: ArtifactOverride,
    /// Build script to use instead of the repository's own.
    pub build_script_override: Option<String>,
}

/// Trait for build service backends.
#[async_trait]
pub trait BuildService: Send + Sync {
    /// Look up a project by name. `None` when the project does not exist.
    async fn find_project(&self, name: &ProjectName) -> Result<Option<BuildProject>>;

    /// Create a project.
    async fn create_project(&self, spec: &ProjectSpec) -> Result<BuildProject>;

    /// Start a build.
    async fn start_build(&self, request: &BuildRequest) -> Result<Build>;

    /// Look up a build by id. `None` when the id is unknown or expired.
    async fn find_build(&self, id: &str) -> Result<Option<Build>>;
}
