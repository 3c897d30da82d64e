//! Build project types.

use serde::{Deserialize, Serialize};

use crate::ProjectName;
use crate::settings::ComputeSize;

/// A build project as reported by the build service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildProject {
    pub name: String,
    pub arn: Option<String>,
}

/// Everything needed to create a build project.
#[derive(Debug, Clone)]
pub struct ProjectSpec {
    pub name: ProjectName,
    pub description: String,
    pub source: SourceBinding,
    pub artifacts: ArtifactBinding,
    pub environment: ComputeBinding,
    /// IAM role the build service assumes for this project.
    pub service_role: String,
}

/// How the project reads the repository.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceBinding {
    pub location: String,
    pub auth: SourceAuth,
}

impl std::fmt::Debug for SourceBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Token-bearing locations must not reach the logs.
        let location = match self.auth {
            SourceAuth::OAuth => self.location.as_str(),
            SourceAuth::EmbeddedToken => "[redacted]",
        };
        f.debug_struct("SourceBinding")
            .field("location", &location)
            .field("auth", &self.auth)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAuth {
    /// The build service uses its stored OAuth connection to GitHub.
    OAuth,
    /// The access token is embedded in the source location.
    EmbeddedToken,
}

impl SourceBinding {
    /// GitHub source binding for `owner/repo`.
    ///
    /// Without OAuth the access token is embedded in the clone URL.
    pub fn github(owner: &str, repo: &str, oauth: bool, access_token: &str) -> Self {
        if oauth {
            Self {
                location: format!("https://github.com/{}/{}.git", owner, repo),
                auth: SourceAuth::OAuth,
            }
        } else {
            Self {
                location: format!("https://{}@github.com/{}/{}.git", access_token, owner, repo),
                auth: SourceAuth::EmbeddedToken,
            }
        }
    }
}

/// Bucket and key prefix under which build artifacts are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocation {
    pub bucket: String,
    pub prefix: String,
}

impl ArtifactLocation {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Key prefix for one repository's artifacts.
    pub fn path_for(&self, repo: &str) -> String {
        if self.prefix.is_empty() {
            repo.to_string()
        } else {
            format!("{}/{}", self.prefix, repo)
        }
    }
}

/// Where the project writes its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBinding {
    pub bucket: String,
    pub path: String,
    pub name: String,
}

/// Container the project builds in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeBinding {
    pub image: String,
    pub size: ComputeSize,
    pub secret: SecretVariable,
}

/// Environment variable whose value is still encrypted; the build decrypts it.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretVariable {
    pub name: String,
    pub encrypted_value: String,
}

impl std::fmt::Debug for SecretVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretVariable")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
