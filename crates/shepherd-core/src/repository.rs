//! Source repository types and the source host port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Result;
use crate::status::CommitStatus;

const GITHUB_HOST: &str = "github.com";

/// A repository on the source host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Recover the repository from a build's source location.
    ///
    /// Accepts clone URLs with or without credentials and with or without a
    /// trailing `.git`, e.g. `https://token@github.com/org/repo.git`.
    /// Locations on any other host are not GitHub repositories.
    pub fn from_source_location(location: &str) -> Option<Self> {
        let url = Url::parse(location).ok()?;
        if !url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(GITHUB_HOST))
        {
            return None;
        }
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let repo = segments.next()?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);

        if repo.is_empty() {
            return None;
        }
        Some(Self::new(owner, repo))
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parsed push event data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    pub repository: RepoRef,
    pub after: String,
    pub r#ref: Option<String>,
    pub deleted: bool,
}

impl PushEvent {
    /// Parse a GitHub push webhook payload
    pub fn from_github_payload(payload: &serde_json::Value) -> Option<Self> {
        let repository = payload.get("repository")?;
        let name = repository.get("name")?.as_str()?;
        // Push payloads carry `owner.name`; other events only `owner.login`.
        let owner = repository.get("owner").and_then(|o| {
            o.get("name")
                .and_then(|n| n.as_str())
                .or_else(|| o.get("login").and_then(|l| l.as_str()))
        })?;
        let after = payload.get("after")?.as_str()?.to_string();

        let r#ref = payload
            .get("ref")
            .and_then(|r| r.as_str())
            .map(String::from);

        let deleted = payload
            .get("deleted")
            .and_then(|d| d.as_bool())
            .unwrap_or(false);

        Some(PushEvent {
            repository: RepoRef::new(owner, name),
            after,
            r#ref,
            deleted,
        })
    }

    /// Whether the push removed its ref rather than adding commits.
    pub fn is_deletion(&self) -> bool {
        self.deleted || (!self.after.is_empty() && self.after.chars().all(|c| c == '0'))
    }
}

/// Result of looking up a file in a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLookup {
    Found(String),
    NotFound,
}

impl FileLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, FileLookup::Found(_))
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            FileLookup::Found(content) => Some(content),
            FileLookup::NotFound => None,
        }
    }
}

/// Trait for source host backends.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Fetch a file from the tree of commit `sha`.
    ///
    /// A missing file is [`FileLookup::NotFound`]; only failed requests are errors.
    async fn fetch_file(&self, repo: &RepoRef, sha: &str, path: &str) -> Result<FileLookup>;

    /// Publish a status on commit `sha`.
    async fn create_commit_status(
        &self,
        repo: &RepoRef,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_location_with_token() {
        let repo = RepoRef::from_source_location("https://token@github.com/org/repo.git").unwrap();
        assert_eq!(repo, RepoRef::new("org", "repo"));
    }

    #[test]
    fn test_source_location_without_suffix() {
        let repo = RepoRef::from_source_location("https://github.com/mapbox/widgets").unwrap();
        assert_eq!(repo.full_name(), "mapbox/widgets");
    }

    #[test]
    fn test_source_location_too_short() {
        assert!(RepoRef::from_source_location("https://github.com/org").is_none());
        assert!(RepoRef::from_source_location("not a url").is_none());
    }

    #[test]
    fn test_source_location_off_github() {
        assert!(RepoRef::from_source_location("https://bitbucket.org/org/repo.git").is_none());
        assert!(RepoRef::from_source_location("https://github.com.evil.io/org/repo").is_none());
        assert!(RepoRef::from_source_location("s3://bundles/org/repo.zip").is_none());
    }

    #[test]
    fn test_parse_push_payload() {
        let payload = json!({
            "ref": "refs/heads/main",
            "after": "abc123",
            "deleted": false,
            "repository": {
                "name": "repo",
                "full_name": "org/repo",
                "owner": {"name": "org", "login": "org"}
            }
        });

        let push = PushEvent::from_github_payload(&payload).unwrap();
        assert_eq!(push.repository, RepoRef::new("org", "repo"));
        assert_eq!(push.after, "abc123");
        assert!(!push.is_deletion());
    }

    #[test]
    fn test_owner_login_fallback() {
        let payload = json!({
            "after": "abc123",
            "repository": {"name": "repo", "owner": {"login": "org"}}
        });
        let push = PushEvent::from_github_payload(&payload).unwrap();
        assert_eq!(push.repository.owner, "org");
    }

    #[test]
    fn test_branch_deletion() {
        let payload = json!({
            "after": "0000000000000000000000000000000000000000",
            "repository": {"name": "repo", "owner": {"name": "org"}}
        });
        let push = PushEvent::from_github_payload(&payload).unwrap();
        assert!(push.is_deletion());
    }

    #[test]
    fn test_payload_without_commit() {
        let payload = json!({"repository": {"name": "repo", "owner": {"name": "org"}}});
        assert!(PushEvent::from_github_payload(&payload).is_none());
    }

    #[test]
    fn test_file_lookup() {
        assert_eq!(FileLookup::Found("x".into()).content(), Some("x"));
        assert!(!FileLookup::NotFound.is_found());
    }
}
