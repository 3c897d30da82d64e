//! GitHub REST client backing the source host port.

use async_trait::async_trait;
use reqwest::StatusCode;
use shepherd_core::repository::{FileLookup, RepoRef, SourceHost};
use shepherd_core::status::CommitStatus;
use shepherd_core::{Error, Result, Service};
use tracing::debug;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "bundle-shepherd";

/// GitHub API client.
pub struct GitHubClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GitHubClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Talk to a GitHub Enterprise or stand-in API instead of github.com.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn repo_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}",
            self.base_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.name)
        )
    }

    fn contents_url(&self, repo: &RepoRef, sha: &str, path: &str) -> String {
        let path = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/contents/{}?ref={}",
            self.repo_url(repo),
            path,
            urlencoding::encode(sha)
        )
    }

    fn statuses_url(&self, repo: &RepoRef, sha: &str) -> String {
        format!("{}/statuses/{}", self.repo_url(repo), urlencoding::encode(sha))
    }

    /// Raw file content at a commit, `None` when the file does not exist.
    pub async fn get_file(
        &self,
        repo: &RepoRef,
        sha: &str,
        path: &str,
    ) -> std::result::Result<Option<String>, GitHubError> {
        let response = self
            .client
            .get(self.contents_url(repo, sha, path))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github.raw+json")
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api(format!(
                "Failed to get {} ({}): {}",
                path, status, text
            )));
        }

        response
            .text()
            .await
            .map(Some)
            .map_err(|e| GitHubError::Parse(e.to_string()))
    }

    /// Create a commit status.
    pub async fn create_status(
        &self,
        repo: &RepoRef,
        sha: &str,
        status: &CommitStatus,
    ) -> std::result::Result<(), GitHubError> {
        let response = self
            .client
            .post(self.statuses_url(repo, sha))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .json(status)
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api(format!(
                "Failed to create status ({}): {}",
                status, text
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl SourceHost for GitHubClient {
    async fn fetch_file(&self, repo: &RepoRef, sha: &str, path: &str) -> Result<FileLookup> {
        let content = self
            .get_file(repo, sha, path)
            .await
            .map_err(|e| Error::upstream(Service::SourceHost, "GetContents", e))?;

        debug!(repo = %repo, sha = %sha, path = %path, found = content.is_some(), "Fetched file");

        Ok(match content {
            Some(content) => FileLookup::Found(content),
            None => FileLookup::NotFound,
        })
    }

    async fn create_commit_status(
        &self,
        repo: &RepoRef,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<()> {
        self.create_status(repo, sha, status)
            .await
            .map_err(|e| Error::upstream(Service::SourceHost, "CreateStatus", e))
    }
}

/// GitHub API errors.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
