//! Per-commit configuration resolution.

use std::sync::Arc;

use futures::future::try_join;
use shepherd_core::Result;
use shepherd_core::repository::{RepoRef, SourceHost};
use shepherd_core::settings::{BUILD_SCRIPT_FILE, ResolvedConfig, SETTINGS_FILE};
use tracing::{debug, info};

/// Reads a commit's override files and resolves the build configuration.
pub struct ConfigResolver {
    host: Arc<dyn SourceHost>,
}

impl ConfigResolver {
    pub fn new(host: Arc<dyn SourceHost>) -> Self {
        Self { host }
    }

    /// Resolve the configuration for commit `sha` of `repo`.
    ///
    /// The build script and settings document are fetched concurrently. A
    /// missing file falls back to the defaults; a failed fetch or a malformed
    /// settings document fails the resolution.
    pub async fn resolve(&self, repo: &RepoRef, sha: &str) -> Result<ResolvedConfig> {
        let (build_script, settings) = try_join(
            self.host.fetch_file(repo, sha, BUILD_SCRIPT_FILE),
            self.host.fetch_file(repo, sha, SETTINGS_FILE),
        )
        .await?;

        debug!(
            repo = %repo,
            sha = %sha,
            build_script = build_script.is_found(),
            settings = settings.is_found(),
            "Fetched override files"
        );

        let config = ResolvedConfig::resolve(build_script.is_found(), settings.content())?;

        info!(
            repo = %repo,
            sha = %sha,
            image = %config.image,
            size = %config.compute_size,
            custom_build_script = config.has_custom_build_script,
            "Resolved build configuration"
        );

        Ok(config)
    }
}
