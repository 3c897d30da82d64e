//! CLI command implementations.

pub mod activation;

use std::path::Path;

use anyhow::{Context, Result};
use shepherd_config::RuntimeConfig;
use shepherd_core::settings::{BUILD_SCRIPT_FILE, ResolvedConfig};
use shepherd_core::{ImageRegistry, ProjectName};
use shepherd_workflow::BuildDispatcher;

pub fn project_name(owner: &str, repo: &str, image: &str, account_id: &str, region: &str) {
    let image_uri = ImageRegistry::new(account_id, region).image_uri(image);
    println!("{}", ProjectName::derive(owner, repo, &image_uri));
}

/// Resolve a settings document the way a commit containing it would be.
///
/// A `buildspec.yml` next to the document counts as the repository's own
/// build script.
pub fn validate_settings(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

    let has_custom_build_script = path
        .parent()
        .map(|dir| dir.join(BUILD_SCRIPT_FILE).is_file())
        .unwrap_or(false);

    let config = ResolvedConfig::resolve(has_custom_build_script, Some(&content))
        .with_context(|| format!("Invalid settings file: {}", path.display()))?;
    BuildDispatcher::build_script_override(&config)
        .with_context(|| format!("Settings file cannot be built: {}", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub fn check_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!("Configuration is valid");
    Ok(())
}

pub(crate) fn load_config(config_path: Option<&Path>) -> Result<RuntimeConfig> {
    RuntimeConfig::load(config_path).context("Failed to load runtime configuration")
}
