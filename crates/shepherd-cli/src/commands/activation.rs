//! Single activations run from the command line against AWS.

use std::path::Path;

use anyhow::Result;
use shepherd_api::{Activation, Backends};
use shepherd_aws::AwsServices;
use shepherd_config::RuntimeConfig;
use shepherd_core::build::BuildPhase;
use shepherd_core::events::BuildStateChange;
use shepherd_core::repository::{PushEvent, RepoRef};
use tracing::info;

use super::load_config;

async fn start(config: &RuntimeConfig) -> Result<Activation> {
    let backends = Backends::from(AwsServices::load(config.region()).await);
    let activation = Activation::start(config, &backends).await?;
    info!(activation = %activation.id(), "Activation started");
    Ok(activation)
}

/// Trigger a build of `owner/repo` at `sha` and print the outcome.
pub async fn trigger(
    config_path: Option<&Path>,
    owner: &str,
    repo: &str,
    sha: &str,
) -> Result<()> {
    let config = load_config(config_path)?;
    let activation = start(&config).await?;

    let push = PushEvent {
        repository: RepoRef::new(owner, repo),
        after: sha.to_string(),
        r#ref: None,
        deleted: false,
    };
    let outcome = activation.trigger(&push).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Publish the commit status for `build_id` entering `phase`.
pub async fn relay(config_path: Option<&Path>, build_id: &str, phase: BuildPhase) -> Result<()> {
    let config = load_config(config_path)?;
    let activation = start(&config).await?;

    let outcome = activation
        .relay(&BuildStateChange::new(build_id, phase))
        .await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
