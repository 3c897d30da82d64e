//! bundle-shepherd CLI tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shepherd_core::build::BuildPhase;
use shepherd_core::settings::DEFAULT_IMAGE;

mod commands;

#[derive(Parser)]
#[command(name = "shepherd")]
#[command(about = "Build JavaScript and Python bundles for every pushed commit", long_about = None)]
struct Cli {
    /// KDL configuration file; environment variables override its values
    #[arg(long, env = "SHEPHERD_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve, provision and start a build for one commit
    Trigger {
        /// Repository owner
        #[arg(long)]
        owner: String,
        /// Repository name
        #[arg(long)]
        repo: String,
        /// Commit SHA
        #[arg(long)]
        sha: String,
    },
    /// Publish the commit status for a build's state change
    Relay {
        /// Build id
        #[arg(long)]
        build_id: String,
        /// Build phase (IN_PROGRESS, SUCCEEDED, FAILED or STOPPED)
        #[arg(long)]
        status: BuildPhase,
    },
    /// Print the build project name for a repository and image
    ProjectName {
        /// Repository owner
        #[arg(long)]
        owner: String,
        /// Repository name
        #[arg(long)]
        repo: String,
        /// Image name from the settings document
        #[arg(long, default_value = DEFAULT_IMAGE)]
        image: String,
        /// AWS account hosting the image registry
        #[arg(long, env = "AWS_ACCOUNT_ID")]
        account_id: String,
        /// AWS region of the image registry
        #[arg(long, env = "AWS_REGION")]
        region: String,
    },
    /// Check a settings document and print the resolved configuration
    ValidateSettings {
        /// Path to the settings document
        #[arg(default_value = ".bundle-shepherd.json")]
        path: PathBuf,
    },
    /// Load and validate the runtime configuration without contacting AWS
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shepherd_api::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Trigger { owner, repo, sha } => {
            commands::activation::trigger(cli.config.as_deref(), &owner, &repo, &sha).await?;
        }
        Commands::Relay { build_id, status } => {
            commands::activation::relay(cli.config.as_deref(), &build_id, status).await?;
        }
        Commands::ProjectName {
            owner,
            repo,
            image,
            account_id,
            region,
        } => {
            commands::project_name(&owner, &repo, &image, &account_id, &region);
        }
        Commands::ValidateSettings { path } => {
            commands::validate_settings(&path)?;
        }
        Commands::CheckConfig => {
            commands::check_config(cli.config.as_deref())?;
        }
    }

    Ok(())
}
