//! Per-commit build settings.
//!
//! A repository may carry two override files at the root of a commit: a build
//! script ([`BUILD_SCRIPT_FILE`]) and a settings document ([`SETTINGS_FILE`]).
//! Both are optional; [`ResolvedConfig::resolve`] folds whatever was found
//! into the configuration a build runs with.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Repository-provided build script.
pub const BUILD_SCRIPT_FILE: &str = "buildspec.yml";

/// Repository-provided settings document.
pub const SETTINGS_FILE: &str = ".bundle-shepherd.json";

/// Image used when the settings document does not name one.
pub const DEFAULT_IMAGE: &str = "nodejs6.x";

/// Compute capacity of the build container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl std::fmt::Display for ComputeSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputeSize::Small => write!(f, "small"),
            ComputeSize::Medium => write!(f, "medium"),
            ComputeSize::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for ComputeSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "small" => Ok(ComputeSize::Small),
            "medium" => Ok(ComputeSize::Medium),
            "large" => Ok(ComputeSize::Large),
            _ => Err(format!("unknown compute size: {}", s)),
        }
    }
}

/// Contents of `.bundle-shepherd.json`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsDocument {
    pub image: Option<String>,
    pub size: Option<ComputeSize>,
}

impl SettingsDocument {
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Error::Settings)
    }
}

/// Build configuration for one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub has_custom_build_script: bool,
    pub image: String,
    pub compute_size: ComputeSize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            has_custom_build_script: false,
            image: DEFAULT_IMAGE.to_string(),
            compute_size: ComputeSize::Small,
        }
    }
}

impl ResolvedConfig {
    /// Combine the two lookups into a configuration.
    ///
    /// `settings` is the raw settings document, if the commit has one. Fields
    /// missing from the document keep their defaults.
    pub fn resolve(has_custom_build_script: bool, settings: Option<&str>) -> Result<Self> {
        let mut config = Self {
            has_custom_build_script,
            ..Self::default()
        };

        if let Some(content) = settings {
            let document = SettingsDocument::parse(content)?;
            if let Some(image) = document.image {
                config.image = image;
            }
            if let Some(size) = document.size {
                config.compute_size = size;
            }
        }

        Ok(config)
    }
}
