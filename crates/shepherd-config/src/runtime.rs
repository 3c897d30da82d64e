//! Runtime configuration.
//!
//! Settings are first collected into a [`PartialConfig`] from any number of
//! sources, layered with [`PartialConfig::merge`], and then validated into a
//! [`RuntimeConfig`] with [`PartialConfig::build`].

use std::path::Path;
use std::sync::LazyLock;

use kdl::{KdlDocument, KdlNode};
use regex::Regex;
use serde::Serialize;
use shepherd_core::ImageRegistry;
use shepherd_core::project::ArtifactLocation;

use crate::{ConfigError, ConfigResult};

static ACCOUNT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{12}$").expect("valid account id pattern"));

static REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("valid region pattern"));

/// Validated runtime configuration.
#[derive(Clone, Serialize)]
pub struct RuntimeConfig {
    /// KMS ciphertext of the GitHub access token.
    #[serde(skip)]
    pub encrypted_github_token: String,
    /// KMS ciphertext of the npm token, handed to builds as-is.
    #[serde(skip)]
    pub encrypted_npm_token: String,
    pub registry: ImageRegistry,
    pub artifacts: ArtifactLocation,
    pub project_role_arn: String,
    /// ARN of the endpoint that receives build-state-change events.
    pub status_relay_target: String,
    pub use_oauth: bool,
    #[serde(skip)]
    pub webhook_secret: Option<String>,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("registry", &self.registry)
            .field("artifacts", &self.artifacts)
            .field("project_role_arn", &self.project_role_arn)
            .field("status_relay_target", &self.status_relay_target)
            .field("use_oauth", &self.use_oauth)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl RuntimeConfig {
    /// Load configuration from the environment only.
    pub fn from_env() -> ConfigResult<Self> {
        PartialConfig::from_env()?.build()
    }

    /// Load configuration from an optional KDL file, overridden by the environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let base = match path {
            Some(path) => parse_runtime_config(&std::fs::read_to_string(path)?)?,
            None => PartialConfig::default(),
        };
        base.merge(PartialConfig::from_env()?).build()
    }

    pub fn region(&self) -> &str {
        &self.registry.region
    }

    /// Console page showing a build and its logs.
    pub fn console_url(&self, build_id: &str) -> String {
        shepherd_core::build::console_url(&self.registry.region, build_id)
    }
}

/// Configuration values collected from one source, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    pub github_token: Option<String>,
    pub npm_token: Option<String>,
    pub account_id: Option<String>,
    pub region: Option<String>,
    pub artifact_bucket: Option<String>,
    pub artifact_prefix: Option<String>,
    pub project_role: Option<String>,
    pub status_relay_target: Option<String>,
    pub use_oauth: Option<bool>,
    pub webhook_secret: Option<String>,
}

impl PartialConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Collect settings from `(name, value)` pairs named like environment variables.
    pub fn from_vars<I, K, V>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "GITHUB_ACCESS_TOKEN" => config.github_token = Some(value),
                "NPM_ACCESS_TOKEN" => config.npm_token = Some(value),
                "AWS_ACCOUNT_ID" => config.account_id = Some(value),
                "AWS_REGION" => config.region = Some(value),
                "ARTIFACT_BUCKET" => config.artifact_bucket = Some(value),
                "ARTIFACT_PREFIX" => config.artifact_prefix = Some(value),
                "PROJECT_ROLE" => config.project_role = Some(value),
                "STATUS_RELAY_TARGET" => config.status_relay_target = Some(value),
                "USE_OAUTH" => config.use_oauth = Some(parse_bool("USE_OAUTH", &value)?),
                "GITHUB_WEBHOOK_SECRET" => config.webhook_secret = Some(value),
                _ => {}
            }
        }

        Ok(config)
    }

    /// Layer `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: PartialConfig) -> PartialConfig {
        PartialConfig {
            github_token: other.github_token.or(self.github_token),
            npm_token: other.npm_token.or(self.npm_token),
            account_id: other.account_id.or(self.account_id),
            region: other.region.or(self.region),
            artifact_bucket: other.artifact_bucket.or(self.artifact_bucket),
            artifact_prefix: other.artifact_prefix.or(self.artifact_prefix),
            project_role: other.project_role.or(self.project_role),
            status_relay_target: other.status_relay_target.or(self.status_relay_target),
            use_oauth: other.use_oauth.or(self.use_oauth),
            webhook_secret: other.webhook_secret.or(self.webhook_secret),
        }
    }

    /// Validate into a [`RuntimeConfig`].
    pub fn build(self) -> ConfigResult<RuntimeConfig> {
        let account_id = required(self.account_id, "AWS_ACCOUNT_ID")?;
        if !ACCOUNT_ID.is_match(&account_id) {
            return Err(ConfigError::invalid("AWS_ACCOUNT_ID", "expected 12 digits"));
        }

        let region = required(self.region, "AWS_REGION")?;
        if !REGION.is_match(&region) {
            return Err(ConfigError::invalid(
                "AWS_REGION",
                format!("'{}' is not a region name", region),
            ));
        }

        let bucket = required(self.artifact_bucket, "ARTIFACT_BUCKET")?;
        let prefix = self.artifact_prefix.unwrap_or_default();

        let role = required(self.project_role, "PROJECT_ROLE")?;
        let project_role_arn = if role.starts_with("arn:") {
            role
        } else {
            format!("arn:aws:iam::{}:role/{}", account_id, role)
        };

        let status_relay_target = required(self.status_relay_target, "STATUS_RELAY_TARGET")?;
        if !status_relay_target.starts_with("arn:") {
            return Err(ConfigError::invalid(
                "STATUS_RELAY_TARGET",
                "expected an ARN",
            ));
        }

        Ok(RuntimeConfig {
            encrypted_github_token: required(self.github_token, "GITHUB_ACCESS_TOKEN")?,
            encrypted_npm_token: required(self.npm_token, "NPM_ACCESS_TOKEN")?,
            registry: ImageRegistry::new(account_id, region),
            artifacts: ArtifactLocation::new(bucket, prefix),
            project_role_arn,
            status_relay_target,
            use_oauth: self.use_oauth.unwrap_or(false),
            webhook_secret: self.webhook_secret,
        })
    }
}

/// Parse runtime configuration from KDL text.
pub fn parse_runtime_config(kdl: &str) -> ConfigResult<PartialConfig> {
    let doc: KdlDocument = kdl.parse()?;
    let mut config = PartialConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "github-token" => config.github_token = get_first_string_arg(node),
            "npm-token" => config.npm_token = get_first_string_arg(node),
            "account-id" => config.account_id = get_first_string_arg(node),
            "region" => config.region = get_first_string_arg(node),
            "artifacts" => {
                config.artifact_bucket = get_string_prop(node, "bucket");
                config.artifact_prefix = get_string_prop(node, "prefix");
            }
            "project-role" => config.project_role = get_first_string_arg(node),
            "status-relay-target" => config.status_relay_target = get_first_string_arg(node),
            "use-oauth" => {
                let value = get_first_bool_arg(node)
                    .ok_or_else(|| ConfigError::invalid("use-oauth", "expected #true or #false"))?;
                config.use_oauth = Some(value);
            }
            "webhook-secret" => config.webhook_secret = get_first_string_arg(node),
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(config)
}

fn required(value: Option<String>, name: &str) -> ConfigResult<String> {
    value.ok_or_else(|| ConfigError::MissingField(name.to_string()))
}

fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(field, format!("'{}' is not a boolean", value))),
    }
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    let value = node.entries().iter().find(|e| e.name().is_none())?.value();
    value
        .as_string()
        .map(|s| s.to_string())
        .or_else(|| value.as_integer().map(|i| i.to_string()))
}

fn get_first_bool_arg(node: &KdlNode) -> Option<bool> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_bool())
}

fn get_string_prop(node: &KdlNode, name: &str) -> Option<String> {
    node.get(name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}
