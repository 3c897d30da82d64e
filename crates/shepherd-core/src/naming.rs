//! Build project naming.
//!
//! A project name is derived from the organization, the repository and the
//! container image the project builds with. The derivation is pure: the same
//! inputs always yield the same name, and that name is the only key used to
//! decide whether a project already exists.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Repository in the image registry that holds the build images.
pub const IMAGE_REPOSITORY: &str = "bundle-shepherd";

/// Prefix left on the last image path segment after separator replacement.
const IMAGE_FAMILY_PREFIX: &str = "bundle-shepherd_";

/// Name of a build project in the build service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Derive the project name for `organization/repository` built with `image_uri`.
    ///
    /// Takes the last path segment of the image reference, replaces `:` and `.`
    /// with `_`, strips the image family prefix and joins the parts with `_`.
    pub fn derive(organization: &str, repository: &str, image_uri: &str) -> Self {
        let segment = image_uri.rsplit('/').next().unwrap_or(image_uri);
        let segment = segment.replace([':', '.'], "_");
        let segment = segment
            .strip_prefix(IMAGE_FAMILY_PREFIX)
            .unwrap_or(&segment);

        Self(format!("{}_{}_{}", organization, repository, segment))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Container registry holding the build images, one tag per image name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRegistry {
    pub account_id: String,
    pub region: String,
}

impl ImageRegistry {
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }

    /// Full image reference for a resolved image name such as `nodejs6.x`.
    pub fn image_uri(&self, image: &str) -> String {
        format!(
            "{}.dkr.ecr.{}.amazonaws.com/{}:{}",
            self.account_id, self.region, IMAGE_REPOSITORY, image
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_from_registry_image() {
        let registry = ImageRegistry::new("123456789012", "us-east-1");
        let name = ProjectName::derive("mapbox", "widgets", &registry.image_uri("nodejs6.x"));
        assert_eq!(name.as_str(), "mapbox_widgets_nodejs6_x");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let uri = "123456789012.dkr.ecr.us-east-1.amazonaws.com/bundle-shepherd:python3.6";
        assert_eq!(
            ProjectName::derive("org", "repo", uri),
            ProjectName::derive("org", "repo", uri)
        );
    }

    #[test]
    fn test_images_differing_in_last_segment_get_distinct_names() {
        let registry = ImageRegistry::new("123456789012", "us-east-1");
        let node6 = ProjectName::derive("org", "repo", &registry.image_uri("nodejs6.x"));
        let node8 = ProjectName::derive("org", "repo", &registry.image_uri("nodejs8.10"));
        assert_ne!(node6, node8);
        assert_eq!(node8.as_str(), "org_repo_nodejs8_10");
    }

    #[test]
    fn test_foreign_image_keeps_its_segment() {
        let name = ProjectName::derive("org", "repo", "aws/codebuild/nodejs:6.3.1");
        assert_eq!(name.as_str(), "org_repo_nodejs_6_3_1");
    }

    #[test]
    fn test_image_without_path() {
        let name = ProjectName::derive("org", "repo", "node:8");
        assert_eq!(name.as_str(), "org_repo_node_8");
    }
}
