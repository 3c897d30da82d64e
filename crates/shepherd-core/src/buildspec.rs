//! Built-in build scripts, one per supported default image.

use crate::{Error, Result};

const DEFAULT_BUILD_SCRIPTS: &[(&str, &str)] = &[
    ("nodejs6.x", include_str!("../buildspecs/nodejs6.x.yml")),
    ("nodejs8.10", include_str!("../buildspecs/nodejs8.10.yml")),
    ("python3.6", include_str!("../buildspecs/python3.6.yml")),
];

/// Images that have a built-in build script.
pub fn supported_images() -> impl Iterator<Item = &'static str> {
    DEFAULT_BUILD_SCRIPTS.iter().map(|(image, _)| *image)
}

/// Built-in build script for `image`.
///
/// Only consulted when the commit has no build script of its own; asking for
/// an image without a built-in script is a configuration error.
pub fn default_build_script(image: &str) -> Result<&'static str> {
    DEFAULT_BUILD_SCRIPTS
        .iter()
        .find(|(name, _)| *name == image)
        .map(|(_, script)| *script)
        .ok_or_else(|| Error::UnsupportedImage(image.to_string()))
}
