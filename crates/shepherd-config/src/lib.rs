//! Runtime configuration for bundle-shepherd.
//!
//! Configuration comes from environment variables, a KDL file, or both with
//! the environment taking precedence. Every value is validated before an
//! activation touches any external service.

pub mod error;
pub mod runtime;

pub use error::{ConfigError, ConfigResult};
pub use runtime::{PartialConfig, RuntimeConfig, parse_runtime_config};
