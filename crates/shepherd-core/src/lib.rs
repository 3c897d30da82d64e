//! Core domain types and service ports for bundle-shepherd.
//!
//! This crate contains:
//! - Build project naming and image references
//! - Per-commit settings and the resolved build configuration
//! - Build, project, log, event and source-control types
//! - The port traits implemented by the AWS and GitHub adapters
//! - Built-in default build scripts

pub mod build;
pub mod buildspec;
pub mod error;
pub mod events;
pub mod id;
pub mod logs;
pub mod naming;
pub mod project;
pub mod repository;
pub mod secret;
pub mod settings;
pub mod status;

pub use error::{Error, ProvisionStep, Result, Service};
pub use id::ActivationId;
pub use naming::{ImageRegistry, ProjectName};
