//! Error types for bundle-shepherd.
//!
//! "Not found" is never an error here: absent projects, builds and override
//! files are modelled as `Option` or [`crate::repository::FileLookup`].

use derive_more::Display;
use thiserror::Error;

/// External service a failed call was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Service {
    #[display("build service")]
    Build,
    #[display("log service")]
    Logs,
    #[display("event service")]
    Events,
    #[display("source host")]
    SourceHost,
    #[display("key management service")]
    Kms,
}

/// Step of the project provisioning sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProvisionStep {
    #[display("create log group")]
    CreateLogGroup,
    #[display("put retention policy")]
    PutRetentionPolicy,
    #[display("create project")]
    CreateProject,
    #[display("put rule")]
    PutRule,
    #[display("put targets")]
    PutTargets,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{service} call {operation} failed: {message}")]
    Upstream {
        service: Service,
        operation: &'static str,
        message: String,
    },

    #[error("provisioning project {project} failed at step '{step}'")]
    Provisioning {
        project: String,
        step: ProvisionStep,
        #[source]
        source: Box<Error>,
    },

    #[error("starting a build for project {project} failed")]
    Dispatch {
        project: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid settings document: {0}")]
    Settings(#[source] serde_json::Error),

    #[error("no default build script for image '{0}'")]
    UnsupportedImage(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("secret decryption failed: {0}")]
    Decryption(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a failed call against an external service.
    pub fn upstream(service: Service, operation: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Upstream {
            service,
            operation,
            message: err.to_string(),
        }
    }

    pub fn provisioning(project: impl Into<String>, step: ProvisionStep, source: Error) -> Self {
        Error::Provisioning {
            project: project.into(),
            step,
            source: Box::new(source),
        }
    }

    pub fn dispatch(project: impl Into<String>, source: Error) -> Self {
        Error::Dispatch {
            project: project.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
