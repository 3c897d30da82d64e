//! Commit statuses published back to the source host.

use serde::{Deserialize, Serialize};

use crate::build::BuildPhase;

/// Context label the statuses are published under.
pub const STATUS_CONTEXT: &str = "bundle-shepherd";

/// Commit status state understood by the source host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
    Error,
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitState::Pending => write!(f, "pending"),
            CommitState::Success => write!(f, "success"),
            CommitState::Failure => write!(f, "failure"),
            CommitState::Error => write!(f, "error"),
        }
    }
}

/// One status annotation on a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub state: CommitState,
    pub description: String,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl CommitStatus {
    /// Status reporting `phase`, linking to `target_url` when given.
    pub fn for_phase(phase: BuildPhase, target_url: Option<String>) -> Self {
        let (state, description) = match phase {
            BuildPhase::InProgress => (CommitState::Pending, "Your build is in progress"),
            BuildPhase::Succeeded => (CommitState::Success, "Your build succeeded"),
            BuildPhase::Failed => (CommitState::Failure, "Your build failed"),
            BuildPhase::Stopped => (CommitState::Error, "Your build encountered an error"),
        };

        Self {
            state,
            description: description.to_string(),
            context: STATUS_CONTEXT.to_string(),
            target_url,
        }
    }
}
