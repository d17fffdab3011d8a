//! Error taxonomy for the orchestration core.

use shared::domain::{ProjectId, SectionId};
use thiserror::Error;

/// Local precondition failure. Never reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure reported by a [`crate::DocumentClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("service error: {0}")]
    Service(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        Self::Service(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no project is loaded")]
    NoProject,
    #[error("section {0} is not part of the loaded project")]
    UnknownSection(SectionId),
    #[error("project store merge loop has stopped")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no project is loaded")]
    NoProject,
    #[error("section {0} is not part of the loaded project")]
    UnknownSection(SectionId),
    #[error("project {requested} is not the loaded project ({loaded})")]
    ProjectMismatch {
        requested: ProjectId,
        loaded: ProjectId,
    },
}
