use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which remote read failed: the collection or a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchTarget {
    Users,
    User,
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Users => f.write_str("users"),
            Self::User => f.write_str("user"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOperation {
    Fetch,
    Create,
    Update,
    Delete,
}

/// Failure of a single remote users API call. The transport message is kept
/// verbatim after an operation-specific prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Failed to fetch {target}: {message}")]
    FetchFailure { target: FetchTarget, message: String },
    #[error("Failed to create user: {message}")]
    CreateFailure { message: String },
    #[error("Failed to update user: {message}")]
    UpdateFailure { message: String },
    #[error("Failed to delete user: {message}")]
    DeleteFailure { message: String },
}

impl ServiceError {
    pub fn fetch(target: FetchTarget, message: impl Into<String>) -> Self {
        Self::FetchFailure {
            target,
            message: message.into(),
        }
    }

    pub fn create(message: impl Into<String>) -> Self {
        Self::CreateFailure {
            message: message.into(),
        }
    }

    pub fn update(message: impl Into<String>) -> Self {
        Self::UpdateFailure {
            message: message.into(),
        }
    }

    pub fn delete(message: impl Into<String>) -> Self {
        Self::DeleteFailure {
            message: message.into(),
        }
    }

    pub fn operation(&self) -> ServiceOperation {
        match self {
            Self::FetchFailure { .. } => ServiceOperation::Fetch,
            Self::CreateFailure { .. } => ServiceOperation::Create,
            Self::UpdateFailure { .. } => ServiceOperation::Update,
            Self::DeleteFailure { .. } => ServiceOperation::Delete,
        }
    }

    /// The underlying transport message, without the operation prefix.
    pub fn transport_message(&self) -> &str {
        match self {
            Self::FetchFailure { message, .. }
            | Self::CreateFailure { message }
            | Self::UpdateFailure { message }
            | Self::DeleteFailure { message } => message,
        }
    }
}
