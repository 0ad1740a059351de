//! Error types shared by every layer of the core.

use thiserror::Error;

/// Errors that can occur while loading, projecting or searching a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The title id has no manifest entry.
    #[error("Title not found in manifest: {title}")]
    NotFound { title: String },

    /// A required file could not be fetched or did not match its schema.
    #[error("Failed to fetch {path}: {reason}")]
    FetchFailure { path: String, reason: String },

    /// A malformed builder request or selection.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// An operation needing a dataset ran before any successful load.
    #[error("No dataset loaded. Load a title first.")]
    NotLoaded,

    /// A background computation did not run to completion.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl GraphError {
    pub fn fetch(path: impl Into<String>, reason: impl ToString) -> Self {
        GraphError::FetchFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(title: impl Into<String>) -> Self {
        GraphError::NotFound {
            title: title.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        GraphError::InvalidRequest(message.into())
    }
}

impl From<tokio::task::JoinError> for GraphError {
    fn from(err: tokio::task::JoinError) -> Self {
        GraphError::Task(err.to_string())
    }
}
