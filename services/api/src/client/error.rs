//! services/api/src/client/error.rs
//!
//! Failure values produced by the API client.

use reading_list_core::ports::PortError;
use serde_json::Value;
use std::fmt;

/// What went wrong, independent of which operation was running.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Base URL or credentials missing; no request was made.
    #[error("{0}")]
    Configuration(String),

    /// No usable token; no request was made.
    #[error("Not authenticated")]
    Authentication,

    /// The remote service answered with status >= 400.
    #[error("API returned {status}: {status_text}")]
    Upstream {
        status: u16,
        status_text: String,
        body: Value,
    },

    /// The remote answer lacks a field the operation depends on.
    #[error("{0}")]
    Shape(String),

    /// The relay could not be reached or could not perform the call.
    #[error("{0}")]
    Transport(String),
}

impl ClientError {
    pub fn missing_base_url() -> Self {
        ClientError::Configuration("API URL not configured".to_string())
    }

    pub fn invalid_format() -> Self {
        ClientError::Shape("Invalid API response format".to_string())
    }
}

impl From<PortError> for ClientError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::Transport(message) => ClientError::Transport(message),
            other => ClientError::Transport(other.to_string()),
        }
    }
}

/// The API client operation that failed; each has a fixed message prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchArticles,
    FetchArticle,
    AddArticle,
    UpdateArticle,
    DeleteArticle,
    FetchAnnotations,
    SaveAnnotation,
    UpdateAnnotation,
    DeleteAnnotation,
    Authenticate,
}

impl Operation {
    pub fn prefix(&self) -> &'static str {
        match self {
            Operation::FetchArticles => "Failed to fetch articles",
            Operation::FetchArticle => "Failed to fetch article",
            Operation::AddArticle => "Failed to add article",
            Operation::UpdateArticle => "Failed to update article",
            Operation::DeleteArticle => "Failed to delete article",
            Operation::FetchAnnotations => "Failed to fetch annotations",
            Operation::SaveAnnotation => "Failed to save annotation",
            Operation::UpdateAnnotation => "Failed to update annotation",
            Operation::DeleteAnnotation => "Failed to delete annotation",
            Operation::Authenticate => "Failed to authenticate",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The single error value every client operation surfaces.
#[derive(Debug, thiserror::Error)]
#[error("{operation}: {source}")]
pub struct ApiFailure {
    pub operation: Operation,
    #[source]
    pub source: ClientError,
}

impl ApiFailure {
    pub fn new(operation: Operation, source: ClientError) -> Self {
        Self { operation, source }
    }

    pub fn kind(&self) -> &ClientError {
        &self.source
    }
}
