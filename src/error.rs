use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl AppError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }
}

/// User-facing operations; each maps to one generic failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadSubjects,
    LoadSubject,
    CreateSubject,
    UpdateSubject,
    DeleteSubject,
    UpdateWeek,
    AddResource,
    DeleteResource,
    ExportSubject,
}

impl Action {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Action::LoadSubjects => "Failed to load subjects",
            Action::LoadSubject => "Failed to load subject",
            Action::CreateSubject => "Failed to create subject",
            Action::UpdateSubject => "Failed to update subject",
            Action::DeleteSubject => "Failed to delete subject",
            Action::UpdateWeek => "Failed to update week",
            Action::AddResource => "Failed to add resource",
            Action::DeleteResource => "Failed to delete resource",
            Action::ExportSubject => "Failed to export subject",
        }
    }
}

/// Dismissible error shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub action: Option<Action>,
    pub message: String,
}

impl Banner {
    /// Validation errors keep their own text; everything else collapses to
    /// the action's generic message.
    pub fn from_error(action: Action, err: &AppError) -> Self {
        let message = match err {
            AppError::Validation(msg) => msg.clone(),
            _ => action.failure_message().to_string(),
        };
        Self {
            action: Some(action),
            message,
        }
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
