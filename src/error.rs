use serde::Deserialize;
use thiserror::Error;

/// One validation problem tied to a specific input field, as reported by the
/// backend in structured 400/422 responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not signed in, or the session has expired")]
    Unauthorized,

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Vec<FieldError>,
    },

    #[error("{0}")]
    AlreadyTracked(String),

    #[error("Not found")]
    NotFound,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend error {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Illegal status change: {0}")]
    IllegalTransition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }

    /// Message suitable for an inline banner near the triggering control.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Transport(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}
