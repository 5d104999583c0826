// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Application error types shared by the client, the session layer and views.

/// Application error type.
///
/// Variants follow the failure classes a caller has to tell apart:
/// client-side validation, rejected credentials, an expired session,
/// backend and transport failures, and malformed data.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected backend response: {0}")]
    InvalidResponse(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Request superseded by a newer one")]
    Superseded,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True when the backend rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }

    /// Short message suitable for an inline form error or an alert.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Authentication(msg)
            | AppError::Forbidden(msg)
            | AppError::InvalidData(msg) => msg.clone(),
            AppError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            AppError::NotFound(what) => format!("Not found: {}", what),
            AppError::Backend { message, .. } if !message.is_empty() => message.clone(),
            AppError::Backend { .. } | AppError::InvalidResponse(_) => {
                "The server could not complete the request.".to_string()
            }
            AppError::Network(_) => "Connection error. Check your network and try again.".to_string(),
            AppError::Storage(_) => "Could not access local storage.".to_string(),
            AppError::Superseded => "Request cancelled.".to_string(),
            AppError::Internal(_) => "Something went wrong.".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the first failing field in name order so the message is stable.
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        let message = fields
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Fill in all fields.".to_string());

        AppError::Validation(message)
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
