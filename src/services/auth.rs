// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Sign-up and sign-in against the backend.
//!
//! Forms are validated locally first; nothing is sent for an incomplete form.

use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{AuthSession, SignInForm, SignUpForm};
use crate::services::BackendClient;

/// Message shown when sign-up hits an existing account.
pub const DUPLICATE_EMAIL_MESSAGE: &str =
    "This e-mail is already registered. Log in or use another e-mail.";

/// Message shown for rejected credentials.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Authentication client.
#[derive(Clone)]
pub struct AuthClient {
    backend: BackendClient,
}

impl AuthClient {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Register a new account and return its session.
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<AuthSession> {
        form.validate()?;

        let session = match self.backend.register(form).await {
            Ok(session) => session,
            Err(AppError::Backend { status, message }) if (400..500).contains(&status) => {
                tracing::info!(status, "Sign-up rejected by backend");
                return Err(AppError::Authentication(sign_up_message(&message)));
            }
            Err(AppError::NotFound(message)) => {
                return Err(AppError::Authentication(sign_up_message(&message)))
            }
            Err(e) => return Err(e),
        };

        ensure_token(&session)?;
        tracing::info!(user_id = %session.user.id, role = %session.user.role, "Signed up");
        Ok(session)
    }

    /// Sign in with e-mail and password.
    pub async fn sign_in(&self, form: &SignInForm) -> Result<AuthSession> {
        form.validate()?;

        let session = match self.backend.login(form).await {
            Ok(session) => session,
            Err(AppError::Unauthorized) | Err(AppError::NotFound(_)) => {
                return Err(AppError::Authentication(
                    INVALID_CREDENTIALS_MESSAGE.to_string(),
                ))
            }
            Err(AppError::Backend { status, .. }) if matches!(status, 400 | 403 | 422) => {
                return Err(AppError::Authentication(
                    INVALID_CREDENTIALS_MESSAGE.to_string(),
                ))
            }
            Err(e) => return Err(e),
        };

        ensure_token(&session)?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }
}

fn ensure_token(session: &AuthSession) -> Result<()> {
    if session.token.trim().is_empty() {
        return Err(AppError::InvalidResponse(
            "Backend returned an empty token".to_string(),
        ));
    }
    Ok(())
}

/// Turn a backend rejection into the message shown on the sign-up form.
fn sign_up_message(server_message: &str) -> String {
    if server_message
        .to_lowercase()
        .contains("email already registered")
    {
        DUPLICATE_EMAIL_MESSAGE.to_string()
    } else if server_message.is_empty() {
        "Sign-up failed".to_string()
    } else {
        server_message.to_string()
    }
}
