// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Senior association gate.
//!
//! Runs once after authentication. A user with no linked senior must either
//! relate an existing senior by ID or register a new one before any
//! senior-scoped screen is usable.

use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{NewSenior, Senior};
use crate::services::BackendClient;
use crate::session::SessionManager;

/// Where the user is in the association flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStep {
    Checking,
    RelateExisting,
    CreateNew,
    Ready,
}

/// Result of the initial check.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// The user already manages these seniors
    Ready(Vec<Senior>),
    /// No senior linked yet
    NeedsAssociation,
}

pub struct AssociationGate {
    session: Arc<SessionManager>,
    backend: BackendClient,
    step: GateStep,
}

impl AssociationGate {
    pub fn new(session: Arc<SessionManager>, backend: BackendClient) -> Self {
        Self {
            session,
            backend,
            step: GateStep::Checking,
        }
    }

    pub fn step(&self) -> GateStep {
        self.step
    }

    /// Look up the user's seniors.
    ///
    /// A failed lookup other than 401 is treated as "no seniors" so the user
    /// can still associate one.
    pub async fn check(&mut self) -> Result<GateOutcome> {
        self.step = GateStep::Checking;
        let (user, token) = self.session.authorize()?;

        let lookup = self
            .session
            .guard(self.backend.seniors_by_user(&token, &user.id).await);

        let seniors = match lookup {
            Ok(seniors) => seniors,
            Err(AppError::Unauthorized) => return Err(AppError::Unauthorized),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Senior lookup failed");
                Vec::new()
            }
        };

        if seniors.is_empty() {
            tracing::info!(user_id = %user.id, "User has no seniors yet");
            self.step = GateStep::RelateExisting;
            return Ok(GateOutcome::NeedsAssociation);
        }

        let preferred = self.session.storage().selected_senior();
        self.session.adopt_seniors(seniors, preferred.as_deref());
        self.step = GateStep::Ready;
        Ok(GateOutcome::Ready(self.session.seniors().seniors()))
    }

    pub fn choose_create(&mut self) {
        self.step = GateStep::CreateNew;
    }

    pub fn back_to_relate(&mut self) {
        self.step = GateStep::RelateExisting;
    }

    /// Link an existing senior to the user.
    pub async fn relate(&mut self, senior_id: &str) -> Result<Senior> {
        let senior_id = senior_id.trim();
        if senior_id.is_empty() {
            return Err(AppError::Validation("Enter the senior ID.".to_string()));
        }

        let (user, token) = self.session.authorize()?;
        self.session.guard(
            self.backend
                .relate_user_senior(&token, &user.id, senior_id)
                .await,
        )?;
        tracing::info!(user_id = %user.id, senior_id, "Related senior");

        self.finish(&user.id, &token).await
    }

    /// Register a new senior for the user.
    pub async fn create(&mut self, senior: &NewSenior) -> Result<Senior> {
        senior.validate()?;

        let (user, token) = self.session.authorize()?;
        self.session
            .guard(self.backend.create_senior(&token, senior).await)?;
        tracing::info!(user_id = %user.id, "Created senior");

        self.finish(&user.id, &token).await
    }

    /// Re-fetch after a successful association and select the first senior.
    async fn finish(&mut self, user_id: &str, token: &str) -> Result<Senior> {
        let seniors = self
            .session
            .guard(self.backend.seniors_by_user(token, user_id).await)?;

        let selected = self
            .session
            .adopt_seniors(seniors, None)
            .ok_or_else(|| AppError::NotFound("No senior linked to this user".to_string()))?;

        self.step = GateStep::Ready;
        Ok(selected)
    }
}
