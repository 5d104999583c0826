// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Prescriptions view. Everyone can read; only doctors can write.

use chrono::NaiveTime;
use std::sync::Arc;
use validator::Validate;

use super::{load, ViewCell, ViewState};
use crate::error::{AppError, Result};
use crate::models::{Prescription, PrescriptionDraft};
use crate::services::BackendClient;
use crate::session::{Scope, SessionManager};

pub struct PrescriptionsView {
    session: Arc<SessionManager>,
    backend: BackendClient,
    cell: ViewCell<Vec<Prescription>>,
}

impl PrescriptionsView {
    pub fn new(session: Arc<SessionManager>, backend: BackendClient) -> Self {
        Self {
            session,
            backend,
            cell: ViewCell::new(),
        }
    }

    pub fn state(&self) -> ViewState<Vec<Prescription>> {
        self.cell
            .state_for(self.session.selected_senior_id().as_deref())
    }

    pub fn invalidate(&self) {
        self.cell.invalidate();
    }

    /// Load the selected senior's prescriptions.
    pub async fn refresh(&self) -> Result<Vec<Prescription>> {
        let backend = &self.backend;
        load(&self.cell, &self.session, |scope| async move {
            let mut prescriptions = backend
                .prescriptions_by_senior(&scope.token, &scope.senior.id)
                .await?;

            let total = prescriptions.len();
            prescriptions.retain(|p| p.senior_id == scope.senior.id);
            if prescriptions.len() != total {
                tracing::warn!(
                    senior_id = %scope.senior.id,
                    dropped = total - prescriptions.len(),
                    "Backend returned prescriptions for another senior"
                );
            }
            Ok::<_, AppError>(prescriptions)
        })
        .await
    }

    /// Create a prescription for the selected senior and reload the list.
    pub async fn create(&self, draft: PrescriptionDraft) -> Result<Vec<Prescription>> {
        let scope = self.doctor_scope()?;
        let draft = prepare(draft, &scope)?;

        self.session
            .guard(self.backend.create_prescription(&scope.token, &draft).await)?;
        tracing::info!(senior_id = %scope.senior.id, "Created prescription");
        self.refresh().await
    }

    pub async fn update(
        &self,
        prescription_id: &str,
        draft: PrescriptionDraft,
    ) -> Result<Vec<Prescription>> {
        let scope = self.doctor_scope()?;
        let draft = prepare(draft, &scope)?;

        self.session.guard(
            self.backend
                .update_prescription(&scope.token, prescription_id, &draft)
                .await,
        )?;
        tracing::info!(prescription_id, "Updated prescription");
        self.refresh().await
    }

    pub async fn delete(&self, prescription_id: &str) -> Result<Vec<Prescription>> {
        let scope = self.doctor_scope()?;

        self.session.guard(
            self.backend
                .delete_prescription(&scope.token, prescription_id)
                .await,
        )?;
        tracing::info!(prescription_id, "Deleted prescription");
        self.refresh().await
    }

    /// Dose times for a prescription loaded for the selected senior.
    pub fn schedule(&self, prescription_id: &str) -> Result<Vec<NaiveTime>> {
        let scope = self.session.scope()?;
        self.cell
            .loaded_for(&scope.senior.id)
            .and_then(|list| list.into_iter().find(|p| p.id == prescription_id))
            .ok_or_else(|| AppError::NotFound(format!("Prescription {}", prescription_id)))?
            .dosage_times()
    }

    fn doctor_scope(&self) -> Result<Scope> {
        let scope = self.session.scope()?;
        if !scope.user.role.can_manage_prescriptions() {
            return Err(AppError::Forbidden(
                "Only doctors can manage prescriptions.".to_string(),
            ));
        }
        Ok(scope)
    }
}

/// Validate a draft and bind it to the selected senior.
fn prepare(mut draft: PrescriptionDraft, scope: &Scope) -> Result<PrescriptionDraft> {
    draft.validate()?;
    draft.senior_id = scope.senior.id.clone();
    Ok(draft)
}
