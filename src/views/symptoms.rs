// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Symptoms view, newest first.

use std::sync::Arc;

use super::{load, ViewCell, ViewState};
use crate::error::{AppError, Result};
use crate::models::Symptom;
use crate::services::BackendClient;
use crate::session::SessionManager;

pub struct SymptomsView {
    session: Arc<SessionManager>,
    backend: BackendClient,
    cell: ViewCell<Vec<Symptom>>,
}

impl SymptomsView {
    pub fn new(session: Arc<SessionManager>, backend: BackendClient) -> Self {
        Self {
            session,
            backend,
            cell: ViewCell::new(),
        }
    }

    pub fn state(&self) -> ViewState<Vec<Symptom>> {
        self.cell
            .state_for(self.session.selected_senior_id().as_deref())
    }

    pub fn invalidate(&self) {
        self.cell.invalidate();
    }

    pub async fn refresh(&self) -> Result<Vec<Symptom>> {
        let backend = &self.backend;
        load(&self.cell, &self.session, |scope| async move {
            let mut symptoms = backend
                .symptoms_by_senior(&scope.token, &scope.senior.id)
                .await?;
            symptoms.retain(|s| s.senior_id == scope.senior.id);
            sort_newest_first(&mut symptoms);
            Ok::<_, AppError>(symptoms)
        })
        .await
    }
}

fn sort_newest_first(symptoms: &mut [Symptom]) {
    symptoms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
