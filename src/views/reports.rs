// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Reports view: the aggregated report and its HTML export.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{load, ViewCell, ViewState};
use crate::error::{AppError, Result};
use crate::models::SeniorReport;
use crate::report_html;
use crate::services::BackendClient;
use crate::session::SessionManager;

pub struct ReportsView {
    session: Arc<SessionManager>,
    backend: BackendClient,
    cell: ViewCell<SeniorReport>,
}

impl ReportsView {
    pub fn new(session: Arc<SessionManager>, backend: BackendClient) -> Self {
        Self {
            session,
            backend,
            cell: ViewCell::new(),
        }
    }

    pub fn state(&self) -> ViewState<SeniorReport> {
        self.cell
            .state_for(self.session.selected_senior_id().as_deref())
    }

    pub fn invalidate(&self) {
        self.cell.invalidate();
    }

    /// Load the report for the selected senior.
    ///
    /// A report about a different senior is rejected outright; stray nested
    /// records are dropped.
    pub async fn refresh(&self) -> Result<SeniorReport> {
        let backend = &self.backend;
        load(&self.cell, &self.session, |scope| async move {
            let mut report = backend.report(&scope.token, &scope.senior.id).await?;

            if let Some(other) = report.senior_id.as_deref().filter(|id| *id != scope.senior.id) {
                return Err(AppError::InvalidResponse(format!(
                    "Report for senior {} requested, got {}",
                    scope.senior.id, other
                )));
            }

            let dropped = report.retain_senior(&scope.senior.id);
            if dropped > 0 {
                tracing::warn!(senior_id = %scope.senior.id, dropped, "Dropped foreign report records");
            }
            report.senior_id = Some(scope.senior.id.clone());
            if report.senior_name.as_deref().map_or(true, str::is_empty) {
                report.senior_name = Some(scope.senior.name.clone());
            }
            Ok::<_, AppError>(report)
        })
        .await
    }

    /// Write the report loaded for the selected senior as a standalone HTML
    /// document.
    pub fn export_html(&self, path: &Path) -> Result<PathBuf> {
        let scope = self.session.scope()?;
        let report = self
            .cell
            .loaded_for(&scope.senior.id)
            .ok_or_else(|| AppError::InvalidData("No report loaded.".to_string()))?;

        let html = report_html::render(&report, Utc::now());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(path, html).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Report export failed");
            AppError::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), "Exported report");
        Ok(path.to_path_buf())
    }
}
