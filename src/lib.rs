// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Serena Care: caregiver and doctor client for the Serena backend.
//!
//! This crate provides authentication, senior association and the
//! senior-scoped views (dispenser, prescriptions, symptoms, reports)
//! on top of the Serena REST API.

pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod report_html;
pub mod schedule;
pub mod seniors;
pub mod services;
pub mod session;
pub mod storage;
pub mod time_utils;
pub mod views;

use std::sync::Arc;

use config::Config;
use error::Result;
use gate::AssociationGate;
use seniors::SeniorStore;
use services::{AuthClient, BackendClient};
use session::SessionManager;
use storage::{FileStore, KeyValueStore, SessionStorage};
use views::{DispenserView, PrescriptionsView, ReportsView, SymptomsView};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backend: BackendClient,
    pub session: Arc<SessionManager>,
}

impl AppState {
    /// State persisted in the configured session file.
    pub fn new(config: Config) -> Result<Self> {
        let store = Arc::new(FileStore::new(config.state_file.clone()));
        Self::with_store(config, store)
    }

    /// State persisted in an arbitrary store.
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let backend = BackendClient::from_config(&config)?;
        let session = SessionManager::new(
            SessionStorage::new(store),
            AuthClient::new(backend.clone()),
            SeniorStore::new(),
        );

        Ok(Self {
            config,
            backend,
            session: Arc::new(session),
        })
    }

    pub fn gate(&self) -> AssociationGate {
        AssociationGate::new(self.session.clone(), self.backend.clone())
    }

    pub fn dispenser_view(&self) -> DispenserView {
        DispenserView::new(self.session.clone(), self.backend.clone())
    }

    pub fn prescriptions_view(&self) -> PrescriptionsView {
        PrescriptionsView::new(self.session.clone(), self.backend.clone())
    }

    pub fn symptoms_view(&self) -> SymptomsView {
        SymptomsView::new(self.session.clone(), self.backend.clone())
    }

    pub fn reports_view(&self) -> ReportsView {
        ReportsView::new(self.session.clone(), self.backend.clone())
    }
}
