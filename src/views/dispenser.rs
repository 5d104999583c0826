// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Dispenser view: the selected senior's compartments and their contents.

use std::sync::{Arc, PoisonError, RwLock};

use super::{load, ViewCell, ViewState};
use crate::error::{AppError, Result};
use crate::models::medication::name_of;
use crate::models::{CompartmentUpdate, Dispenser, Medication, Slot};
use crate::services::BackendClient;
use crate::session::SessionManager;

const INVALID_COMPARTMENT: &str = "Invalid compartment.";

pub struct DispenserView {
    session: Arc<SessionManager>,
    backend: BackendClient,
    cell: ViewCell<Dispenser>,
    catalogue: RwLock<Vec<Medication>>,
}

impl DispenserView {
    pub fn new(session: Arc<SessionManager>, backend: BackendClient) -> Self {
        Self {
            session,
            backend,
            cell: ViewCell::new(),
            catalogue: RwLock::new(Vec::new()),
        }
    }

    pub fn state(&self) -> ViewState<Dispenser> {
        self.cell
            .state_for(self.session.selected_senior_id().as_deref())
    }

    pub fn invalidate(&self) {
        self.cell.invalidate();
    }

    /// Load the device of the selected senior and lay out its slots.
    pub async fn refresh(&self) -> Result<Dispenser> {
        let backend = &self.backend;
        load(&self.cell, &self.session, |scope| async move {
            let device = backend
                .device_by_senior(&scope.token, &scope.senior.id)
                .await?;
            let dispenser = Dispenser::from_device(&device);
            tracing::debug!(
                senior_id = %scope.senior.id,
                filled = dispenser.filled(),
                "Loaded dispenser"
            );
            Ok::<_, AppError>(dispenser)
        })
        .await
    }

    /// Load the medication catalogue used to fill slots.
    pub async fn medications(&self) -> Result<Vec<Medication>> {
        let (_, token) = self.session.authorize()?;
        let medications = self
            .session
            .guard(self.backend.medications(&token).await)?;

        *self
            .catalogue
            .write()
            .unwrap_or_else(PoisonError::into_inner) = medications.clone();
        Ok(medications)
    }

    async fn catalogue(&self) -> Result<Vec<Medication>> {
        let cached = self
            .catalogue
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if cached.is_empty() {
            self.medications().await
        } else {
            Ok(cached)
        }
    }

    /// Bind a medication and quantity to the slot at `position` (1-based), or
    /// clear it when `medication_id` is `None` or empty.
    ///
    /// The slot must have been loaded, for the selected senior, with a
    /// compartment ID.
    pub async fn save_slot(
        &self,
        position: usize,
        medication_id: Option<&str>,
        quantity: u32,
    ) -> Result<Slot> {
        let scope = self.session.scope()?;
        let senior_id = scope.senior.id.as_str();

        let compartment_id = self
            .cell
            .loaded_for(senior_id)
            .and_then(|dispenser| dispenser.slot(position).cloned())
            .and_then(|slot| slot.compartment_id)
            .ok_or_else(|| AppError::InvalidData(INVALID_COMPARTMENT.to_string()))?;

        let (update, medication_name) = match medication_id.map(str::trim).filter(|id| !id.is_empty()) {
            None => (CompartmentUpdate::clear(), String::new()),
            Some(id) => (
                CompartmentUpdate {
                    medication_id: id.to_string(),
                    quantity,
                },
                self.medication_name(id).await,
            ),
        };

        self.session.guard(
            self.backend
                .update_compartment(&scope.token, &compartment_id, &update)
                .await,
        )?;
        tracing::info!(
            compartment_id = %compartment_id,
            senior_id,
            position,
            cleared = update.medication_id.is_empty(),
            "Updated compartment"
        );

        self.cell
            .update_for(senior_id, |dispenser| {
                dispenser.slot_mut(position).map(|slot| {
                    slot.apply(&update, &medication_name);
                    slot.clone()
                })
            })
            .flatten()
            .ok_or_else(|| AppError::InvalidData(INVALID_COMPARTMENT.to_string()))
    }

    /// Display name for a medication; empty when unknown or the catalogue
    /// cannot be fetched.
    async fn medication_name(&self, medication_id: &str) -> String {
        match self.catalogue().await {
            Ok(catalogue) => name_of(&catalogue, medication_id)
                .unwrap_or_default()
                .to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Medication catalogue unavailable");
                String::new()
            }
        }
    }
}
