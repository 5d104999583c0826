// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Senior state container: the seniors the user manages and the selection.
//!
//! Changes are published on a `watch` channel so views can refetch when
//! the selected senior changes.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{AppError, Result};
use crate::models::Senior;

/// Point-in-time view of the container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeniorSnapshot {
    pub seniors: Vec<Senior>,
    pub selected: Option<Senior>,
}

/// Shared holder of the seniors list and the selected senior.
#[derive(Clone)]
pub struct SeniorStore {
    tx: Arc<watch::Sender<SeniorSnapshot>>,
}

impl Default for SeniorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SeniorStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SeniorSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<SeniorSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> SeniorSnapshot {
        self.tx.borrow().clone()
    }

    pub fn seniors(&self) -> Vec<Senior> {
        self.tx.borrow().seniors.clone()
    }

    pub fn selected(&self) -> Option<Senior> {
        self.tx.borrow().selected.clone()
    }

    /// Replace the list, computing ages for `today`.
    ///
    /// The selection survives if its senior is still in the list (refreshed
    /// from the new data), otherwise it is cleared.
    pub fn set_seniors(&self, seniors: Vec<Senior>, today: NaiveDate) {
        let seniors: Vec<Senior> = seniors.into_iter().map(|s| s.with_age(today)).collect();
        self.tx.send_modify(|snapshot| {
            snapshot.selected = snapshot
                .selected
                .as_ref()
                .and_then(|current| seniors.iter().find(|s| s.id == current.id).cloned());
            snapshot.seniors = seniors;
        });
    }

    /// Select a senior from the list by ID.
    pub fn select(&self, senior_id: &str) -> Result<Senior> {
        let senior = self
            .tx
            .borrow()
            .seniors
            .iter()
            .find(|s| s.id == senior_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Senior {}", senior_id)))?;

        self.tx.send_modify(|snapshot| snapshot.selected = Some(senior.clone()));
        tracing::debug!(senior_id, "Selected senior");
        Ok(senior)
    }

    /// Select the first senior in the list, if any.
    pub fn select_first(&self) -> Option<Senior> {
        let first = self.tx.borrow().seniors.first().cloned();
        if let Some(senior) = &first {
            self.tx
                .send_modify(|snapshot| snapshot.selected = Some(senior.clone()));
        }
        first
    }

    /// Forget all seniors and the selection.
    pub fn reset(&self) {
        self.tx.send_replace(SeniorSnapshot::default());
    }
}
