// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Symptom reported for a senior (read-only in this client).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reported symptom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    #[serde(deserialize_with = "super::id::required")]
    pub id: String,
    /// Owning senior
    #[serde(deserialize_with = "super::id::required", alias = "seniorId")]
    pub senior_id: String,
    pub description: String,
    /// Self-reported pain on a 0-10 scale
    #[serde(default, alias = "painLevel")]
    pub pain_level: u8,
    /// When the symptom was reported
    #[serde(with = "crate::time_utils::timestamp", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Symptom {
    /// Coarse severity label for the pain level.
    pub fn severity(&self) -> &'static str {
        match self.pain_level {
            0..=3 => "Slight",
            4..=6 => "Moderate",
            _ => "Strong",
        }
    }
}
