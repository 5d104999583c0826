// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Prescription model and the create/update draft.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::schedule;

/// A prescription owned by a senior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(deserialize_with = "super::id::required")]
    pub id: String,
    /// Owning senior
    #[serde(deserialize_with = "super::id::required", alias = "seniorId")]
    pub senior_id: String,
    /// Prescribed medication
    #[serde(deserialize_with = "super::id::required", alias = "medicationId")]
    pub medication_id: String,
    /// Medication name, when the backend joins it in
    #[serde(default)]
    pub medication_name: Option<String>,
    /// Amount per dose (e.g. "1 comprimido")
    pub dosage: String,
    /// Hours between doses
    #[serde(deserialize_with = "frequency_hours")]
    pub frequency: u32,
    #[serde(with = "crate::time_utils::timestamp", alias = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(default, with = "crate::time_utils::timestamp_opt", alias = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    /// Prescribing doctor
    #[serde(default, deserialize_with = "super::id::optional", alias = "doctorId")]
    pub doctor_id: Option<String>,
}

impl Prescription {
    /// Dose times across one day, anchored at the start time (UTC).
    pub fn dosage_times(&self) -> Result<Vec<NaiveTime>> {
        schedule::dosage_times(self.frequency, self.start_date.time())
    }

    /// Label for lists: medication name, else its ID.
    pub fn medication_label(&self) -> &str {
        self.medication_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.medication_id)
    }

    /// Whether the prescription is in effect at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && self.end_date.map_or(true, |end| now <= end)
    }
}

/// Body of `POST /prescriptions/` and `PUT /prescriptions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_period"))]
pub struct PrescriptionDraft {
    /// Owning senior; always overwritten with the selected senior
    #[serde(default)]
    pub senior_id: String,
    #[validate(length(min = 1, message = "Select a medication."))]
    pub medication_id: String,
    #[validate(length(min = 1, message = "Enter a dosage."))]
    pub dosage: String,
    #[validate(range(min = 1, max = 24, message = "Frequency must be between 1 and 24 hours."))]
    pub frequency: u32,
    #[serde(with = "crate::time_utils::timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(
        default,
        with = "crate::time_utils::timestamp_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn validate_period(draft: &PrescriptionDraft) -> std::result::Result<(), ValidationError> {
    match draft.end_date {
        Some(end) if end < draft.start_date => Err(ValidationError::new("period")
            .with_message("End date must not be before the start date.".into())),
        _ => Ok(()),
    }
}

/// Accept a number of hours or the backend's free text ("a cada 8h").
fn frequency_hours<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFrequency {
        Hours(u32),
        Text(String),
    }

    match RawFrequency::deserialize(d)? {
        RawFrequency::Hours(h) => Ok(h),
        RawFrequency::Text(text) => schedule::parse_frequency(&text).ok_or_else(|| {
            serde::de::Error::custom(format!("unrecognised frequency: {}", text))
        }),
    }
}
