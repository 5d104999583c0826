//! Aggregated report for one senior.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Prescription, Symptom};

/// Response of `GET /reports/report/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeniorReport {
    /// Senior the report is about, when the backend includes it
    #[serde(default, deserialize_with = "super::id::optional", alias = "seniorId")]
    pub senior_id: Option<String>,
    #[serde(default)]
    pub senior_name: Option<String>,
    #[serde(default, with = "crate::time_utils::timestamp_opt")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::lenient::list")]
    pub prescriptions: Vec<Prescription>,
    #[serde(default, deserialize_with = "super::lenient::list")]
    pub symptoms: Vec<Symptom>,
    /// Free-text summary written by the backend
    #[serde(default)]
    pub summary: Option<String>,
}

impl SeniorReport {
    /// Drop nested records that belong to another senior. Returns how many were dropped.
    pub fn retain_senior(&mut self, senior_id: &str) -> usize {
        let before = self.prescriptions.len() + self.symptoms.len();
        self.prescriptions.retain(|p| p.senior_id == senior_id);
        self.symptoms.retain(|s| s.senior_id == senior_id);
        before - (self.prescriptions.len() + self.symptoms.len())
    }

    /// Average pain level over the reported symptoms.
    pub fn average_pain(&self) -> Option<f64> {
        if self.symptoms.is_empty() {
            return None;
        }
        let total: u32 = self.symptoms.iter().map(|s| u32::from(s.pain_level)).sum();
        Some(f64::from(total) / self.symptoms.len() as f64)
    }
}
