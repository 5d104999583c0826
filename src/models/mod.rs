// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Data models exchanged with the Serena backend.

pub mod dispenser;
pub mod medication;
pub mod prescription;
pub mod report;
pub mod senior;
pub mod symptom;
pub mod user;

pub use dispenser::{Compartment, CompartmentUpdate, DeviceResponse, Dispenser, Slot, SLOT_COUNT};
pub use medication::Medication;
pub use prescription::{Prescription, PrescriptionDraft};
pub use report::SeniorReport;
pub use senior::{NewSenior, Senior};
pub use symptom::Symptom;
pub use user::{AuthSession, SignInForm, SignUpForm, User, UserRole};

/// Serde helpers for backend identifiers, which arrive as strings or integers.
pub(crate) mod id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    impl From<RawId> for String {
        fn from(raw: RawId) -> Self {
            match raw {
                RawId::Text(s) => s,
                RawId::Number(n) => n.to_string(),
            }
        }
    }

    pub fn required<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        RawId::deserialize(d).map(String::from)
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<RawId>::deserialize(d)?
            .map(String::from)
            .filter(|s| !s.is_empty()))
    }
}

/// Record lists where a malformed entry is skipped with a warning instead of
/// failing the whole response.
pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn records<T: DeserializeOwned>(values: Vec<Value>, kind: &str) -> Vec<T> {
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(kind, error = %e, "Skipping malformed record");
                    None
                }
            })
            .collect()
    }

    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let values = Option::<Vec<Value>>::deserialize(d)?.unwrap_or_default();
        let kind = std::any::type_name::<T>().rsplit("::").next().unwrap_or("record");
        Ok(records(values, kind))
    }
}
