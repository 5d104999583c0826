//! Medication catalogue entry.

use serde::{Deserialize, Serialize};

/// A medication from `/medications/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    #[serde(deserialize_with = "super::id::required")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Name of the medication with `id`, if it is in `catalogue`.
pub fn name_of<'a>(catalogue: &'a [Medication], id: &str) -> Option<&'a str> {
    catalogue
        .iter()
        .find(|m| m.id == id)
        .map(|m| m.name.as_str())
}
