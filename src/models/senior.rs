//! Senior model: the person under care and the scope of nearly all data.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A senior linked to the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Senior {
    /// Backend senior ID
    #[serde(deserialize_with = "super::id::required")]
    pub id: String,
    /// Full name
    pub name: String,
    /// Birth date as sent by the backend (`dd/mm/yyyy` or ISO)
    #[serde(default, alias = "birthDate")]
    pub birth_date: String,
    /// Free-form identifier (e.g. an e-mail)
    #[serde(default)]
    pub identifier: Option<String>,
    /// Paired dispenser device
    #[serde(default, deserialize_with = "super::id::optional")]
    pub device_id: Option<String>,
    /// Age in full years, derived locally from `birth_date`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

impl Senior {
    /// Parsed birth date, if the backend string is recognisable.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        parse_birth_date(&self.birth_date)
    }

    /// Age in full years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date()?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }

    /// Copy of this senior with `age` filled in for `today`.
    pub fn with_age(mut self, today: NaiveDate) -> Self {
        self.age = self.age_on(today);
        self
    }
}

/// Parse `dd/mm/yyyy`, `yyyy-mm-dd` or an ISO timestamp's date part.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            raw.get(..10)
                .filter(|_| raw.contains('T'))
                .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        })
}

/// Body of `POST /senior/`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewSenior {
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Fill in all fields."),
        custom(function = "validate_birth_date")
    )]
    pub birth_date: String,
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub device_id: String,
}

fn validate_birth_date(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || parse_birth_date(value).is_some() {
        return Ok(());
    }
    Err(ValidationError::new("birth_date").with_message("Birth date must be dd/mm/yyyy.".into()))
}
