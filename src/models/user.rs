//! User model and authentication forms.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Caregiver,
    Doctor,
}

impl UserRole {
    /// Doctors author and edit prescriptions; caregivers only read them.
    pub fn can_manage_prescriptions(self) -> bool {
        matches!(self, UserRole::Doctor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Caregiver => "caregiver",
            UserRole::Doctor => "doctor",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "caregiver" => Ok(UserRole::Caregiver),
            "doctor" => Ok(UserRole::Doctor),
            other => Err(format!("unknown role {:?} (expected caregiver or doctor)", other)),
        }
    }
}

/// Authenticated user profile.
///
/// Persisted as JSON under the `user` key next to the bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend user ID
    #[serde(deserialize_with = "super::id::required")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Caregiver or doctor
    pub role: UserRole,
}

/// Token and profile returned by sign-up and sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    /// Opaque bearer token
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

/// Sign-up form; serialised as the `/auth/register` body.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub name: String,
    #[validate(
        length(min = 1, message = "Fill in all fields."),
        email(message = "Enter a valid e-mail address.")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub password: String,
    pub role: UserRole,
}

/// Sign-in form; sent form-encoded as `username` / `password`.
#[derive(Debug, Clone, Validate)]
pub struct SignInForm {
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub email: String,
    #[validate(length(min = 1, message = "Fill in all fields."))]
    pub password: String,
}
