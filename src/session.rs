// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Authentication state container.
//!
//! Owns the in-memory session (user and bearer token), keeps it in sync with
//! durable storage and publishes every transition on a `watch` channel.
//! A 401 from any endpoint ends the session through [`SessionManager::guard`].

use chrono::Local;
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;

use crate::error::{AppError, Result};
use crate::models::{Senior, SignInForm, SignUpForm, User};
use crate::seniors::SeniorStore;
use crate::services::AuthClient;
use crate::storage::SessionStorage;

/// Message shown by views that need a senior when none is selected.
pub const NO_SENIOR_SELECTED: &str = "No senior selected";

/// Authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Stored session not read yet
    Loading,
    Unauthenticated,
    Authenticated(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// Everything a senior-scoped request needs.
#[derive(Debug, Clone)]
pub struct Scope {
    pub user: User,
    pub token: String,
    pub senior: Senior,
}

/// Session manager shared by the gate and every view.
pub struct SessionManager {
    storage: SessionStorage,
    auth: AuthClient,
    seniors: SeniorStore,
    token: RwLock<Option<String>>,
    state: watch::Sender<AuthState>,
}

impl SessionManager {
    pub fn new(storage: SessionStorage, auth: AuthClient, seniors: SeniorStore) -> Self {
        let (state, _rx) = watch::channel(AuthState::Loading);
        Self {
            storage,
            auth,
            seniors,
            token: RwLock::new(None),
            state,
        }
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    pub fn seniors(&self) -> &SeniorStore {
        &self.seniors
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Load the persisted session.
    ///
    /// A session needs both a token and a user; a lone leftover of either is
    /// removed from storage.
    pub fn restore(&self) -> AuthState {
        let token = self.storage.token();
        let user = self.storage.user();

        let next = match (token, user) {
            (Some(token), Some(user)) => {
                tracing::info!(user_id = %user.id, "Restored session");
                self.set_token(Some(token));
                AuthState::Authenticated(user)
            }
            (token, user) => {
                if token.is_some() || user.is_some() {
                    tracing::warn!("Discarding incomplete stored session");
                }
                if let Err(e) = self.storage.remove_token().and(self.storage.remove_user()) {
                    tracing::warn!(error = %e, "Failed to clear incomplete session");
                }
                self.set_token(None);
                AuthState::Unauthenticated
            }
        };

        self.state.send_replace(next.clone());
        next
    }

    pub async fn sign_in(&self, form: &SignInForm) -> Result<User> {
        let session = self.auth.sign_in(form).await?;
        self.establish(session.token, session.user)
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<User> {
        let session = self.auth.sign_up(form).await?;
        self.establish(session.token, session.user)
    }

    /// Persist a fresh session, then publish it.
    fn establish(&self, token: String, user: User) -> Result<User> {
        let previous = self.current_user();
        if previous.as_ref().map(|u| &u.id) != Some(&user.id) {
            self.seniors.reset();
            if let Err(e) = self.storage.remove_selected_senior() {
                tracing::warn!(error = %e, "Failed to clear previous senior selection");
            }
        }

        self.storage.save_token(&token)?;
        self.storage.save_user(&user)?;
        self.set_token(Some(token));
        self.state.send_replace(AuthState::Authenticated(user.clone()));
        Ok(user)
    }

    /// End the session. Safe to call repeatedly.
    pub fn logout(&self) {
        self.set_token(None);
        self.seniors.reset();
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "Failed to clear session storage");
        }

        let changed = self.state.send_if_modified(|state| {
            if *state == AuthState::Unauthenticated {
                false
            } else {
                *state = AuthState::Unauthenticated;
                true
            }
        });
        if changed {
            tracing::info!("Logged out");
        }
    }

    /// Current user and token, or `Unauthorized` when there is no session.
    pub fn authorize(&self) -> Result<(User, String)> {
        match (self.current_user(), self.token()) {
            (Some(user), Some(token)) => Ok((user, token)),
            (Some(_), None) => {
                self.logout();
                Err(AppError::Unauthorized)
            }
            _ => Err(AppError::Unauthorized),
        }
    }

    /// Session plus the selected senior.
    pub fn scope(&self) -> Result<Scope> {
        let (user, token) = self.authorize()?;
        let senior = self
            .seniors
            .selected()
            .ok_or_else(|| AppError::InvalidData(NO_SENIOR_SELECTED.to_string()))?;
        Ok(Scope {
            user,
            token,
            senior,
        })
    }

    /// Pass a result through, logging out first if it is `Unauthorized`.
    pub fn guard<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(AppError::Unauthorized) = &result {
            tracing::info!("Backend rejected the session token");
            self.logout();
        }
        result
    }

    /// ID of the selected senior, if any.
    pub fn selected_senior_id(&self) -> Option<String> {
        self.seniors.selected().map(|senior| senior.id)
    }

    /// Select a loaded senior and remember the choice.
    pub fn select_senior(&self, senior_id: &str) -> Result<Senior> {
        let senior = self.seniors.select(senior_id)?;
        self.storage.save_selected_senior(&senior.id)?;
        Ok(senior)
    }

    /// Load a freshly fetched senior list.
    ///
    /// Selects `preferred` when it is in the list, else the first senior, and
    /// persists the selection.
    pub fn adopt_seniors(&self, seniors: Vec<Senior>, preferred: Option<&str>) -> Option<Senior> {
        self.seniors
            .set_seniors(seniors, Local::now().date_naive());

        let selected = preferred
            .and_then(|id| self.seniors.select(id).ok())
            .or_else(|| self.seniors.select_first());

        match &selected {
            Some(senior) => {
                if let Err(e) = self.storage.save_selected_senior(&senior.id) {
                    tracing::warn!(error = %e, "Failed to persist senior selection");
                }
            }
            None => {
                if let Err(e) = self.storage.remove_selected_senior() {
                    tracing::warn!(error = %e, "Failed to clear senior selection");
                }
            }
        }
        selected
    }
}
