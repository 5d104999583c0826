// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Load state shared by every view, and the generation guard that keeps a
//! stale response from overwriting newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{AppError, Result};

/// What a view currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Proof that a request was started at a given generation, for a given senior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    senior_id: Option<String>,
}

impl Ticket {
    /// Senior the request was scoped to, if one was selected.
    pub fn senior_id(&self) -> Option<&str> {
        self.senior_id.as_deref()
    }
}

/// Monotonic request counter.
#[derive(Debug, Default)]
pub struct RequestGuard {
    generation: AtomicU64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request; any earlier ticket becomes stale.
    pub fn begin(&self, senior_id: Option<String>) -> Ticket {
        Ticket {
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
            senior_id,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    /// Make every outstanding ticket stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct Entry<T> {
    state: ViewState<T>,
    /// Senior the state belongs to
    senior_id: Option<String>,
}

/// A view's state plus its request guard.
///
/// State is owned by the senior it was requested for and is never shown or
/// edited once another senior is selected.
#[derive(Debug)]
pub struct ViewCell<T> {
    entry: Mutex<Entry<T>>,
    guard: RequestGuard,
}

impl<T> Default for ViewCell<T> {
    fn default() -> Self {
        Self {
            entry: Mutex::new(Entry {
                state: ViewState::Idle,
                senior_id: None,
            }),
            guard: RequestGuard::new(),
        }
    }
}

impl<T: Clone> ViewCell<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw state, whichever senior it belongs to.
    pub fn state(&self) -> ViewState<T> {
        self.lock().state.clone()
    }

    /// State as seen with `senior_id` selected: `Idle` if it belongs to someone else.
    pub fn state_for(&self, senior_id: Option<&str>) -> ViewState<T> {
        let entry = self.lock();
        if entry.senior_id.as_deref() == senior_id {
            entry.state.clone()
        } else {
            ViewState::Idle
        }
    }

    /// The loaded value, only if it was loaded for `senior_id`.
    pub fn loaded_for(&self, senior_id: &str) -> Option<T> {
        let entry = self.lock();
        match (&entry.state, entry.senior_id.as_deref()) {
            (ViewState::Loaded(value), Some(owner)) if owner == senior_id => Some(value.clone()),
            _ => None,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entry<T>> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a ticket for `senior_id` and show the loading state.
    pub fn begin(&self, senior_id: Option<String>) -> Ticket {
        let mut entry = self.lock();
        let ticket = self.guard.begin(senior_id.clone());
        entry.state = ViewState::Loading;
        entry.senior_id = senior_id;
        ticket
    }

    /// Apply a finished request if its ticket is still current and its
    /// senior is still `selected`.
    ///
    /// A stale result is dropped and reported as `Superseded`. A result for a
    /// senior who is no longer selected also resets the view to `Idle`.
    pub fn finish(&self, ticket: Ticket, result: Result<T>, selected: Option<&str>) -> Result<T> {
        let mut entry = self.lock();
        if !self.guard.is_current(&ticket) {
            tracing::debug!("Dropping superseded response");
            return Err(AppError::Superseded);
        }
        if ticket.senior_id() != selected {
            tracing::debug!(
                requested = ?ticket.senior_id(),
                selected = ?selected,
                "Dropping response for a senior no longer selected"
            );
            self.guard.invalidate();
            entry.state = ViewState::Idle;
            entry.senior_id = None;
            return Err(AppError::Superseded);
        }

        entry.state = match &result {
            Ok(value) => ViewState::Loaded(value.clone()),
            Err(e) => ViewState::Failed(e.user_message()),
        };
        result
    }

    /// Modify the value loaded for `senior_id` in place. Returns `None` if
    /// nothing is loaded for that senior.
    pub fn update_for<R>(&self, senior_id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut entry = self.lock();
        if entry.senior_id.as_deref() != Some(senior_id) {
            return None;
        }
        match &mut entry.state {
            ViewState::Loaded(value) => Some(f(value)),
            _ => None,
        }
    }

    /// Leave the view: outstanding requests become stale and the state resets.
    pub fn invalidate(&self) {
        let mut entry = self.lock();
        self.guard.invalidate();
        entry.state = ViewState::Idle;
        entry.senior_id = None;
    }
}
