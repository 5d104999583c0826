// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Senior-scoped views: dispenser, prescriptions, symptoms and reports.
//!
//! Every view refetches on `refresh()` and routes backend results through
//! the session guard, so a 401 anywhere ends the session.

pub mod dispenser;
pub mod lifecycle;
pub mod prescriptions;
pub mod reports;
pub mod symptoms;

pub use dispenser::DispenserView;
pub use lifecycle::{RequestGuard, Ticket, ViewCell, ViewState};
pub use prescriptions::PrescriptionsView;
pub use reports::ReportsView;
pub use symptoms::SymptomsView;

use std::future::Future;

use crate::error::Result;
use crate::session::{Scope, SessionManager};

/// Run one senior-scoped fetch through the view lifecycle.
///
/// The result is kept only if the same senior is still selected when it
/// arrives.
pub(crate) async fn load<T, F, Fut>(
    cell: &ViewCell<T>,
    session: &SessionManager,
    fetch: F,
) -> Result<T>
where
    T: Clone,
    F: FnOnce(Scope) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let scope = session.scope();
    let ticket = cell.begin(scope.as_ref().ok().map(|s| s.senior.id.clone()));
    let scope = match scope {
        Ok(scope) => scope,
        Err(e) => return cell.finish(ticket, Err(e), session.selected_senior_id().as_deref()),
    };

    let result = session.guard(fetch(scope).await);
    cell.finish(ticket, result, session.selected_senior_id().as_deref())
}
