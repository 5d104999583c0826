// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Services module - backend access layer.

pub mod auth;
pub mod backend;

pub use auth::AuthClient;
pub use backend::BackendClient;
