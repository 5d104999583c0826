// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Durable key-value storage for the session.
//!
//! Holds the bearer token (`authToken`), the serialised user (`user`) and
//! the selected senior ID (`selectedSenior`).

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{AppError, Result};
use crate::models::User;

/// Storage keys.
pub mod keys {
    pub const AUTH_TOKEN: &str = "authToken";
    pub const USER: &str = "user";
    pub const SELECTED_SENIOR: &str = "selectedSenior";
}

/// Minimal string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store, for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// JSON file store. Every write replaces the file atomically (temp + rename).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AppError::Storage(format!("Corrupt store {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let body = serde_json::to_vec_pretty(map)
            .map_err(|e| AppError::Storage(format!("Failed to encode store: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                AppError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
            })
    }

    /// Read-modify-write under the store lock.
    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        // A corrupt file is replaced rather than blocking every later write.
        let mut map = self.read_map().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable session store");
            BTreeMap::new()
        });
        f(&mut map);
        self.write_map(&map)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

/// Typed access to the session keys.
///
/// Reads never fail: an unreadable value is logged and treated as absent.
#[derive(Clone)]
pub struct SessionStorage {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read from session store");
                None
            }
        }
    }

    pub fn save_token(&self, token: &str) -> Result<()> {
        self.store.set(keys::AUTH_TOKEN, token)
    }

    pub fn token(&self) -> Option<String> {
        self.read(keys::AUTH_TOKEN)
    }

    pub fn remove_token(&self) -> Result<()> {
        self.store.remove(keys::AUTH_TOKEN)
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user)
            .map_err(|e| AppError::Storage(format!("Failed to encode user: {}", e)))?;
        self.store.set(keys::USER, &json)
    }

    pub fn user(&self) -> Option<User> {
        let raw = self.read(keys::USER)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user record is corrupt");
                None
            }
        }
    }

    pub fn remove_user(&self) -> Result<()> {
        self.store.remove(keys::USER)
    }

    pub fn save_selected_senior(&self, senior_id: &str) -> Result<()> {
        self.store.set(keys::SELECTED_SENIOR, senior_id)
    }

    pub fn selected_senior(&self) -> Option<String> {
        self.read(keys::SELECTED_SENIOR)
    }

    pub fn remove_selected_senior(&self) -> Result<()> {
        self.store.remove(keys::SELECTED_SENIOR)
    }

    /// Remove every session key, attempting all of them even if one fails.
    pub fn clear(&self) -> Result<()> {
        let results = [
            self.remove_token(),
            self.remove_user(),
            self.remove_selected_senior(),
        ];
        results.into_iter().collect()
    }
}
