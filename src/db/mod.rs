// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential persistence.
//!
//! Credentials are written once when an authorization completes and read
//! back at startup. Callers only see the `CredentialStore` trait.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::Credentials;

/// Storage for authorized credentials, keyed by entry ID.
pub trait CredentialStore: Send + Sync {
    /// Every stored `(entry_id, credentials)` pair, sorted by entry ID.
    fn load_all(&self) -> Result<Vec<(String, Credentials)>, StoreError>;

    fn get(&self, entry_id: &str) -> Result<Option<Credentials>, StoreError>;

    fn put(&self, entry_id: &str, credentials: &Credentials) -> Result<(), StoreError>;

    /// Returns `true` if something was removed.
    fn remove(&self, entry_id: &str) -> Result<bool, StoreError>;
}

/// Errors from credential storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access credential file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl From<StoreError> for crate::error::AppError {
    fn from(err: StoreError) -> Self {
        crate::error::AppError::Store(err.to_string())
    }
}
