// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory credential store (tests and non-persistent runs).

use dashmap::DashMap;

use super::{CredentialStore, StoreError};
use crate::models::Credentials;

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Credentials>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<(String, Credentials)>, StoreError> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(all)
    }

    fn get(&self, entry_id: &str) -> Result<Option<Credentials>, StoreError> {
        Ok(self.entries.get(entry_id).map(|c| c.clone()))
    }

    fn put(&self, entry_id: &str, credentials: &Credentials) -> Result<(), StoreError> {
        self.entries
            .insert(entry_id.to_string(), credentials.clone());
        Ok(())
    }

    fn remove(&self, entry_id: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(entry_id).is_some())
    }
}
