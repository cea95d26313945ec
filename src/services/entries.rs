// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lifecycle of configured entries.
//!
//! An entry is one authorized FatSecret account. Setting it up performs the
//! first refresh and only registers the entry if that refresh succeeds.

use std::sync::Arc;

use dashmap::DashMap;

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::{Credentials, NutrientTotals};
use crate::services::coordinator::{Coordinator, PollResult};
use crate::services::fatsecret::FatSecretClient;
use crate::services::scheduler::{ScheduleHandle, Scheduler};

/// Entry ID used when an authorization does not name one.
pub const DEFAULT_ENTRY_ID: &str = "default";

struct Entry {
    coordinator: Arc<Coordinator>,
    // Held for its Drop: removing the entry stops its refreshes
    _schedule: ScheduleHandle,
}

pub struct EntryManager {
    client: FatSecretClient,
    scheduler: Arc<dyn Scheduler>,
    entries: DashMap<String, Entry>,
}

impl EntryManager {
    pub fn new(client: FatSecretClient, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            client,
            scheduler,
            entries: DashMap::new(),
        }
    }

    /// Create, refresh, schedule and register an entry.
    ///
    /// If the first refresh fails nothing is registered and the caller gets
    /// `NotReady`. An existing entry with the same ID is replaced.
    pub async fn setup(
        &self,
        entry_id: &str,
        credentials: Credentials,
    ) -> Result<Arc<Coordinator>, AppError> {
        let coordinator = Arc::new(Coordinator::new(entry_id, self.client.clone(), credentials));

        coordinator
            .refresh()
            .await
            .map_err(|e| AppError::NotReady(format!("{}: {}", entry_id, e)))?;

        let schedule = self.scheduler.schedule(coordinator.clone());
        let replaced = self
            .entries
            .insert(
                entry_id.to_string(),
                Entry {
                    coordinator: coordinator.clone(),
                    _schedule: schedule,
                },
            )
            .is_some();

        tracing::info!(entry_id, replaced, "Entry set up");
        Ok(coordinator)
    }

    /// Stop refreshing an entry and forget it. Returns `false` if unknown.
    pub fn unload(&self, entry_id: &str) -> bool {
        let removed = self.entries.remove(entry_id).is_some();
        if removed {
            tracing::info!(entry_id, "Entry unloaded");
        }
        removed
    }

    pub fn get(&self, entry_id: &str) -> Option<Arc<Coordinator>> {
        self.entries
            .get(entry_id)
            .map(|entry| entry.coordinator.clone())
    }

    /// Sorted entry IDs.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Refresh one entry now.
    pub async fn refresh(&self, entry_id: &str) -> Result<Arc<NutrientTotals>, AppError> {
        let coordinator = self
            .get(entry_id)
            .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;
        Ok(coordinator.refresh().await?)
    }

    /// Refresh every entry now, one after another.
    ///
    /// A failing entry does not stop the others.
    pub async fn refresh_all(&self) -> Vec<(String, PollResult)> {
        // Collect first so no map guard is held across an await
        let coordinators: Vec<Arc<Coordinator>> = self
            .ids()
            .iter()
            .filter_map(|id| self.get(id))
            .collect();

        let mut results = Vec::with_capacity(coordinators.len());
        for coordinator in coordinators {
            let result = coordinator.refresh().await;
            results.push((coordinator.entry_id().to_string(), result));
        }

        tracing::info!(count = results.len(), "Manual refresh of all entries");
        results
    }

    /// Set up one entry per stored credential set. Returns how many came up.
    ///
    /// Entries whose first refresh fails are logged and skipped; they are
    /// retried on the next restart or re-authorization.
    pub async fn restore(&self, store: &dyn CredentialStore) -> Result<usize, AppError> {
        let stored = store.load_all()?;
        let total = stored.len();
        let mut ready = 0;

        for (entry_id, credentials) in stored {
            match self.setup(&entry_id, credentials).await {
                Ok(_) => ready += 1,
                Err(e) => tracing::warn!(entry_id = %entry_id, error = %e, "Entry not ready"),
            }
        }

        tracing::info!(ready, total, "Restored stored entries");
        Ok(ready)
    }
}

