// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-entry polling state.
//!
//! A `Coordinator` owns one entry's credentials and the most recent totals.
//! Each refresh replaces the totals wholesale. A failed refresh leaves the
//! previous totals in place, so sensors keep reporting stale values until the
//! next success.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::FatSecretError;
use crate::models::{Credentials, Nutrient, NutrientTotals, SensorReading};
use crate::services::fatsecret::FatSecretClient;
use crate::time_utils::format_utc_rfc3339;

pub type PollResult = Result<Arc<NutrientTotals>, FatSecretError>;
pub type PollFuture<'a> = Pin<Box<dyn Future<Output = PollResult> + Send + 'a>>;

/// Something a scheduler can ask to refresh.
pub trait Poll: Send + Sync {
    fn entry_id(&self) -> &str;

    /// Run one refresh. Implementations log their own failures.
    fn poll(&self) -> PollFuture<'_>;
}

#[derive(Default)]
struct PollState {
    totals: Option<Arc<NutrientTotals>>,
    last_success: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Snapshot of an entry for the API.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EntryStatus {
    pub entry_id: String,
    /// RFC3339 time of the last successful refresh
    pub last_success: Option<String>,
    /// Error from the most recent refresh, cleared on success
    pub last_error: Option<String>,
}

pub struct Coordinator {
    entry_id: String,
    client: FatSecretClient,
    credentials: Credentials,
    state: RwLock<PollState>,
}

impl Coordinator {
    pub fn new(entry_id: &str, client: FatSecretClient, credentials: Credentials) -> Self {
        Self {
            entry_id: entry_id.to_string(),
            client,
            credentials,
            state: RwLock::new(PollState::default()),
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    // Writers never panic while holding the lock, so poisoning is ignored
    fn read(&self) -> RwLockReadGuard<'_, PollState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, PollState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch today's totals and publish them.
    ///
    /// Concurrent refreshes are not serialized; whichever finishes last wins.
    pub async fn refresh(&self) -> PollResult {
        match self.client.fetch_totals(&self.credentials).await {
            Ok(totals) => {
                let totals = Arc::new(totals);
                let mut state = self.write();
                state.totals = Some(totals.clone());
                state.last_success = Some(Utc::now());
                state.last_error = None;

                tracing::info!(
                    entry_id = %self.entry_id,
                    calories = totals.get(Nutrient::Calories),
                    "Refreshed FatSecret totals"
                );
                Ok(totals)
            }
            Err(e) => {
                tracing::error!(
                    entry_id = %self.entry_id,
                    error = %e,
                    "Error fetching FatSecret data"
                );
                self.write().last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Most recent successful totals, if any refresh has succeeded.
    pub fn latest(&self) -> Option<Arc<NutrientTotals>> {
        self.read().totals.clone()
    }

    /// One reading per nutrient, in `Nutrient::ALL` order.
    pub fn sensors(&self) -> Vec<SensorReading> {
        let totals = self.latest();
        Nutrient::ALL
            .into_iter()
            .map(|n| SensorReading::new(n, totals.as_deref()))
            .collect()
    }

    pub fn sensor(&self, nutrient: Nutrient) -> SensorReading {
        SensorReading::new(nutrient, self.latest().as_deref())
    }

    pub fn status(&self) -> EntryStatus {
        let state = self.read();
        EntryStatus {
            entry_id: self.entry_id.clone(),
            last_success: state.last_success.map(format_utc_rfc3339),
            last_error: state.last_error.clone(),
        }
    }
}

impl Poll for Coordinator {
    fn entry_id(&self) -> &str {
        &self.entry_id
    }

    fn poll(&self) -> PollFuture<'_> {
        Box::pin(self.refresh())
    }
}
