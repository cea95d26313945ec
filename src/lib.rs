// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FatSecret tracker: daily nutrition totals as sensors
//!
//! This crate authorizes FatSecret accounts over OAuth 1.0a, polls each
//! account's food diary for today, and exposes the summed nutrients as
//! read-only sensors over HTTP.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::CredentialStore;
use error::FatSecretError;
use services::{
    Endpoints, EntryManager, FatSecretClient, PendingFlows, Scheduler, MAX_PENDING_FLOWS,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn CredentialStore>,
    pub client: FatSecretClient,
    pub entries: EntryManager,
    /// Authorizations waiting for a verifier, keyed by flow ID. Memory only.
    pub pending_flows: PendingFlows,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn CredentialStore>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, FatSecretError> {
        let endpoints = Endpoints::with_bases(
            config.auth_base_url.as_deref(),
            config.api_base_url.as_deref(),
        );
        let client = FatSecretClient::new(endpoints, config.http_timeout)?;
        let entries = EntryManager::new(client.clone(), scheduler);
        let pending_flows = PendingFlows::new(config.auth_flow_ttl, MAX_PENDING_FLOWS);

        Ok(Self {
            config,
            store,
            client,
            entries,
            pending_flows,
        })
    }
}
