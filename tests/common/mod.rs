// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fatsecret_tracker::config::Config;
use fatsecret_tracker::db::{CredentialStore, MemoryStore};
use fatsecret_tracker::models::Credentials;
use fatsecret_tracker::routes::create_router;
use fatsecret_tracker::services::{Endpoints, FatSecretClient, IntervalScheduler};
use fatsecret_tracker::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FOOD_ENTRIES_PATH: &str = "/rest/food-entries/v2";

/// Credentials matching what the mocks expect.
#[allow(dead_code)]
pub fn test_credentials() -> Credentials {
    Credentials {
        consumer_key: "test_consumer_key".to_string(),
        consumer_secret: "test_consumer_secret".to_string(),
        access_token: "access_token".to_string(),
        access_token_secret: "access_secret".to_string(),
    }
}

/// Client pointed at the mock server for both hosts.
#[allow(dead_code)]
pub fn test_client(server: &MockServer) -> FatSecretClient {
    let uri = server.uri();
    let endpoints = Endpoints::with_bases(Some(uri.as_str()), Some(uri.as_str()));
    FatSecretClient::new(endpoints, Duration::from_secs(2)).expect("client should build")
}

/// A food-entries body with the given entries.
#[allow(dead_code)]
pub fn food_entries(entries: Value) -> Value {
    json!({ "food_entries": { "food_entry": entries } })
}

/// Serve `body` from the food-entries endpoint.
#[allow(dead_code)]
pub async fn mount_food_entries(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(FOOD_ENTRIES_PATH))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Test config with both FatSecret hosts pointed at the mock server.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::test_default();
    config.auth_base_url = Some(server.uri());
    config.api_base_url = Some(server.uri());
    config
}

/// Create a test app talking to the mock server, with in-memory storage.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    create_test_app_with(test_config(server), Arc::new(MemoryStore::new()))
}

/// Create a test app from an explicit config and credential store.
#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    store: Arc<dyn CredentialStore>,
) -> (axum::Router, Arc<AppState>) {
    // Long enough that no scheduled refresh fires during a test
    let scheduler = Arc::new(IntervalScheduler::new(Duration::from_secs(3600)));
    let state = Arc::new(AppState::new(config, store, scheduler).expect("state should build"));

    (create_router(state.clone()), state)
}
