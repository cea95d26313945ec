// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FatSecret authorization routes.
//!
//! `/auth/start` obtains a request token and returns the page the user must
//! visit. `/auth/verify` takes the verifier shown on that page, stores the
//! resulting credentials and sets up the entry.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::services::{AuthorizationFlow, PendingFlow, DEFAULT_ENTRY_ID};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/start", post(auth_start))
        .route("/auth/verify", post(auth_verify))
}

/// Random, URL-safe flow identifier.
fn new_flow_id() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Deserialize)]
pub struct AuthStartRequest {
    /// Entry to create; defaults to `default`
    #[serde(default)]
    entry_id: Option<String>,
    /// Falls back to `FATSECRET_CONSUMER_KEY`
    #[serde(default)]
    consumer_key: Option<String>,
    /// Falls back to `FATSECRET_CONSUMER_SECRET`
    #[serde(default)]
    consumer_secret: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthStartResponse {
    pub flow_id: String,
    pub entry_id: String,
    pub authorize_url: String,
}

/// Start authorization: fetch a request token and hand back the approval URL.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AuthStartRequest>, JsonRejection>,
) -> Result<Json<AuthStartResponse>> {
    let Json(req) = payload?;
    let entry_id = req
        .entry_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| DEFAULT_ENTRY_ID.to_string());

    let consumer_key = req
        .consumer_key
        .or_else(|| state.config.consumer_key.clone())
        .unwrap_or_default();
    let consumer_secret = req
        .consumer_secret
        .or_else(|| state.config.consumer_secret.clone())
        .unwrap_or_default();

    let pending = AuthorizationFlow::new(state.client.clone(), &consumer_key, &consumer_secret)
        .map_err(|e| AppError::AuthFailed(e.to_string()))?
        .request_token()
        .await
        .map_err(|e| {
            tracing::warn!(entry_id = %entry_id, error = %e, "Failed to obtain request token");
            AppError::AuthFailed(e.to_string())
        })?;

    let flow_id = new_flow_id();
    let authorize_url = pending.authorize_url();
    state
        .pending_flows
        .insert(flow_id.clone(), PendingFlow::new(entry_id.clone(), pending));

    tracing::info!(entry_id = %entry_id, "Authorization started");

    Ok(Json(AuthStartResponse {
        flow_id,
        entry_id,
        authorize_url,
    }))
}

#[derive(Deserialize)]
pub struct AuthVerifyRequest {
    flow_id: String,
    verifier: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthVerifyResponse {
    pub entry_id: String,
    /// False if credentials were stored but the first refresh failed
    pub ready: bool,
}

/// Complete authorization with the user's verifier.
///
/// A wrong verifier or a failed store write leaves the flow pending so the
/// user can try again.
async fn auth_verify(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AuthVerifyRequest>, JsonRejection>,
) -> Result<Json<AuthVerifyResponse>> {
    let Json(req) = payload?;

    let PendingFlow {
        entry_id,
        authorization,
        ..
    } = state
        .pending_flows
        .get(&req.flow_id)
        .ok_or_else(|| AppError::NotFound("Unknown or expired authorization flow".to_string()))?;

    let credentials = authorization.exchange(&req.verifier).await.map_err(|e| {
        tracing::warn!(entry_id = %entry_id, error = %e, "Verifier exchange failed");
        AppError::AuthFailed(e.to_string())
    })?;

    state.store.put(&entry_id, &credentials)?;
    state.pending_flows.remove(&req.flow_id);

    let ready = match state.entries.setup(&entry_id, credentials).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(entry_id = %entry_id, error = %e, "Authorized entry not ready yet");
            false
        }
    };

    Ok(Json(AuthVerifyResponse { entry_id, ready }))
}
