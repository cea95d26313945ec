// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sensor and refresh routes.

use crate::error::{AppError, Result};
use crate::models::{Nutrient, NutrientTotals, SensorReading};
use crate::services::{Coordinator, EntryStatus};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/entries", get(list_entries))
        .route("/api/entries/{entry_id}", delete(delete_entry))
        .route("/api/entries/{entry_id}/sensors", get(get_sensors))
        .route("/api/entries/{entry_id}/sensors/{field}", get(get_sensor))
        .route("/api/entries/{entry_id}/refresh", post(refresh_entry))
        .route("/api/refresh", post(refresh_all))
}

fn coordinator(state: &AppState, entry_id: &str) -> Result<Arc<Coordinator>> {
    state
        .entries
        .get(entry_id)
        .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))
}

// ─── Entries ─────────────────────────────────────────────────

async fn list_entries(State(state): State<Arc<AppState>>) -> Json<Vec<EntryStatus>> {
    let statuses = state
        .entries
        .ids()
        .iter()
        .filter_map(|id| state.entries.get(id))
        .map(|c| c.status())
        .collect();
    Json(statuses)
}

/// Unload an entry and forget its credentials.
async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode> {
    let unloaded = state.entries.unload(&entry_id);
    let forgotten = state.store.remove(&entry_id)?;

    if !unloaded && !forgotten {
        return Err(AppError::NotFound(format!("Entry {} not found", entry_id)));
    }

    tracing::info!(entry_id = %entry_id, unloaded, forgotten, "Entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ─── Sensors ─────────────────────────────────────────────────

async fn get_sensors(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<String>,
) -> Result<Json<Vec<SensorReading>>> {
    Ok(Json(coordinator(&state, &entry_id)?.sensors()))
}

async fn get_sensor(
    State(state): State<Arc<AppState>>,
    Path((entry_id, field)): Path<(String, String)>,
) -> Result<Json<SensorReading>> {
    let coordinator = coordinator(&state, &entry_id)?;
    let nutrient = Nutrient::from_key(&field)
        .ok_or_else(|| AppError::NotFound(format!("Unknown sensor {}", field)))?;
    Ok(Json(coordinator.sensor(nutrient)))
}

// ─── Manual refresh ──────────────────────────────────────────

async fn refresh_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<String>,
) -> Result<Json<NutrientTotals>> {
    let totals = state.entries.refresh(&entry_id).await?;
    Ok(Json(*totals))
}

/// Outcome of refreshing one entry.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RefreshResult {
    pub entry_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Refresh every entry. Always 200; per-entry failures are in the body.
async fn refresh_all(State(state): State<Arc<AppState>>) -> Json<Vec<RefreshResult>> {
    let results = state
        .entries
        .refresh_all()
        .await
        .into_iter()
        .map(|(entry_id, result)| RefreshResult {
            entry_id,
            success: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        })
        .collect();
    Json(results)
}
