// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only numeric sensor exposed per nutrient.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Nutrient, NutrientTotals};

/// Prefix shared by every sensor's unique ID.
pub const SENSOR_ID_PREFIX: &str = "fatsecret";

/// Latest value of one nutrient sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SensorReading {
    /// `fatsecret_<field>`
    pub unique_id: String,
    pub field: String,
    pub name: String,
    pub unit: String,
    /// `None` until the first successful poll
    pub value: Option<f64>,
}

impl SensorReading {
    pub fn new(nutrient: Nutrient, totals: Option<&NutrientTotals>) -> Self {
        Self {
            unique_id: format!("{}_{}", SENSOR_ID_PREFIX, nutrient.key()),
            field: nutrient.key().to_string(),
            name: nutrient.name().to_string(),
            unit: nutrient.unit().to_string(),
            value: totals.map(|t| t.get(nutrient)),
        }
    }
}
