// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nutrient fields and per-poll totals.
//!
//! Totals are recomputed from scratch on every poll. Nothing here accumulates
//! across polls.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Key of the entries wrapper object in a food-entries response.
pub const FOOD_ENTRIES: &str = "food_entries";
/// Key of the entry list inside the wrapper.
pub const FOOD_ENTRY: &str = "food_entry";

/// A nutrient reported on FatSecret food entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Calories,
    Protein,
    Fat,
    Fiber,
    Sugar,
    Carbohydrate,
    Cholesterol,
    Iron,
    Calcium,
    MonounsaturatedFat,
    PolyunsaturatedFat,
    SaturatedFat,
    Potassium,
    Sodium,
    VitaminA,
    VitaminC,
}

impl Nutrient {
    /// Every nutrient, in sensor order.
    pub const ALL: [Nutrient; 16] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Fiber,
        Nutrient::Sugar,
        Nutrient::Carbohydrate,
        Nutrient::Cholesterol,
        Nutrient::Iron,
        Nutrient::Calcium,
        Nutrient::MonounsaturatedFat,
        Nutrient::PolyunsaturatedFat,
        Nutrient::SaturatedFat,
        Nutrient::Potassium,
        Nutrient::Sodium,
        Nutrient::VitaminA,
        Nutrient::VitaminC,
    ];

    /// Field name in the food-entry JSON.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
            Nutrient::Sugar => "sugar",
            Nutrient::Carbohydrate => "carbohydrate",
            Nutrient::Cholesterol => "cholesterol",
            Nutrient::Iron => "iron",
            Nutrient::Calcium => "calcium",
            Nutrient::MonounsaturatedFat => "monounsaturated_fat",
            Nutrient::PolyunsaturatedFat => "polyunsaturated_fat",
            Nutrient::SaturatedFat => "saturated_fat",
            Nutrient::Potassium => "potassium",
            Nutrient::Sodium => "sodium",
            Nutrient::VitaminA => "vitamin_a",
            Nutrient::VitaminC => "vitamin_c",
        }
    }

    /// Human-readable sensor name.
    pub fn name(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::Protein => "Protein",
            Nutrient::Fat => "Fat",
            Nutrient::Fiber => "Fiber",
            Nutrient::Sugar => "Sugar",
            Nutrient::Carbohydrate => "Carbohydrate",
            Nutrient::Cholesterol => "Cholesterol",
            Nutrient::Iron => "Iron",
            Nutrient::Calcium => "Calcium",
            Nutrient::MonounsaturatedFat => "Monounsaturated Fat",
            Nutrient::PolyunsaturatedFat => "Polyunsaturated Fat",
            Nutrient::SaturatedFat => "Saturated Fat",
            Nutrient::Potassium => "Potassium",
            Nutrient::Sodium => "Sodium",
            Nutrient::VitaminA => "Vitamin A",
            Nutrient::VitaminC => "Vitamin C",
        }
    }

    /// Display unit of measurement.
    pub fn unit(self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            Nutrient::Protein
            | Nutrient::Fat
            | Nutrient::Fiber
            | Nutrient::Sugar
            | Nutrient::Carbohydrate
            | Nutrient::MonounsaturatedFat
            | Nutrient::PolyunsaturatedFat
            | Nutrient::SaturatedFat => "g",
            Nutrient::Cholesterol
            | Nutrient::Iron
            | Nutrient::Calcium
            | Nutrient::Potassium
            | Nutrient::Sodium
            | Nutrient::VitaminC => "mg",
            Nutrient::VitaminA => "µg",
        }
    }

    /// Look up a nutrient by its JSON field name.
    pub fn from_key(key: &str) -> Option<Nutrient> {
        Nutrient::ALL.into_iter().find(|n| n.key() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Summed nutrient values for one poll. Every nutrient is always present.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutrientTotals {
    values: [f64; 16],
}

impl NutrientTotals {
    /// Total for one nutrient.
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.values[nutrient.index()]
    }

    /// `(nutrient, total)` pairs in `Nutrient::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        Nutrient::ALL.into_iter().map(|n| (n, self.get(n)))
    }

    /// Sum the known nutrient fields across food entries.
    ///
    /// Missing, null and empty values count as zero. Values that are not
    /// numeric are logged and also count as zero; they never abort the sum.
    /// Non-object entries and unknown fields are ignored.
    pub fn from_entries(entries: &[Value]) -> Self {
        let mut totals = Self::default();

        for entry in entries {
            let Some(fields) = entry.as_object() else {
                tracing::debug!(entry = %entry, "Skipping non-object food entry");
                continue;
            };

            for nutrient in Nutrient::ALL {
                match fields.get(nutrient.key()).map(parse_amount) {
                    Some(Ok(amount)) => totals.values[nutrient.index()] += amount,
                    Some(Err(raw)) => {
                        tracing::debug!(
                            field = nutrient.key(),
                            value = %raw,
                            "Invalid value for field"
                        );
                    }
                    None => {}
                }
            }
        }

        totals
    }

    /// Extract `food_entries.food_entry` from a response body and sum it.
    ///
    /// A missing or null wrapper means no entries. A single object instead of
    /// a list is treated as a one-entry list.
    pub fn from_response(body: &Value) -> Self {
        match body.get(FOOD_ENTRIES).and_then(|e| e.get(FOOD_ENTRY)) {
            Some(Value::Array(entries)) => Self::from_entries(entries),
            Some(entry @ Value::Object(_)) => Self::from_entries(std::slice::from_ref(entry)),
            _ => Self::default(),
        }
    }
}

/// Parse one field value. `Err` carries the rejected raw value for logging.
fn parse_amount(value: &Value) -> Result<f64, &Value> {
    let parsed = match value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).ok_or(value)
}

impl Serialize for NutrientTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Nutrient::ALL.len()))?;
        for (nutrient, value) in self.iter() {
            map.serialize_entry(nutrient.key(), &value)?;
        }
        map.end()
    }
}
