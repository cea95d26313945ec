// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod credentials;
pub mod nutrients;
pub mod sensor;

pub use credentials::Credentials;
pub use nutrients::{Nutrient, NutrientTotals};
pub use sensor::SensorReading;
