// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod coordinator;
pub mod entries;
pub mod fatsecret;
pub mod oauth;
pub mod scheduler;

pub use auth::{
    AuthorizationFlow, PendingAuthorization, PendingFlow, PendingFlows, MAX_PENDING_FLOWS,
};
pub use coordinator::{Coordinator, EntryStatus, Poll};
pub use entries::{EntryManager, DEFAULT_ENTRY_ID};
pub use fatsecret::{Endpoints, FatSecretClient};
pub use scheduler::{IntervalScheduler, MidnightClock, ScheduleHandle, Scheduler};
