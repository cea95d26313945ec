// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Periodic refresh scheduling.
//!
//! Every entry is refreshed on a fixed interval and once more just after
//! local midnight, so the sensors reset to the new day's totals without
//! waiting for the next interval tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::DEFAULT_POLL_INTERVAL_MINUTES;
use crate::services::coordinator::Poll;
use crate::time_utils::until_next_midnight;

/// Starts background refreshes for a poll target.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, target: Arc<dyn Poll>) -> ScheduleHandle;
}

/// Background tasks for one entry. Dropping the handle stops them.
#[derive(Default)]
pub struct ScheduleHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl ScheduleHandle {
    pub fn new(tasks: Vec<JoinHandle<()>>) -> Self {
        Self { tasks }
    }

    pub fn is_active(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }

    pub fn cancel(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Time left until the next daily refresh.
pub type MidnightClock = fn() -> Duration;

fn local_midnight() -> Duration {
    until_next_midnight(&chrono::Local::now())
}

/// Interval plus daily-midnight scheduler backed by tokio tasks.
#[derive(Debug, Clone)]
pub struct IntervalScheduler {
    interval: Duration,
    until_midnight: MidnightClock,
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_POLL_INTERVAL_MINUTES * 60))
    }
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            until_midnight: local_midnight,
        }
    }

    /// Replace the local-time midnight computation.
    pub fn with_midnight_clock(mut self, until_midnight: MidnightClock) -> Self {
        self.until_midnight = until_midnight;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule(&self, target: Arc<dyn Poll>) -> ScheduleHandle {
        let interval = self.interval;
        let until_midnight = self.until_midnight;

        // The entry has just been refreshed during setup, so the first tick
        // is one full interval away.
        let periodic = {
            let target = target.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    tracing::debug!(entry_id = target.entry_id(), "Scheduled refresh");
                    // Failures are logged by the poller; the next tick retries
                    let _ = target.poll().await;
                }
            })
        };

        let midnight = tokio::spawn(async move {
            loop {
                let wait = until_midnight();
                tokio::time::sleep(wait).await;
                tracing::info!(entry_id = target.entry_id(), "Midnight refresh");
                let _ = target.poll().await;
            }
        });

        tracing::info!(
            interval_secs = interval.as_secs(),
            "Scheduled periodic FatSecret refresh"
        );

        ScheduleHandle::new(vec![periodic, midnight])
    }
}
