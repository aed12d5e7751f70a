//! Scheduling capability for recurring work.
//!
//! The countdown never spawns tasks itself; it asks a `Scheduler` to run a
//! tick callback every period and keeps the returned `ScheduledTask` so it
//! can stop the recurrence later.

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};

/// What a recurring callback wants after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Stop,
}

/// Shortest period `TokioScheduler` runs at; `interval` panics on zero.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

pub type TickFn = Box<dyn FnMut() -> TickOutcome + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Run `tick` every `period`, first after one full period, until it
    /// returns `TickOutcome::Stop` or the returned task is cancelled.
    ///
    /// Implementations must not invoke `tick` before returning.
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> ScheduledTask;
}

/// Handle to a scheduled recurrence.
///
/// Dropping the handle leaves the recurrence running; call `cancel`.
pub struct ScheduledTask {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl ScheduledTask {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop future runs. A run already in progress is not interrupted.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Runs each recurrence as a tokio task driven by `tokio::time::interval`.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler bound to the runtime of the calling context.
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&self, period: Duration, mut tick: TickFn) -> ScheduledTask {
        let period = period.max(MIN_PERIOD);
        let first = Instant::now() + period;
        let task = self.handle.spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tick() == TickOutcome::Stop {
                    break;
                }
            }
        });
        let abort = task.abort_handle();
        ScheduledTask::new(move || abort.abort())
    }
}
