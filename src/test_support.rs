//! Deterministic stand-ins for the broadcaster and scheduler capabilities.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::{Broadcaster, Payload};
use crate::timer::{ScheduledTask, Scheduler, TickFn, TickOutcome};

/// Records every publish instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingBroadcaster {
    published: Mutex<Vec<(String, Payload)>>,
}

impl RecordingBroadcaster {
    pub fn published(&self) -> Vec<(String, Payload)> {
        self.published.lock().clone()
    }

    pub fn on_topic(&self, topic: &str) -> Vec<Payload> {
        self.published
            .lock()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Remaining-seconds values published on `topic`.
    pub fn ticks(&self, topic: &str) -> Vec<u32> {
        self.on_topic(topic)
            .into_iter()
            .filter_map(|p| match p {
                Payload::Tick(n) => Some(n),
                _ => None,
            })
            .collect()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn publish(&self, topic: &str, payload: Payload) {
        self.published.lock().push((topic.to_string(), payload));
    }
}

struct ManualTask {
    period: Duration,
    tick: Arc<Mutex<TickFn>>,
    cancelled: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

/// Scheduler whose recurrences only run when a test fires them.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<Vec<ManualTask>>,
}

impl ManualScheduler {
    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn period(&self, index: usize) -> Duration {
        self.tasks.lock()[index].period
    }

    pub fn is_cancelled(&self, index: usize) -> bool {
        self.tasks.lock()[index].cancelled.load(Ordering::SeqCst)
    }

    /// Runs task `index` once even if it was cancelled, the way a tick that
    /// was already executing when `cancel` ran would.
    pub fn fire(&self, index: usize) -> TickOutcome {
        let (tick, finished) = {
            let tasks = self.tasks.lock();
            (tasks[index].tick.clone(), tasks[index].finished.clone())
        };
        let outcome = {
            let mut f = tick.lock();
            (*f)()
        };
        if outcome == TickOutcome::Stop {
            finished.store(true, Ordering::SeqCst);
        }
        outcome
    }

    /// Runs every task that is neither cancelled nor finished, once.
    pub fn advance(&self) {
        let live: Vec<usize> = {
            let tasks = self.tasks.lock();
            (0..tasks.len())
                .filter(|&i| {
                    !tasks[i].cancelled.load(Ordering::SeqCst)
                        && !tasks[i].finished.load(Ordering::SeqCst)
                })
                .collect()
        };
        for index in live {
            self.fire(index);
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&self, period: Duration, tick: TickFn) -> ScheduledTask {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.tasks.lock().push(ManualTask {
            period,
            tick: Arc::new(Mutex::new(tick)),
            cancelled: cancelled.clone(),
            finished: Arc::new(AtomicBool::new(false)),
        });
        ScheduledTask::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}

/// A broadcast frame as a client reads it.
#[derive(Debug, Deserialize)]
pub struct Delivered {
    pub topic: String,
    pub payload: Value,
    pub timestamp: i64,
}

impl Delivered {
    pub fn from_frame(frame: &WsMessage) -> Self {
        match frame {
            WsMessage::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("Expected a text message, got {other:?}"),
        }
    }
}
