//! Per-session countdown engine.
//!
//! Each running session maps to its own `SessionTimer` behind its own mutex.
//! Every read or write of a session's countdown (remaining seconds, running
//! flag, generation and the scheduled recurrence) happens while holding that
//! mutex, and so does publishing the resulting tick. A restart therefore
//! cancels the old recurrence, takes a fresh generation and installs the new
//! recurrence in one critical section; a tick of the previous generation
//! that was already in flight takes the lock afterwards, sees the mismatch
//! and returns without touching state or publishing anything.
//!
//! A session entry lives only while its countdown runs. Expiry and cancel
//! retire the entry and drop it from the map; a `start` that raced the
//! retirement sees the `retired` flag and retries on a fresh entry.
//! Generations come from one counter shared by all sessions, so a re-created
//! entry never reuses a generation an old tick could still carry.
//!
//! Lock order: the map lock is never held while waiting for a session lock.
//! A session lock may be held while briefly taking the map lock to retire
//! itself. Publishing takes the broker's registry lock while a session lock
//! is held; the broker never calls back into timers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::broker::{Broadcaster, Channel, Payload, topic_for};
use crate::config::TimerSettings;
use crate::timer::scheduler::{ScheduledTask, Scheduler, TickOutcome};
use crate::timer::state::SessionTimerState;
use crate::utils::Result;

type SessionEntry = Arc<Mutex<SessionTimer>>;

#[derive(Debug)]
struct SessionTimer {
    state: SessionTimerState,
    task: Option<ScheduledTask>,
    retired: bool,
}

impl SessionTimer {
    fn new(session_id: &str) -> Self {
        Self {
            state: SessionTimerState::idle(session_id),
            task: None,
            retired: false,
        }
    }

    /// Stops the recurrence and marks the timer idle. Returns whether it was running.
    fn halt(&mut self) -> bool {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
        std::mem::replace(&mut self.state.running, false)
    }
}

struct Shared {
    broadcaster: Arc<dyn Broadcaster>,
    scheduler: Arc<dyn Scheduler>,
    settings: TimerSettings,
    sessions: Mutex<HashMap<String, SessionEntry>>,
    generations: AtomicU64,
}

impl Shared {
    fn session(&self, session_id: &str) -> SessionEntry {
        self.sessions
            .lock()
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionTimer::new(session_id))))
            .clone()
    }

    fn existing_session(&self, session_id: &str) -> Option<SessionEntry> {
        self.sessions.lock().get(session_id).cloned()
    }

    /// Marks `timer` dead and drops `entry` from the map if it is still the
    /// current entry for `session_id`. Called with `entry` locked as `timer`.
    fn retire(&self, session_id: &str, entry: &SessionEntry, timer: &mut SessionTimer) {
        timer.retired = true;
        let mut sessions = self.sessions.lock();
        if sessions
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, entry))
        {
            sessions.remove(session_id);
        }
    }

    fn tick(&self, session_id: &str, generation: u64) -> TickOutcome {
        let Some(entry) = self.existing_session(session_id) else {
            debug!(session_id, generation, "discarding tick for retired session");
            return TickOutcome::Stop;
        };
        let mut timer = entry.lock();

        if timer.retired || !timer.state.accepts(generation) {
            debug!(
                session_id,
                generation,
                current = timer.state.generation,
                "discarding stale tick"
            );
            return TickOutcome::Stop;
        }

        timer.state.remaining_seconds = timer.state.remaining_seconds.saturating_sub(1);
        let remaining = timer.state.remaining_seconds;
        debug!(session_id, generation, remaining, "tick");
        self.broadcaster
            .publish(&topic_for(session_id, Channel::Timer), Payload::Tick(remaining));

        if remaining > 0 {
            return TickOutcome::Continue;
        }

        // returning Stop ends the recurrence, nothing to cancel
        timer.task = None;
        timer.state.running = false;
        self.broadcaster.publish(
            &topic_for(session_id, Channel::TimerNotification),
            Payload::expired(),
        );
        self.retire(session_id, &entry, &mut timer);
        info!(session_id, generation, "countdown expired");
        TickOutcome::Stop
    }
}

/// Countdown timers for any number of sessions.
///
/// Cloning is cheap and every clone drives the same set of timers.
#[derive(Clone)]
pub struct CountdownTimer {
    shared: Arc<Shared>,
}

impl CountdownTimer {
    /// Fails with `Error::InvalidConfig` if `settings` has a zero start value
    /// or tick interval.
    pub fn new(
        broadcaster: Arc<dyn Broadcaster>,
        scheduler: Arc<dyn Scheduler>,
        settings: TimerSettings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                broadcaster,
                scheduler,
                settings,
                sessions: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        })
    }

    /// Starts the countdown for `session_id`, superseding a running one.
    ///
    /// Returns the generation of the new countdown.
    pub fn start(&self, session_id: &str) -> u64 {
        loop {
            let entry = self.shared.session(session_id);
            let mut timer = entry.lock();
            if timer.retired {
                // retired while we waited; it is gone from the map now
                continue;
            }

            let superseded = timer.halt();
            let generation = self.shared.generations.fetch_add(1, Ordering::SeqCst) + 1;
            timer.state.generation = generation;
            timer.state.remaining_seconds = self.shared.settings.start_seconds;
            timer.state.running = true;

            let shared: Weak<Shared> = Arc::downgrade(&self.shared);
            let sid = session_id.to_string();
            let task = self.shared.scheduler.schedule_repeating(
                self.shared.settings.tick_interval(),
                Box::new(move || match shared.upgrade() {
                    Some(shared) => shared.tick(&sid, generation),
                    None => TickOutcome::Stop,
                }),
            );
            timer.task = Some(task);

            info!(
                session_id,
                generation,
                superseded,
                start_seconds = self.shared.settings.start_seconds,
                "countdown started"
            );
            return generation;
        }
    }

    /// Stops the countdown for `session_id` without publishing anything.
    ///
    /// Returns `false` if no countdown was running.
    pub fn cancel(&self, session_id: &str) -> bool {
        let Some(entry) = self.shared.existing_session(session_id) else {
            return false;
        };
        let mut timer = entry.lock();
        if timer.retired {
            return false;
        }
        let was_running = timer.halt();
        self.shared.retire(session_id, &entry, &mut timer);
        if was_running {
            info!(
                session_id,
                generation = timer.state.generation,
                remaining = timer.state.remaining_seconds,
                "countdown cancelled"
            );
        }
        was_running
    }

    /// State of the running countdown for `session_id`, if any.
    pub fn snapshot(&self, session_id: &str) -> Option<SessionTimerState> {
        let entry = self.shared.existing_session(session_id)?;
        let timer = entry.lock();
        (!timer.retired).then(|| timer.state.clone())
    }

    /// Number of sessions with a live entry.
    pub fn session_count(&self) -> usize {
        self.shared.sessions.lock().len()
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.shared.settings
    }
}
