//! Session countdown timers.

pub mod countdown;
pub mod scheduler;
pub mod state;

pub use countdown::CountdownTimer;
pub use scheduler::{MIN_PERIOD, ScheduledTask, Scheduler, TickFn, TickOutcome, TokioScheduler};
pub use state::{SessionTimerState, TimerPhase};
