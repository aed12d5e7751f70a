/// Coarse lifecycle of a session timer: `Idle -> Running -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
}

/// Countdown state of one session.
///
/// `generation` is bumped on every (re)start. A scheduled tick carries the
/// generation it was scheduled for and is discarded if that no longer matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimerState {
    pub session_id: String,
    pub remaining_seconds: u32,
    pub running: bool,
    pub generation: u64,
}

impl SessionTimerState {
    pub fn idle(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            remaining_seconds: 0,
            running: false,
            generation: 0,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        if self.running {
            TimerPhase::Running
        } else {
            TimerPhase::Idle
        }
    }

    /// Whether a tick scheduled for `generation` may still act on this state.
    pub fn accepts(&self, generation: u64) -> bool {
        self.running && self.generation == generation
    }
}
