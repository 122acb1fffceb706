//! Change-notification debouncer.
//!
//! Coalesces bursts of external change signals into one triggered action:
//! the first signal arms a deadline, further signals inside the window
//! fold into it, and `due()` reports once when the deadline passes.

use chrono::{DateTime, Duration, Utc};

/// Calendar-change bursts inside this window coalesce into one sync.
pub fn default_window() -> Duration {
    Duration::seconds(3)
}

/// Time source boundary so the debouncer can run against a fake clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct Debouncer<C: Clock = SystemClock> {
    window: Duration,
    deadline: Option<DateTime<Utc>>,
    clock: C,
}

impl Debouncer<SystemClock> {
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, SystemClock)
    }
}

impl<C: Clock> Debouncer<C> {
    pub fn with_clock(window: Duration, clock: C) -> Self {
        Self {
            window,
            deadline: None,
            clock,
        }
    }

    /// Record one change signal. The first signal of a burst arms the
    /// deadline; later ones inside the window share it.
    pub fn signal(&mut self) {
        if self.deadline.is_none() {
            self.deadline = Some(self.clock.now() + self.window);
        }
    }

    /// True once per armed deadline, after it passes.
    pub fn due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }
}
