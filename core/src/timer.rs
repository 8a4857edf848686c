use core::time::Duration;
use web_time::Instant;

use crate::Screen;

/// Fixed-deadline countdown, the deadline never moves once armed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    deadline: Instant,
}

impl Countdown {
    pub fn arm(now: Instant, delay: Duration) -> Self {
        Self {
            deadline: now + delay,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn is_elapsed(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }
}

/// Whole seconds left, rounded up, as shown on a countdown label.
pub fn whole_seconds_left(remaining: Duration) -> u64 {
    remaining.as_millis().div_ceil(1000) as u64
}

/// One-shot action that may only fire while its screen is still active.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scheduled<A> {
    action: A,
    due: Instant,
    keyed_to: Screen,
}

impl<A: Copy> Scheduled<A> {
    pub fn new(action: A, now: Instant, delay: Duration, keyed_to: Screen) -> Self {
        Self {
            action,
            due: now + delay,
            keyed_to,
        }
    }

    pub fn action(&self) -> A {
        self.action
    }

    pub fn keyed_to(&self) -> Screen {
        self.keyed_to
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }
}
