use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Monotonic time source for tick scheduling and blend intervals
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

/// Reads `Instant::now()`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut elapsed = match self.elapsed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *elapsed += duration;
    }

    pub fn elapsed(&self) -> Duration {
        match self.elapsed.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}

/// Rings once `duration` has passed since the last reset
#[derive(Clone, Debug)]
pub struct Timer {
    duration: Duration,
    last: Instant,
}

impl Timer {
    pub fn new(duration: Duration, now: Instant) -> Self {
        Self {
            duration,
            last: now,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn ringing(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last) >= self.duration
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    pub fn next_ring(&self) -> Instant {
        self.last + self.duration
    }
}
