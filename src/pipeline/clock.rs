use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of wall-clock instants for the scheduler
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Monotonic system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock. Every call to `now` returns the current instant and then
/// advances it by `step`. Clones share the same time line.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Rc<Cell<Instant>>,
    step: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            current: Rc::new(Cell::new(Instant::now())),
            step: Duration::ZERO,
        }
    }
    /// Builder pattern to set automatic advance per reading
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }
    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let now = self.current.get();
        self.current.set(now + self.step);
        now
    }
}
