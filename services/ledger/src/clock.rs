//! Injected time source
//!
//! Services never read system time directly; they hold a `Clock` so that
//! offer expiry and windowed statistics are testable with a manually
//! advanced clock.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// A shared time source.
///
/// Cloning yields a handle to the same underlying clock: advancing one
/// manual handle advances them all.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Wall-clock time.
    System,
    /// Manually controlled time for tests and replay.
    Manual(Arc<Mutex<DateTime<Utc>>>),
}

impl Clock {
    /// A wall-clock time source.
    pub fn system() -> Self {
        Clock::System
    }

    /// A manual clock starting at `start`.
    pub fn manual(start: DateTime<Utc>) -> Self {
        Clock::Manual(Arc::new(Mutex::new(start)))
    }

    /// Current time.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Manual(current) => *lock_current(current),
        }
    }

    /// Advance a manual clock by `delta`.
    ///
    /// # Panics
    /// Panics on a system clock or a negative delta.
    pub fn advance(&self, delta: Duration) {
        assert!(delta >= Duration::zero(), "Clock cannot go backward");
        match self {
            Clock::System => panic!("advance() requires a manual clock"),
            Clock::Manual(current) => {
                let mut guard = lock_current(current);
                *guard += delta;
            }
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}

// A poisoned clock mutex only means another thread panicked between lock and
// unlock of a plain timestamp; the value itself is always valid.
fn lock_current(current: &Mutex<DateTime<Utc>>) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
    match current.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
