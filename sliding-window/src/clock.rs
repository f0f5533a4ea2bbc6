//! Injectable time source for the engine.
//!
//! The engine never calls `Instant::now()` directly. Every reading of "now"
//! goes through a `Clock`, so tests can script a sequence of readings
//! (including ones that go backwards) without sleeping in real time.

use std::time::{Duration, Instant};

/// A source of monotonic-ish time.
///
/// Implementations are not required to be monotonic: the engine clamps
/// every duration it derives from `now()` to a non-negative range, so a
/// clock that occasionally goes backwards cannot produce an invalid
/// receive budget (see [`crate::engine::WindowEngine`]).
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The default clock, backed by `std::time::Instant::now()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clamp `deadline - now` into `[0, timeout]`.
///
/// This is the one piece of arithmetic the spec calls out as
/// previously buggy (an older version computed the unclamped,
/// occasionally-negative `timeout - (now - deadline)`). Kept as a free
/// function so both the engine and its tests can exercise it directly.
pub(crate) fn receive_budget(deadline: Instant, now: Instant, timeout: Duration) -> Duration {
    if deadline <= now {
        Duration::ZERO
    } else {
        (deadline - now).min(timeout)
    }
}
