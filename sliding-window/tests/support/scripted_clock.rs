//! A [`Clock`] that replays a fixed sequence of readings, including ones
//! that move backward in time, to exercise the receive-budget clamp.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use sliding_window::Clock;

pub struct ScriptedClock {
    readings: RefCell<VecDeque<Instant>>,
}

impl ScriptedClock {
    /// `offsets_secs` are signed offsets (in seconds) from a fixed base
    /// instant, applied in order on successive `now()` calls. A negative
    /// offset is still a valid `Instant` (earlier than the base); the
    /// engine must not panic when the clock reports going backward.
    pub fn new(offsets_secs: &[i64]) -> Self {
        let base = Instant::now() + Duration::from_secs(3600);
        let readings = offsets_secs
            .iter()
            .map(|&s| {
                if s >= 0 {
                    base + Duration::from_secs(s as u64)
                } else {
                    base - Duration::from_secs((-s) as u64)
                }
            })
            .collect();
        Self {
            readings: RefCell::new(readings),
        }
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> Instant {
        self.readings
            .borrow_mut()
            .pop_front()
            .expect("scripted clock exhausted: test under-provisioned readings")
    }
}
