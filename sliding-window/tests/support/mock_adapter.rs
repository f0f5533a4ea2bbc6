//! Deterministic in-memory `ProtocolAdapter` test double.
//!
//! Plays the role of `tests/helper.py::Protocol` in the Python original:
//! records every `send`, and lets a test script drive what `recv` reports
//! (an ack for a specific tag, or a timeout), independent of which tag the
//! engine actually expects next.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::time::Duration;

use sliding_window::{ProtocolAdapter, RecvError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u64);

#[derive(Debug, Clone)]
pub enum Step {
    Ack(Tag),
    Timeout,
}

pub struct MockAdapter<P> {
    next_tag: u64,
    pub sent: Vec<(Tag, P)>,
    script: VecDeque<Step>,
    pub observed_budgets: RefCell<Vec<Duration>>,
    acks_consumed: usize,
    max_in_flight: usize,
}

impl<P: Clone> MockAdapter<P> {
    pub fn new() -> Self {
        Self {
            next_tag: 0,
            sent: Vec::new(),
            script: VecDeque::new(),
            observed_budgets: RefCell::new(Vec::new()),
            acks_consumed: 0,
            max_in_flight: 0,
        }
    }

    /// The largest `sends - acks` observed at any point during the run:
    /// the peak number of entries concurrently in flight.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn with_script(script: Vec<Step>) -> Self {
        Self {
            script: script.into(),
            ..Self::new()
        }
    }

    pub fn sent_payloads(&self) -> Vec<P> {
        self.sent.iter().map(|(_, p)| p.clone()).collect()
    }
}

impl<P: Clone> ProtocolAdapter for MockAdapter<P> {
    type Payload = P;
    type Tag = Tag;
    type Error = Infallible;

    fn send(&mut self, payload: &P) -> Result<Tag, Infallible> {
        let tag = Tag(self.next_tag);
        self.next_tag += 1;
        self.sent.push((tag, payload.clone()));
        let in_flight = self.sent.len() - self.acks_consumed;
        self.max_in_flight = self.max_in_flight.max(in_flight);
        Ok(tag)
    }

    fn recv(&mut self, timeout: Duration) -> Result<Tag, RecvError<Infallible>> {
        self.observed_budgets.borrow_mut().push(timeout);
        match self.script.pop_front() {
            Some(Step::Ack(tag)) => {
                self.acks_consumed += 1;
                Ok(tag)
            }
            Some(Step::Timeout) | None => Err(RecvError::Timeout),
        }
    }
}

/// An adapter that never acknowledges anything: every `recv` times out.
/// A thin convenience over `MockAdapter::with_script(vec![])`, for
/// readability at call sites testing total-loss behavior.
pub fn lossy<P: Clone>() -> MockAdapter<P> {
    MockAdapter::new()
}
