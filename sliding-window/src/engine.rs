//! The sliding-window engine itself: burst, then steady-state recv/resend.
//!
//! This is a synchronous re-expression of `sliding.py::SlidingWindow.run`,
//! generalized from its `OrderedDict`-backed window to the
//! [`crate::window::Window`] abstraction and from a bare `clock` callable
//! to the [`crate::clock::Clock`] trait.

use std::collections::HashSet;
use std::time::Duration;

use crate::adapter::{ProtocolAdapter, RecvError};
use crate::clock::{receive_budget, Clock, SystemClock};
use crate::error::{ConfigurationError, RunError};
use crate::window::{Window, WindowEntry};

/// How the engine treats an acknowledgement whose tag is not in the
/// current window and not a recently-retired tag.
///
/// The source implementation's most recent version uses `Lenient`; an
/// earlier version used `Strict`. Both are kept: `Lenient` is the
/// default because real transports routinely deliver late acks after a
/// retransmission, but `Strict` remains useful for tests that want to
/// assert no stray acknowledgements occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnexpectedResponsePolicy {
    #[default]
    Lenient,
    Strict,
}

/// Immutable engine configuration, validated once at construction.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Window size `W`. Must be `>= 1`.
    pub size: usize,
    /// Additional retransmissions permitted per payload before failing.
    pub max_retrans: u32,
    /// How long to wait for an ack before retransmitting.
    pub timeout: Duration,
    /// How to handle acks for tags outside the current window.
    pub unexpected_response_policy: UnexpectedResponsePolicy,
}

impl EngineConfig {
    /// Construct and validate a configuration in one step.
    pub fn new(
        size: usize,
        max_retrans: u32,
        timeout: Duration,
    ) -> Result<Self, ConfigurationError> {
        let config = Self {
            size,
            max_retrans,
            timeout,
            unexpected_response_policy: UnexpectedResponsePolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_policy(mut self, policy: UnexpectedResponsePolicy) -> Self {
        self.unexpected_response_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.size < 1 {
            return Err(ConfigurationError::ZeroWindowSize);
        }
        Ok(())
    }
}

/// Drives a bounded in-flight set, a caller-supplied payload sequence, and
/// a [`ProtocolAdapter`] to completion: every payload acknowledged, or the
/// run fails with a well-defined error.
///
/// Generic over the clock so tests can substitute a scripted time source;
/// [`WindowEngine::with_system_clock`] covers the common case.
pub struct WindowEngine<A: ProtocolAdapter, C: Clock = SystemClock> {
    config: EngineConfig,
    adapter: A,
    clock: C,
}

impl<A: ProtocolAdapter> WindowEngine<A, SystemClock> {
    pub fn with_system_clock(config: EngineConfig, adapter: A) -> Result<Self, ConfigurationError> {
        Self::new(config, adapter, SystemClock)
    }
}

impl<A: ProtocolAdapter, C: Clock> WindowEngine<A, C> {
    pub fn new(config: EngineConfig, adapter: A, clock: C) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            config,
            adapter,
            clock,
        })
    }

    /// Borrow the underlying adapter, e.g. to inspect its send log after a
    /// `run` (successful or not) for diagnostics or tests.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Consume the engine, recovering the adapter.
    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// Execute one transmission of `payloads` to completion.
    ///
    /// Consumes `payloads` lazily: entries beyond the current window are
    /// never drawn from the sequence, so an infinite-prefix iterator is
    /// fine as long as the window bound holds.
    pub fn run<I>(&mut self, payloads: I) -> Result<(), RunError<A::Error>>
    where
        I: IntoIterator<Item = A::Payload>,
    {
        let mut payloads = payloads.into_iter();
        let mut window: Window<A::Tag, A::Payload> = Window::new();
        let mut retired: HashSet<A::Tag> = HashSet::new();

        // Phase 1: initial burst, up to `size` sends.
        for _ in 0..self.config.size {
            match self.send_one(&mut payloads, self.config.max_retrans)? {
                Some((tag, entry)) => window.insert(tag, entry),
                None => break,
            }
        }

        // Phase 2: steady state.
        while !window.is_empty() {
            let (head_tag, head_deadline) = {
                let (tag, entry) = window.head().expect("window checked non-empty");
                (tag.clone(), entry.deadline)
            };
            let now = self.clock.now();
            let budget = receive_budget(head_deadline, now, self.config.timeout);

            match self.adapter.recv(budget) {
                Ok(tag) if tag == head_tag => {
                    window.remove_head();
                    tracing::debug!(?tag, "acked");
                    self.top_up(&mut window, &mut payloads)?;
                }
                Ok(tag) if window.contains(&tag) => {
                    window.remove(&tag);
                    tracing::debug!(?tag, "acked out of order");
                    self.top_up(&mut window, &mut payloads)?;
                }
                Ok(tag) => {
                    self.handle_unexpected(&mut retired, tag)?;
                }
                Err(RecvError::Timeout) => {
                    let (_, entry) = window.remove_head();
                    if entry.retrans_left == 0 {
                        return Err(RunError::TransmissionFailed {
                            attempts: self.config.max_retrans + 1,
                            timeout: RecvError::Timeout,
                        });
                    }
                    retired.insert(head_tag.clone());
                    tracing::warn!(tag = ?head_tag, "timed out, retransmitting");
                    let new_tag = self.adapter.send(&entry.payload)?;
                    let new_entry = WindowEntry {
                        deadline: self.clock.now() + self.config.timeout,
                        payload: entry.payload,
                        retrans_left: entry.retrans_left - 1,
                    };
                    window.insert(new_tag, new_entry);
                    // No top-up this iteration: the spec forbids advancing
                    // the payload sequence on a retransmit.
                }
                Err(RecvError::Other(e)) => return Err(RunError::Adapter(e)),
            }
        }
        Ok(())
    }

    fn handle_unexpected(
        &self,
        retired: &mut HashSet<A::Tag>,
        tag: A::Tag,
    ) -> Result<(), RunError<A::Error>> {
        match self.config.unexpected_response_policy {
            UnexpectedResponsePolicy::Strict => Err(RunError::UnexpectedResponse),
            UnexpectedResponsePolicy::Lenient => {
                if retired.remove(&tag) {
                    tracing::warn!(?tag, "ack after retransmit; consider increasing timeout");
                } else {
                    tracing::warn!(?tag, "ack for unknown tag");
                }
                Ok(())
            }
        }
    }

    fn send_one<I>(
        &mut self,
        payloads: &mut I,
        retrans_left: u32,
    ) -> Result<Option<(A::Tag, WindowEntry<A::Payload>)>, RunError<A::Error>>
    where
        I: Iterator<Item = A::Payload>,
    {
        match payloads.next() {
            Some(payload) => {
                let tag = self.adapter.send(&payload)?;
                let deadline = self.clock.now() + self.config.timeout;
                tracing::debug!(?tag, "sent");
                Ok(Some((
                    tag,
                    WindowEntry {
                        deadline,
                        payload,
                        retrans_left,
                    },
                )))
            }
            None => Ok(None),
        }
    }

    fn top_up<I>(
        &mut self,
        window: &mut Window<A::Tag, A::Payload>,
        payloads: &mut I,
    ) -> Result<(), RunError<A::Error>>
    where
        I: Iterator<Item = A::Payload>,
    {
        if let Some((tag, entry)) = self.send_one(payloads, self.config.max_retrans)? {
            window.insert(tag, entry);
        }
        Ok(())
    }
}
