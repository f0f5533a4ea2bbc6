//! The capability the engine drives: send one payload, receive one ack tag.
//!
//! This plays the role `Protocol` plays in the original implementation this
//! engine was distilled from: an abstract base class with `send`/`recv`.
//! Re-expressed here as a trait the engine is generic over, rather than a
//! boxed/dynamic dispatch target, so a concrete adapter (e.g. a blocking
//! UDP socket) pays no vtable cost.

use std::time::Duration;

/// Transmits payloads and reports acknowledgements for a single engine run.
///
/// `send` and `recv` are expected to execute synchronously, within the
/// calling flow of control; `recv` is the only operation allowed to block,
/// and only for at most the budget it is given.
pub trait ProtocolAdapter {
    /// The application-level value being transmitted. The engine never
    /// inspects it, but does hold onto (and may clone) it for retransmits.
    type Payload: Clone;

    /// An opaque identifier assigned by the adapter to one `send` call.
    /// Distinct `send` invocations within a run must yield unequal tags.
    type Tag: Eq + std::hash::Hash + Clone + std::fmt::Debug;

    /// The adapter's own fatal error type. Surfaced to the caller of `run`
    /// unchanged, wrapped in [`crate::error::RunError::Adapter`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Transmit `payload`, returning a tag that identifies this
    /// transmission for later acknowledgement matching.
    fn send(&mut self, payload: &Self::Payload) -> Result<Self::Tag, Self::Error>;

    /// Block up to `timeout` waiting for the next acknowledgement tag.
    ///
    /// `timeout` is always in `[Duration::ZERO, engine_timeout]`; a zero
    /// duration means "poll, do not block". Implementations should return
    /// [`RecvError::Timeout`] as soon as they can determine no ack will
    /// arrive within the budget, rather than blocking longer.
    fn recv(&mut self, timeout: Duration) -> Result<Self::Tag, RecvError<Self::Error>>;
}

/// Outcome of a `recv` call that did not yield a tag.
#[derive(Debug, thiserror::Error)]
pub enum RecvError<E> {
    /// No acknowledgement arrived before the budget elapsed. Recoverable:
    /// the engine turns this into a retransmit or, if the budget is
    /// exhausted, [`crate::error::RunError::TransmissionFailed`].
    #[error("recv timed out")]
    Timeout,

    /// Any other adapter-originated failure. Fatal: propagated unchanged.
    #[error(transparent)]
    Other(#[from] E),
}
