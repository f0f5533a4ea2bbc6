//! Error taxonomy for engine construction and `run`.
//!
//! Mirrors the thiserror-enum style used throughout this workspace's wire
//! layer (`PeerError`, `SerializeError`, `DeserializeError`): small,
//! closed enums with one variant per recovery path, rather than a single
//! catch-all error type.

/// Raised by [`crate::engine::EngineConfig::validate`]. Permanent: no
/// side effects have occurred yet, and the engine is never constructed.
#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum ConfigurationError {
    #[error("window size must be >= 1")]
    ZeroWindowSize,
}

/// Raised by [`crate::engine::WindowEngine::run`]. Once this escapes, the
/// window for that run is abandoned; the engine itself may still be reused
/// for a fresh `run`.
#[derive(Debug, thiserror::Error)]
pub enum RunError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// The window head timed out with no retransmissions left.
    #[error("payload exhausted its retransmission budget after {attempts} attempt(s)")]
    TransmissionFailed {
        attempts: u32,
        #[source]
        timeout: crate::adapter::RecvError<E>,
    },

    /// Strict mode only: `recv` returned a tag that matches no current
    /// window entry and no retired entry.
    #[error("received acknowledgement for a tag that was never sent or already retired")]
    UnexpectedResponse,

    /// Propagated unchanged from `ProtocolAdapter::send` or from a
    /// non-`Timeout` `ProtocolAdapter::recv` failure.
    #[error(transparent)]
    Adapter(#[from] E),
}
