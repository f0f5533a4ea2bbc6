//! Reliable sliding-window transmission engine.
//!
//! Drives an arbitrary sequence of application payloads across a
//! pluggable [`ProtocolAdapter`], sequencing sends, tracking per-entry
//! deadlines with an injectable [`Clock`], and bounding retransmissions
//! per payload. Distilled from a small Python reference implementation;
//! the engine itself does no framing, chunking, or checksumming — that
//! belongs to the adapter, not here.

pub mod adapter;
pub mod clock;
pub mod engine;
pub mod error;
pub mod window;

pub use adapter::{ProtocolAdapter, RecvError};
pub use clock::{Clock, SystemClock};
pub use engine::{EngineConfig, UnexpectedResponsePolicy, WindowEngine};
pub use error::{ConfigurationError, RunError};
pub use window::{Window, WindowEntry};
