//! Structured error types for the netcode core.
//!
//! Mirrors the teacher library's approach: an enum with one structured
//! variant per failure kind (not a single `String`), with `Display` and
//! `std::error::Error` implemented by hand rather than pulled in from
//! `thiserror`. See spec.md §7 for the error taxonomy this enum encodes.

use std::fmt;

/// Errors produced by the netcode core.
///
/// `#[non_exhaustive]` because new failure kinds may be added without that
/// being a breaking change for callers who only match the variants they
/// care about and fall through to `_` otherwise.
#[derive(Debug)]
#[non_exhaustive]
pub enum NetcodeError {
    /// A received message's `type` tag or `payload_size` did not match what
    /// was expected. Fatal for the connection it was read from.
    ProtocolViolation {
        /// What went wrong, for logging.
        reason: String,
    },
    /// A frame number fell outside `[server_frame, server_frame + BUF)` (or
    /// the client-side equivalent). Soft backpressure condition.
    WindowOverflow {
        /// The frame number that was out of range.
        frame: u32,
        /// The bound that was violated.
        bound: u32,
    },
    /// `accept()` succeeded but every `ClientSlot` was occupied.
    SlotExhausted,
    /// The peer disconnected (recv returned 0 / send failed with a
    /// non-retryable error).
    PeerDisconnected {
        /// The slot that disconnected, if known.
        slot: Option<usize>,
    },
    /// An authoritative frame arrived that was neither `server_frame + 1`
    /// nor `0` (server restart).
    OutOfOrderFrame {
        /// The frame that was received.
        received: u32,
        /// The frame that was expected.
        expected: u32,
    },
    /// Underlying I/O failure (bind/listen/connect/read/write).
    Io {
        /// The underlying error, stringified (kept `Send + Sync`-free so
        /// the enum itself stays `Clone`-free-but-simple; callers that need
        /// the original `io::Error` should inspect it before converting).
        source: String,
    },
}

impl fmt::Display for NetcodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProtocolViolation { reason } => write!(f, "protocol violation: {reason}"),
            Self::WindowOverflow { frame, bound } => {
                write!(f, "frame {frame} outside window bound {bound}")
            },
            Self::SlotExhausted => write!(f, "no free client slot"),
            Self::PeerDisconnected { slot: Some(slot) } => {
                write!(f, "peer in slot {slot} disconnected")
            },
            Self::PeerDisconnected { slot: None } => write!(f, "peer disconnected"),
            Self::OutOfOrderFrame { received, expected } => {
                write!(f, "out-of-order frame: got {received}, expected {expected}")
            },
            Self::Io { source } => write!(f, "io error: {source}"),
        }
    }
}

impl std::error::Error for NetcodeError {}

impl From<std::io::Error> for NetcodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            source: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type NetcodeResult<T> = Result<T, NetcodeError>;
