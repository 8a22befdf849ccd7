//! Violation reporting.
//!
//! A scaled-down version of the teacher library's telemetry pipeline: just
//! enough structure (a severity, a kind, a message) to give spec.md §7's
//! error-taxonomy rows a consistent, greppable log line, funneled through
//! [`tracing`] rather than `println!`.

use std::fmt;

/// Severity of a reported violation, ordered least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViolationSeverity {
    /// Recoverable, logged for visibility (e.g. a dropped out-of-order frame).
    Warning,
    /// The offending connection/frame was torn down but the rest of the
    /// system is unaffected.
    Error,
}

/// What kind of spec.md invariant or protocol rule was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// §4.2 — bad `type` tag or `payload_size` mismatch.
    Protocol,
    /// §5/§8 — window invariant violated (client or server side).
    WindowOverflow,
    /// §4.4 — accept() with no free `ClientSlot`.
    SlotExhaustion,
    /// §4.5 — authoritative frame was neither `server_frame+1` nor `0`.
    OutOfOrderFrame,
    /// §4.3/§7 — peer disconnected or send/recv failed non-transiently.
    PeerDisconnect,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Protocol => "protocol",
            Self::WindowOverflow => "window_overflow",
            Self::SlotExhaustion => "slot_exhaustion",
            Self::OutOfOrderFrame => "out_of_order_frame",
            Self::PeerDisconnect => "peer_disconnect",
        };
        f.write_str(s)
    }
}

/// Emits a violation through `tracing`, at a level matching its severity.
///
/// Mirrors the teacher's `report_violation!` macro idiom but without the
/// pluggable-observer machinery, since nothing here needs to collect
/// violations programmatically outside of tests.
#[macro_export]
macro_rules! report_violation {
    ($severity:expr, $kind:expr, $($arg:tt)+) => {{
        match $severity {
            $crate::telemetry::ViolationSeverity::Warning => {
                tracing::warn!(kind = %$kind, $($arg)+);
            }
            $crate::telemetry::ViolationSeverity::Error => {
                tracing::error!(kind = %$kind, $($arg)+);
            }
        }
    }};
}
