//! Compile-time and runtime constants for the netcode core.
//!
//! Most of these are fixed at compile time because they size arrays
//! (`MAX_CLIENTS`, `MAX_FRAMES`): both the server's and the client's
//! [`crate::frame_ring::FrameRing`] are plain fixed-size arrays, not
//! growable collections, so their capacity has to be known at compile time.
//! `Config` bundles the remaining runtime-tunable knobs (port, tick rate,
//! listen backlog) behind a `clap::Parser` derive so the binaries can
//! override them from argv.

use std::time::Duration;

/// Maximum number of simultaneously connected clients/players.
///
/// Recommended 4-16 by spec; kept small by default to keep the frame ring
/// and client-slot table cheap to allocate inline.
pub const MAX_CLIENTS: usize = 8;

/// Ring buffer capacity in frames (`BUF` in spec.md). Must be a
/// power-of-two so that `frame % MAX_FRAMES` is an exact, cheap modulus.
pub const MAX_FRAMES: usize = 256;

/// Default TCP port both binaries listen on / connect to.
pub const DEFAULT_PORT: u16 = 32000;

/// Default client-side tick rate (ticks/second).
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Default kernel listen backlog for the server's `TcpListener`.
pub const DEFAULT_LISTEN_BACKLOG: i32 = 128;

const _: () = assert!(MAX_FRAMES.is_power_of_two(), "MAX_FRAMES must be a power of two");

/// Runtime configuration shared by the server and client binaries.
///
/// The library itself never reads environment variables or argv; binaries
/// build a `Config` via [`clap::Parser`] and pass it down.
#[derive(Debug, Clone, clap::Parser)]
pub struct Config {
    /// TCP port to bind (server) or connect to (client).
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Client tick rate, in ticks per second.
    #[arg(long, default_value_t = DEFAULT_TICK_RATE)]
    pub tick_rate: u32,

    /// Kernel listen backlog (server only; ignored by the client).
    #[arg(long, default_value_t = DEFAULT_LISTEN_BACKLOG)]
    pub listen_backlog: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            tick_rate: DEFAULT_TICK_RATE,
            listen_backlog: DEFAULT_LISTEN_BACKLOG,
        }
    }
}

impl Config {
    /// Duration of one client tick at [`Config::tick_rate`].
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate.max(1)))
    }
}
