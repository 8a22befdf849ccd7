//! The server binary's core: accept loop, simulation thread, and the
//! connection actors they hand off to.
//!
//! Grounded on the teacher's `sessions/p2p_session.rs` for the overall
//! "own a synchronizer, own a registry, run the loop" shape, combined with
//! the accept-loop pattern from `other_examples`' socket-server code.

pub mod connection;
pub mod slots;
pub mod synchronizer;

pub use synchronizer::ServerSynchronizer;

use crate::config::Config;
use crate::error::NetcodeError;
use crate::report_violation;
use crate::telemetry::{ViolationKind, ViolationSeverity};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often the accept loop polls its non-blocking listener for a pending
/// shutdown. `std::net::TcpListener` has no half-close/interrupt primitive,
/// so this bounds shutdown latency to one poll interval instead.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct Server {
    listener: TcpListener,
    sync: Arc<ServerSynchronizer>,
}

impl Server {
    pub fn bind(config: &Config) -> Result<Self, NetcodeError> {
        let listener = TcpListener::bind(("0.0.0.0", config.port))?;
        listener.set_nonblocking(true)?;
        tracing::info!(port = config.port, "server listening");
        Ok(Self {
            listener,
            sync: Arc::new(ServerSynchronizer::new()),
        })
    }

    #[must_use]
    pub fn local_port(&self) -> u16 {
        self.listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or_default()
    }

    /// Runs the accept loop and the simulation thread until `shutdown` is
    /// observed. Joins every connection actor before returning, per the
    /// teardown order: accept -> simulation -> connection actors.
    ///
    /// Every connection actor's thread handle is attached to its
    /// [`crate::server::slots::ClientSlot`] as it's spawned; on teardown
    /// every slot's socket is shut down *before* those handles are joined,
    /// so an actor parked in a blocking recv is guaranteed to unblock
    /// instead of hanging the join forever (spec.md §5: sockets close
    /// after the join-signal but before the join-wait).
    pub fn run(&self, shutdown: &AtomicBool) -> Result<(), NetcodeError> {
        let sim_sync = Arc::clone(&self.sync);
        let sim_handle = thread::spawn(move || sim_sync.run_simulation_loop());

        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(err) = stream.set_nonblocking(false) {
                        report_violation!(
                            ViolationSeverity::Error,
                            ViolationKind::Protocol,
                            "failed to configure accepted socket from {addr}: {err}"
                        );
                        continue;
                    }
                    tracing::info!(%addr, "accepted connection");
                    match self.sync.accept_client(&stream) {
                        Ok(slot) => {
                            let sync = Arc::clone(&self.sync);
                            let handle = thread::spawn(move || connection::run(sync, slot, stream));
                            self.sync.attach_handle(slot, handle);
                        },
                        Err(NetcodeError::SlotExhausted) => {
                            report_violation!(
                                ViolationSeverity::Warning,
                                ViolationKind::SlotExhaustion,
                                "rejected connection from {addr}: no free slot"
                            );
                        },
                        Err(err) => {
                            report_violation!(
                                ViolationSeverity::Error,
                                ViolationKind::Protocol,
                                "handshake failed for {addr}: {err}"
                            );
                        },
                    }
                },
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                },
                Err(err) => {
                    report_violation!(
                        ViolationSeverity::Error,
                        ViolationKind::Protocol,
                        "accept failed: {err}"
                    );
                },
            }
        }

        self.sync.request_shutdown();
        self.sync.shutdown_all_connections();
        let _ = sim_handle.join();
        self.sync.join_all_handles();
        Ok(())
    }
}
