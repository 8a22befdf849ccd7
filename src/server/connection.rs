//! The per-connection actor thread.
//!
//! Grounded on the teacher's `network/protocol.rs` (`UdpProtocol`'s
//! explicit state-machine shape — one enum, one transition per edge),
//! rewritten for a blocking TCP thread-per-connection model rather than the
//! teacher's UDP/poll-driven one, since that re-architecture is explicitly
//! sanctioned for this crate's concurrency model.

use crate::error::NetcodeError;
use crate::report_violation;
use crate::server::synchronizer::ServerSynchronizer;
use crate::telemetry::{ViolationKind, ViolationSeverity};
use crate::wire::{self, Message};
use std::net::TcpStream;
use std::sync::Arc;

/// `JOINED`'s recv loop: reads `P2S_INPUT` until the peer disconnects or
/// sends something that breaks the protocol contract, then tears the
/// connection down and frees its slot so a later client can reuse it.
///
/// `std::io::Read::read_exact`, used throughout [`wire::read_message`],
/// already retries on `ErrorKind::Interrupted`, so there is no separate
/// `EINTR` handling here; every other I/O error is treated as a peer
/// disconnect.
pub fn run(sync: Arc<ServerSynchronizer>, slot: usize, mut stream: TcpStream) {
    loop {
        match wire::read_message(&mut stream) {
            Ok(Message::P2sInput { frame, client_index, input }) => {
                if client_index as usize != slot {
                    report_violation!(
                        ViolationSeverity::Error,
                        ViolationKind::Protocol,
                        "slot {slot}: input claimed client_index {client_index}"
                    );
                    break;
                }
                match sync.submit_input(slot, frame, input) {
                    Ok(()) => {},
                    Err(NetcodeError::WindowOverflow { frame, bound }) => {
                        report_violation!(
                            ViolationSeverity::Warning,
                            ViolationKind::WindowOverflow,
                            "slot {slot}: frame {frame} outside window bound {bound}, dropped"
                        );
                    },
                    Err(NetcodeError::PeerDisconnected { .. }) => break,
                    Err(err) => {
                        report_violation!(
                            ViolationSeverity::Error,
                            ViolationKind::Protocol,
                            "slot {slot}: {err}"
                        );
                        break;
                    },
                }
            },
            Ok(other) => {
                report_violation!(
                    ViolationSeverity::Error,
                    ViolationKind::Protocol,
                    "slot {slot}: unexpected message kind {other:?} on ingress"
                );
                break;
            },
            Err(_) => break,
        }
    }

    sync.disconnect_client(slot);
    sync.free_slot(slot);
}
