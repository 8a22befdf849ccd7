//! The authoritative simulation loop.
//!
//! Grounded on the teacher's `sync_layer/mod.rs` (owns the saved-states
//! ring and drives confirmed-frame advancement) and `sessions/p2p_session.rs`
//! (owns the per-peer table alongside it), rewritten around a
//! `parking_lot::Condvar` rather than the teacher's async poll loop since
//! this crate's concurrency model is blocking OS threads.

use crate::config::MAX_FRAMES;
use crate::error::NetcodeError;
use crate::frame_ring::FrameRing;
use crate::report_violation;
use crate::server::slots::{ClientSlot, SlotTable};
use crate::sim;
use crate::telemetry::{ViolationKind, ViolationSeverity};
use crate::types::{GameEvents, GameState, PlayerEvent, PlayerInput};
use crate::wire::{self, Message};
use parking_lot::{Condvar, Mutex};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct SimState {
    ring: FrameRing,
    server_frame: u32,
}

/// Owns the authoritative [`FrameRing`], `server_frame`, and the
/// [`SlotTable`]; drives the single simulation thread.
///
/// Lock order is `state` then `clients`, matching the invariant that the
/// simulation thread holds `state` across the whole advance-and-broadcast
/// step and only briefly takes `clients` nested inside it. Connection
/// actors take the two locks independently and never nest them.
pub struct ServerSynchronizer {
    state: Mutex<SimState>,
    clients: Mutex<SlotTable>,
    can_sim_cv: Condvar,
    shutdown: AtomicBool,
}

impl Default for ServerSynchronizer {
    fn default() -> Self {
        let mut ring = FrameRing::default();
        ring.init(0);
        Self {
            state: Mutex::new(SimState { ring, server_frame: 0 }),
            clients: Mutex::new(SlotTable::default()),
            can_sim_cv: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }
}

impl ServerSynchronizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.can_sim_cv.notify_all();
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn server_frame(&self) -> u32 {
        self.state.lock().server_frame
    }

    /// `ACCEPTED -> JOINED`: allocates a slot, marks `Join` at the current
    /// server frame, and sends `S2P_INIT_PLAYER`. Returns the new slot
    /// index, or [`NetcodeError::SlotExhausted`] if every slot is taken (the
    /// caller closes the socket in that case and never calls this again for
    /// it).
    pub fn accept_client(&self, stream: &TcpStream) -> Result<usize, NetcodeError> {
        let writer = Arc::new(Mutex::new(stream.try_clone()?));

        let slot = {
            let mut clients = self.clients.lock();
            clients
                .allocate(Arc::clone(&writer))
                .ok_or(NetcodeError::SlotExhausted)?
        };

        let (frame, init_state, init_events) = {
            let mut state = self.state.lock();
            let frame = state.server_frame;
            state.ring.events_at(frame).player_events[slot] = PlayerEvent::Join;
            (frame, *state.ring.state(frame), *state.ring.events(frame))
        };

        let msg = Message::S2pInitPlayer {
            frame,
            client_index: slot as u32,
            state: init_state,
            events: init_events,
        };
        wire::write_message(&mut *writer.lock(), &msg)?;
        self.can_sim_cv.notify_all();
        Ok(slot)
    }

    /// Records one client's input for `frame`. Validates `server_frame <=
    /// frame < server_frame + BUF` and that `slot` is still connected.
    pub fn submit_input(&self, slot: usize, frame: u32, input: PlayerInput) -> Result<(), NetcodeError> {
        {
            let mut state = self.state.lock();
            let server_frame = state.server_frame;
            let bound = server_frame.wrapping_add(MAX_FRAMES as u32);
            if frame < server_frame || frame >= bound {
                return Err(NetcodeError::WindowOverflow { frame, bound });
            }
            state.ring.events_at(frame).player_inputs[slot] = input;
        }
        {
            let mut clients = self.clients.lock();
            match clients.get_mut(slot) {
                Some(s) if s.connected => s.last_received_frame = Some(frame),
                _ => return Err(NetcodeError::PeerDisconnected { slot: Some(slot) }),
            }
        }
        self.can_sim_cv.notify_all();
        Ok(())
    }

    /// `JOINED -> DISCONNECTING`: marks `Leave` on the current server frame
    /// and flips the slot to disconnected, unblocking `can_simulate()` if
    /// this was the last holdout. The slot itself is freed later, once its
    /// actor thread has been joined.
    pub fn disconnect_client(&self, slot: usize) {
        {
            let mut state = self.state.lock();
            let frame = state.server_frame;
            state.ring.events_at(frame).player_events[slot] = PlayerEvent::Leave;
        }
        {
            let mut clients = self.clients.lock();
            clients.disconnect(slot);
        }
        self.can_sim_cv.notify_all();
    }

    /// Frees a disconnected slot's table entry, handing back whatever is
    /// left of it (its thread handle, in particular) for the caller to join.
    pub fn free_slot(&self, slot: usize) -> Option<ClientSlot> {
        self.clients.lock().free(slot)
    }

    /// Records `handle` as the connection actor thread for `slot`, so it
    /// can be joined later instead of left dangling.
    pub fn attach_handle(&self, slot: usize, handle: std::thread::JoinHandle<()>) {
        self.clients.lock().attach_handle(slot, handle);
    }

    /// Shuts down every slot's socket, connected or not. Called during
    /// teardown to unblock any connection actor parked in a blocking recv
    /// before its thread is joined (spec.md §5: sockets close before
    /// join-wait).
    pub fn shutdown_all_connections(&self) {
        let clients = self.clients.lock();
        for writer in clients.writers() {
            let _ = writer.lock().shutdown(std::net::Shutdown::Both);
        }
    }

    /// Joins every connection-actor thread handle still held by the slot
    /// table. Meant to be called once sockets have been shut down, during
    /// final teardown; handles for connections that already disconnected
    /// and freed their own slot are simply absent by then.
    pub fn join_all_handles(&self) {
        let handles = self.clients.lock().take_all_handles();
        for handle in handles {
            let _ = handle.join();
        }
    }

    pub fn connected_slot_indices(&self) -> Vec<usize> {
        self.clients.lock().connected_indices().collect()
    }

    fn can_simulate(&self, server_frame: u32) -> bool {
        let clients = self.clients.lock();
        clients.connected_count() >= 1 && clients.all_caught_up_to(server_frame)
    }

    /// Runs the simulation loop until [`Self::request_shutdown`] is called.
    /// Intended to run on its own dedicated thread.
    pub fn run_simulation_loop(&self) {
        loop {
            let mut state = self.state.lock();
            while !self.is_shutdown() && !self.can_simulate(state.server_frame) {
                self.can_sim_cv.wait(&mut state);
            }
            if self.is_shutdown() {
                return;
            }

            let frame = state.server_frame;
            let current_state = *state.ring.state(frame);
            let current_events = *state.ring.events(frame);

            let mut next = GameState::default();
            sim::simulate(&current_state, &current_events, &mut next);
            *state.ring.state_at(frame + 1) = next;
            state.server_frame = frame + 1;

            self.broadcast(&Message::S2pFrameEvents {
                frame,
                events: current_events,
            });

            state.ring.events_at(frame + 1).clear();
        }
    }

    fn broadcast(&self, msg: &Message) {
        let clients = self.clients.lock();
        for idx in clients.connected_indices() {
            let Some(slot) = clients.get(idx) else { continue };
            if let Err(err) = wire::write_message(&mut *slot.writer.lock(), msg) {
                report_violation!(
                    ViolationSeverity::Warning,
                    ViolationKind::PeerDisconnect,
                    "broadcast to slot {idx} failed: {err}"
                );
            }
        }
    }
}
