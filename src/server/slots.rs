//! The server's `ClientSlot` table.
//!
//! Grounded on the teacher's `sessions/player_registry.rs` (a registry
//! mapping player identity to connection state, with linear-scan helpers
//! and a hand-written `Debug`), simplified from a `BTreeMap`-keyed generic
//! registry to a fixed `[Option<ClientSlot>; MAX_CLIENTS]` array: spec.md
//! §3 ties slot index directly to player id ("slot index is stable for
//! session; slot is authoritative player id").

use crate::config::MAX_CLIENTS;
use parking_lot::Mutex;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread::JoinHandle;

/// One connected (or formerly connected) client's bookkeeping.
///
/// `connected` is cleared the instant a disconnect is detected, even
/// though the slot's `JoinHandle` may still need joining during shutdown
/// — this is what stops the connection actor's own input from being
/// accepted the moment a teardown begins.
pub struct ClientSlot {
    pub connected: bool,
    /// Highest frame this client has reported input for. `None` until its
    /// first `P2S_INPUT` arrives, so a freshly joined slot always blocks
    /// `can_simulate()` regardless of the current `server_frame`.
    pub last_received_frame: Option<u32>,
    pub handle: Option<JoinHandle<()>>,
    /// The write half of this client's socket, shared so the simulation
    /// thread can broadcast without racing the connection actor's own
    /// (read-only) use of the stream.
    pub writer: Arc<Mutex<TcpStream>>,
}

impl ClientSlot {
    fn new(writer: Arc<Mutex<TcpStream>>) -> Self {
        Self {
            connected: true,
            last_received_frame: None,
            handle: None,
            writer,
        }
    }
}

/// Fixed-capacity slot table. Protected by the caller's `clients_lock`
/// (spec.md §5); this type holds no lock of its own.
#[derive(Default)]
pub struct SlotTable {
    slots: [Option<ClientSlot>; MAX_CLIENTS],
}

impl SlotTable {
    /// Allocates the first free slot, returning its index, or `None` if
    /// every slot is occupied ("If no slot free, close socket and
    /// transition directly to TERMINATED").
    pub fn allocate(&mut self, writer: Arc<Mutex<TcpStream>>) -> Option<usize> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(ClientSlot::new(writer));
        Some(index)
    }

    pub fn get(&self, index: usize) -> Option<&ClientSlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ClientSlot> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Records the connection actor's thread handle for `index`, so it can
    /// later be joined (at shutdown) instead of silently detached.
    pub fn attach_handle(&mut self, index: usize, handle: JoinHandle<()>) {
        if let Some(slot) = self.get_mut(index) {
            slot.handle = Some(handle);
        }
    }

    /// Every still-present slot's writer, connected or not — used to force
    /// any actor thread blocked in a recv to unblock during shutdown.
    pub fn writers(&self) -> impl Iterator<Item = &Arc<Mutex<TcpStream>>> + '_ {
        self.slots.iter().filter_map(|s| s.as_ref().map(|s| &s.writer))
    }

    /// Takes every slot's thread handle still held in the table, for the
    /// caller to join. Leaves each slot's `handle` field `None`.
    pub fn take_all_handles(&mut self) -> Vec<JoinHandle<()>> {
        self.slots
            .iter_mut()
            .filter_map(|s| s.as_mut().and_then(|s| s.handle.take()))
            .collect()
    }

    /// Marks a slot disconnected but keeps the entry around so its thread
    /// handle can still be joined during shutdown.
    pub fn disconnect(&mut self, index: usize) {
        if let Some(slot) = self.get_mut(index) {
            slot.connected = false;
        }
    }

    /// Fully frees a slot (after its thread has been joined).
    pub fn free(&mut self, index: usize) -> Option<ClientSlot> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn connected_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.as_ref().is_some_and(|s| s.connected))
            .count()
    }

    pub fn connected_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().filter(|s| s.connected).map(|_| i))
    }

    /// True iff every connected slot has reported input up to at least
    /// `frame` (`can_simulate()`, minus the "at least one client" part
    /// which the caller checks via [`Self::connected_count`]).
    pub fn all_caught_up_to(&self, frame: u32) -> bool {
        self.slots
            .iter()
            .filter_map(Option::as_ref)
            .filter(|s| s.connected)
            .all(|s| s.last_received_frame.is_some_and(|f| f >= frame))
    }
}
