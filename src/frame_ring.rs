//! Fixed-size, frame-indexed ring buffer of `(GameState, GameEvents)`.
//!
//! Grounded on the teacher's `sync_layer/saved_states.rs` (fixed `Vec` of
//! slots indexed by `frame % len`), simplified away the
//! `Arc<Mutex<GameStateCell<T>>>` wrapping the teacher uses per-slot:
//! spec.md §4.1 wants direct `&mut` slot access guarded by one coarse
//! `state_lock` the caller already holds, not a per-slot lock.

use crate::config::MAX_FRAMES;
use crate::types::{GameEvents, GameState};

/// `BUF`-slot ring mapping an absolute frame number to a `(GameState,
/// GameEvents)` pair at `frame % BUF`.
///
/// The ring performs **no** bookkeeping of which frame is currently valid
/// at each slot — spec.md §4.1 is explicit that this is the caller's job
/// via the window invariant (`sync_frame <= frame < sync_frame + BUF`).
/// Writing to `F + BUF` silently overwrites `F`.
pub struct FrameRing {
    states: [GameState; MAX_FRAMES],
    events: [GameEvents; MAX_FRAMES],
    start_frame: u32,
}

impl Default for FrameRing {
    fn default() -> Self {
        Self {
            states: [GameState::default(); MAX_FRAMES],
            events: [GameEvents::default(); MAX_FRAMES],
            start_frame: 0,
        }
    }
}

impl FrameRing {
    /// Zeroes every slot and records `start_frame`.
    pub fn init(&mut self, start_frame: u32) {
        self.states = [GameState::default(); MAX_FRAMES];
        self.events = [GameEvents::default(); MAX_FRAMES];
        self.start_frame = start_frame;
    }

    /// The frame this ring was last `init`-ed with.
    #[must_use]
    pub fn start_frame(&self) -> u32 {
        self.start_frame
    }

    fn slot(frame: u32) -> usize {
        (frame as usize) % MAX_FRAMES
    }

    /// Direct mutable access to the state slot for `frame`.
    pub fn state_at(&mut self, frame: u32) -> &mut GameState {
        &mut self.states[Self::slot(frame)]
    }

    /// Direct mutable access to the events slot for `frame`.
    pub fn events_at(&mut self, frame: u32) -> &mut GameEvents {
        &mut self.events[Self::slot(frame)]
    }

    /// Read-only access to the state slot for `frame`.
    #[must_use]
    pub fn state(&self, frame: u32) -> &GameState {
        &self.states[Self::slot(frame)]
    }

    /// Read-only access to the events slot for `frame`.
    #[must_use]
    pub fn events(&self, frame: u32) -> &GameEvents {
        &self.events[Self::slot(frame)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerEvent;

    #[test]
    fn init_zeroes_and_records_start_frame() {
        let mut ring = FrameRing::default();
        ring.events_at(5).player_events[0] = PlayerEvent::Join;
        ring.init(10);
        assert_eq!(ring.start_frame(), 10);
        assert_eq!(ring.events(5).player_events[0], PlayerEvent::None);
    }

    #[test]
    fn write_and_read_same_frame() {
        let mut ring = FrameRing::default();
        ring.state_at(3).players[0].x = 42.0;
        assert_eq!(ring.state(3).players[0].x, 42.0);
    }

    #[test]
    fn writing_frame_plus_buf_overwrites_original_slot() {
        let mut ring = FrameRing::default();
        ring.state_at(7).players[0].x = 1.0;
        ring.state_at(7 + MAX_FRAMES as u32).players[0].x = 2.0;
        // Same physical slot: the later write clobbers the earlier one.
        assert_eq!(ring.state(7).players[0].x, 2.0);
    }

    #[test]
    fn distinct_frames_map_to_distinct_slots_within_window() {
        let mut ring = FrameRing::default();
        ring.state_at(0).players[0].x = 1.0;
        ring.state_at(1).players[0].x = 2.0;
        assert_eq!(ring.state(0).players[0].x, 1.0);
        assert_eq!(ring.state(1).players[0].x, 2.0);
    }
}
