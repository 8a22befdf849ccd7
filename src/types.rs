//! Core data model: player input/events and the game state they drive.
//!
//! Plain data types with hand-written `Default` impls, in the teacher's
//! `frame_info.rs` style, but concrete rather than generic over a
//! user-supplied game type — spec.md §3 names these fields directly.

use crate::config::MAX_CLIENTS;

/// Four-bit held-direction input sampled once per client tick.
///
/// No guarantee that opposite directions aren't both held at once; the
/// simulation is free to treat that however it likes (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl PlayerInput {
    /// Packs the four held-direction bits into the low nibble of a byte,
    /// in `left, right, up, down` bit order (bit 0 = left). Used by the
    /// wire codec.
    #[must_use]
    pub fn to_bits(self) -> u8 {
        (self.left as u8) | (self.right as u8) << 1 | (self.up as u8) << 2 | (self.down as u8) << 3
    }

    /// Inverse of [`PlayerInput::to_bits`]. Ignores any set bits above bit 3.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self {
            left: bits & 0b0001 != 0,
            right: bits & 0b0010 != 0,
            up: bits & 0b0100 != 0,
            down: bits & 0b1000 != 0,
        }
    }
}

/// A connect/disconnect edge for a single player slot on a single frame.
///
/// At most one per player per frame (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerEvent {
    #[default]
    None,
    Join,
    Leave,
}

/// Per-slot inputs and connection events for a single frame.
///
/// Mutable until the frame is confirmed by the server, then logically
/// immutable (nothing in this crate enforces that in the type system; it's
/// a discipline the synchronizer/engine follow, per spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameEvents {
    pub player_inputs: [PlayerInput; MAX_CLIENTS],
    pub player_events: [PlayerEvent; MAX_CLIENTS],
}

impl Default for GameEvents {
    fn default() -> Self {
        Self {
            player_inputs: [PlayerInput::default(); MAX_CLIENTS],
            player_events: [PlayerEvent::default(); MAX_CLIENTS],
        }
    }
}

impl GameEvents {
    /// Resets every slot back to `PlayerInput::default()` /
    /// `PlayerEvent::None`, for preparing a clean slate for the next frame
    /// (spec.md §4.4's "zero ring.events\[F+1\]").
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One player's simulated state.
///
/// `active == false` means `x`/`y` are undefined (spec.md §3); callers must
/// not read position for an inactive slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerData {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

/// The full authoritative/predicted state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameState {
    pub players: [PlayerData; MAX_CLIENTS],
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            players: [PlayerData::default(); MAX_CLIENTS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_has_no_active_players() {
        let state = GameState::default();
        assert!(state.players.iter().all(|p| !p.active));
    }

    #[test]
    fn default_events_are_none_and_blank() {
        let events = GameEvents::default();
        assert!(events
            .player_events
            .iter()
            .all(|e| matches!(e, PlayerEvent::None)));
        assert!(events
            .player_inputs
            .iter()
            .all(|i| *i == PlayerInput::default()));
    }

    #[test]
    fn clear_resets_a_mutated_events_struct() {
        let mut events = GameEvents::default();
        events.player_events[0] = PlayerEvent::Join;
        events.player_inputs[0].right = true;
        events.clear();
        assert_eq!(events.player_events[0], PlayerEvent::None);
        assert_eq!(events.player_inputs[0], PlayerInput::default());
    }

    #[test]
    fn input_bit_roundtrip() {
        let input = PlayerInput {
            left: false,
            right: true,
            up: true,
            down: false,
        };
        let bits = input.to_bits();
        assert_eq!(bits, 0b0110);
        assert_eq!(PlayerInput::from_bits(bits), input);
    }

    #[test]
    fn input_bit_roundtrip_all_combinations() {
        for bits in 0u8..16 {
            let input = PlayerInput::from_bits(bits);
            assert_eq!(input.to_bits(), bits);
        }
    }

    #[test]
    fn from_bits_ignores_high_bits() {
        let input = PlayerInput::from_bits(0xF0 | 0b0001);
        assert_eq!(input, PlayerInput {
            left: true,
            right: false,
            up: false,
            down: false,
        });
    }
}
