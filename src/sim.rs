//! The deterministic simulation step.
//!
//! spec.md §1 treats this as an external collaborator supplied by "the game
//! module" — the netcode core only constrains its purity and determinism.
//! This module is the crate's bundled default implementation of that
//! contract (spec.md §4.6), so the crate is runnable end to end without a
//! separate game crate.
//!
//! # Determinism
//!
//! `simulate` reads nothing but its two input references, performs no I/O,
//! and the only floating-point operations are additions of an exact value
//! (`1.0`) to existing coordinates — per spec.md §9's option (b), this
//! keeps results bit-identical across runs and machines without requiring
//! fixed-point coordinates.

use crate::types::{GameEvents, GameState, PlayerData};

/// World-space coordinate new players spawn at.
const SPAWN_X: f32 = 400.0;
const SPAWN_Y: f32 = 400.0;

/// Fixed per-tick displacement applied per held direction.
const STEP: f32 = 1.0;

/// Advances `current` one frame using `events`, writing the result into
/// `next`. Pure and deterministic per the contract above.
///
/// Order of operations (spec.md §4.6): first apply `player_events[i]` for
/// each slot in ascending `i` (Join spawns active at a fixed origin, Leave
/// clears `active`), then apply movement from `player_inputs[i]` to active
/// players.
pub fn simulate(current: &GameState, events: &GameEvents, next: &mut GameState) {
    *next = *current;

    for (slot, event) in events.player_events.iter().enumerate() {
        match event {
            crate::types::PlayerEvent::Join => {
                next.players[slot] = PlayerData {
                    x: SPAWN_X,
                    y: SPAWN_Y,
                    active: true,
                };
            },
            crate::types::PlayerEvent::Leave => {
                next.players[slot] = PlayerData::default();
            },
            crate::types::PlayerEvent::None => {},
        }
    }

    for (slot, input) in events.player_inputs.iter().enumerate() {
        let player = &mut next.players[slot];
        if !player.active {
            continue;
        }
        if input.left {
            player.x -= STEP;
        }
        if input.right {
            player.x += STEP;
        }
        if input.up {
            player.y -= STEP;
        }
        if input.down {
            player.y += STEP;
        }
    }
}
