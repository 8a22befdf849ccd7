//! Fixed-layout, big-endian encoding for [`GameState`]/[`GameEvents`]/
//! [`PlayerInput`], shared by the payloads in [`super::messages`].

use crate::config::MAX_CLIENTS;
use crate::error::NetcodeError;
use crate::types::{GameEvents, GameState, PlayerData, PlayerEvent, PlayerInput};

/// Wire size of one player's `PlayerData`: `x: f32, y: f32, active: u8`.
pub const PLAYER_DATA_LEN: usize = 4 + 4 + 1;
/// Wire size of a full `GameState`.
pub const GAME_STATE_LEN: usize = PLAYER_DATA_LEN * MAX_CLIENTS;
/// Wire size of one slot's events: `input: u8 (nibble), event: u8`.
pub const EVENTS_SLOT_LEN: usize = 1 + 1;
/// Wire size of a full `GameEvents`.
pub const GAME_EVENTS_LEN: usize = EVENTS_SLOT_LEN * MAX_CLIENTS;

pub fn encode_player_input(input: PlayerInput, out: &mut Vec<u8>) {
    out.push(input.to_bits());
}

pub fn decode_player_input(bytes: &[u8]) -> PlayerInput {
    PlayerInput::from_bits(bytes[0])
}

fn encode_player_event(event: PlayerEvent, out: &mut Vec<u8>) {
    out.push(match event {
        PlayerEvent::None => 0,
        PlayerEvent::Join => 1,
        PlayerEvent::Leave => 2,
    });
}

fn decode_player_event(byte: u8) -> Result<PlayerEvent, NetcodeError> {
    match byte {
        0 => Ok(PlayerEvent::None),
        1 => Ok(PlayerEvent::Join),
        2 => Ok(PlayerEvent::Leave),
        other => Err(NetcodeError::ProtocolViolation {
            reason: format!("invalid player event tag {other}"),
        }),
    }
}

pub fn encode_game_state(state: &GameState, out: &mut Vec<u8>) {
    for player in &state.players {
        out.extend_from_slice(&player.x.to_be_bytes());
        out.extend_from_slice(&player.y.to_be_bytes());
        out.push(u8::from(player.active));
    }
}

pub fn decode_game_state(bytes: &[u8]) -> Result<GameState, NetcodeError> {
    if bytes.len() < GAME_STATE_LEN {
        return Err(NetcodeError::ProtocolViolation {
            reason: format!("short GameState payload: {} < {GAME_STATE_LEN}", bytes.len()),
        });
    }
    let mut state = GameState::default();
    for (i, player) in state.players.iter_mut().enumerate() {
        let base = i * PLAYER_DATA_LEN;
        let x = f32::from_be_bytes(bytes[base..base + 4].try_into().expect("4 bytes"));
        let y = f32::from_be_bytes(bytes[base + 4..base + 8].try_into().expect("4 bytes"));
        let active = bytes[base + 8] != 0;
        *player = PlayerData { x, y, active };
    }
    Ok(state)
}

pub fn encode_game_events(events: &GameEvents, out: &mut Vec<u8>) {
    for i in 0..MAX_CLIENTS {
        encode_player_input(events.player_inputs[i], out);
        encode_player_event(events.player_events[i], out);
    }
}

pub fn decode_game_events(bytes: &[u8]) -> Result<GameEvents, NetcodeError> {
    if bytes.len() < GAME_EVENTS_LEN {
        return Err(NetcodeError::ProtocolViolation {
            reason: format!("short GameEvents payload: {} < {GAME_EVENTS_LEN}", bytes.len()),
        });
    }
    let mut events = GameEvents::default();
    for i in 0..MAX_CLIENTS {
        let base = i * EVENTS_SLOT_LEN;
        events.player_inputs[i] = decode_player_input(&bytes[base..base + 1]);
        events.player_events[i] = decode_player_event(bytes[base + 1])?;
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_state_roundtrip() {
        let mut state = GameState::default();
        state.players[0] = PlayerData {
            x: 1.5,
            y: -2.5,
            active: true,
        };
        let mut buf = Vec::new();
        encode_game_state(&state, &mut buf);
        assert_eq!(buf.len(), GAME_STATE_LEN);
        let decoded = decode_game_state(&buf).expect("decode");
        assert_eq!(decoded.players[0], state.players[0]);
    }

    #[test]
    fn game_events_roundtrip() {
        let mut events = GameEvents::default();
        events.player_inputs[1].right = true;
        events.player_events[1] = PlayerEvent::Join;
        let mut buf = Vec::new();
        encode_game_events(&events, &mut buf);
        assert_eq!(buf.len(), GAME_EVENTS_LEN);
        let decoded = decode_game_events(&buf).expect("decode");
        assert_eq!(decoded.player_inputs[1], events.player_inputs[1]);
        assert_eq!(decoded.player_events[1], events.player_events[1]);
    }

    #[test]
    fn decode_rejects_invalid_event_tag() {
        let mut buf = vec![0u8; GAME_EVENTS_LEN];
        buf[1] = 9; // invalid event tag for slot 0
        let err = decode_game_events(&buf).unwrap_err();
        assert!(matches!(err, NetcodeError::ProtocolViolation { .. }));
    }

    #[test]
    fn decode_rejects_short_buffer() {
        assert!(decode_game_state(&[0u8; 2]).is_err());
        assert!(decode_game_events(&[0u8; 1]).is_err());
    }
}
