//! The four message kinds of spec.md §4.2, assembled from [`super::header`]
//! and [`super::payload`].

use crate::error::NetcodeError;
use crate::types::{GameEvents, GameState, PlayerInput};
use crate::wire::header::{MessageHeader, HEADER_LEN};
use crate::wire::payload;

/// Wire tag for [`Message::P2sInput`].
pub const TAG_P2S_INPUT: u8 = 1;
/// Wire tag for [`Message::S2pFrameEvents`].
pub const TAG_S2P_FRAME_EVENTS: u8 = 2;
/// Wire tag for [`Message::S2pInitPlayer`].
pub const TAG_S2P_INIT_PLAYER: u8 = 3;
/// Wire tag for [`Message::PlayerPresence`].
pub const TAG_PLAYER_PRESENCE: u8 = 4;

/// One wire message. See spec.md §4.2's table; tag 4 resolves the spec's
/// `SB_PLAYER_JOINED`/`SB_PLAYER_LEFT` open question as a single optional
/// message distinguished by its `joined` field (see SPEC_FULL.md §7.3).
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// client -> server: this client's input for `frame`.
    P2sInput {
        frame: u32,
        client_index: u32,
        input: PlayerInput,
    },
    /// server -> client: the assembled, authoritative events for `frame`.
    S2pFrameEvents { frame: u32, events: GameEvents },
    /// server -> client: handshake response with the current authoritative
    /// state and the newly assigned slot index.
    S2pInitPlayer {
        frame: u32,
        client_index: u32,
        state: GameState,
        events: GameEvents,
    },
    /// server -> client (broadcast, optional/informational): a player
    /// joined or left.
    PlayerPresence {
        frame: u32,
        player_id: u32,
        joined: bool,
    },
}

impl Message {
    fn tag(&self) -> u8 {
        match self {
            Self::P2sInput { .. } => TAG_P2S_INPUT,
            Self::S2pFrameEvents { .. } => TAG_S2P_FRAME_EVENTS,
            Self::S2pInitPlayer { .. } => TAG_S2P_INIT_PLAYER,
            Self::PlayerPresence { .. } => TAG_PLAYER_PRESENCE,
        }
    }

    fn frame(&self) -> u32 {
        match self {
            Self::P2sInput { frame, .. }
            | Self::S2pFrameEvents { frame, .. }
            | Self::S2pInitPlayer { frame, .. }
            | Self::PlayerPresence { frame, .. } => *frame,
        }
    }

    /// Encodes the full wire frame (header + payload).
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        match self {
            Self::P2sInput {
                client_index,
                input,
                ..
            } => {
                payload.extend_from_slice(&client_index.to_be_bytes());
                payload::encode_player_input(*input, &mut payload);
            },
            Self::S2pFrameEvents { events, .. } => {
                payload::encode_game_events(events, &mut payload);
            },
            Self::S2pInitPlayer {
                client_index,
                state,
                events,
                ..
            } => {
                payload.extend_from_slice(&client_index.to_be_bytes());
                payload::encode_game_state(state, &mut payload);
                payload::encode_game_events(events, &mut payload);
            },
            Self::PlayerPresence {
                player_id, joined, ..
            } => {
                payload.extend_from_slice(&player_id.to_be_bytes());
                payload.push(u8::from(*joined));
            },
        }

        let payload_size = u16::try_from(payload.len()).unwrap_or(u16::MAX);
        let header = MessageHeader::new(self.tag(), self.frame(), payload_size);
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        header.encode(&mut out);
        out.extend_from_slice(&payload);
        out
    }

    /// Decodes one full wire frame from the start of `bytes`.
    ///
    /// Returns the message and the number of bytes consumed. Validates
    /// that `payload_size` exactly matches the wire size of the structure
    /// implied by `type` (spec.md §4.2: a size mismatch is a fatal
    /// protocol error).
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), NetcodeError> {
        let header = MessageHeader::decode(bytes)?;
        let total_len = HEADER_LEN + header.payload_size as usize;
        if bytes.len() < total_len {
            return Err(NetcodeError::ProtocolViolation {
                reason: format!(
                    "payload truncated: need {} bytes, have {}",
                    total_len,
                    bytes.len()
                ),
            });
        }
        let body = &bytes[HEADER_LEN..total_len];

        let message = match header.tag {
            TAG_P2S_INPUT => {
                Self::expect_size(header.payload_size as usize, 4 + 1, header.tag)?;
                let client_index = u32::from_be_bytes(body[0..4].try_into().expect("4 bytes"));
                let input = payload::decode_player_input(&body[4..5]);
                Self::P2sInput {
                    frame: header.frame,
                    client_index,
                    input,
                }
            },
            TAG_S2P_FRAME_EVENTS => {
                Self::expect_size(header.payload_size as usize, payload::GAME_EVENTS_LEN, header.tag)?;
                let events = payload::decode_game_events(body)?;
                Self::S2pFrameEvents {
                    frame: header.frame,
                    events,
                }
            },
            TAG_S2P_INIT_PLAYER => {
                let expected = 4 + payload::GAME_STATE_LEN + payload::GAME_EVENTS_LEN;
                Self::expect_size(header.payload_size as usize, expected, header.tag)?;
                let client_index = u32::from_be_bytes(body[0..4].try_into().expect("4 bytes"));
                let state_bytes = &body[4..4 + payload::GAME_STATE_LEN];
                let events_bytes = &body[4 + payload::GAME_STATE_LEN..];
                Self::S2pInitPlayer {
                    frame: header.frame,
                    client_index,
                    state: payload::decode_game_state(state_bytes)?,
                    events: payload::decode_game_events(events_bytes)?,
                }
            },
            TAG_PLAYER_PRESENCE => {
                Self::expect_size(header.payload_size as usize, 4 + 1, header.tag)?;
                let player_id = u32::from_be_bytes(body[0..4].try_into().expect("4 bytes"));
                let joined = body[4] != 0;
                Self::PlayerPresence {
                    frame: header.frame,
                    player_id,
                    joined,
                }
            },
            other => {
                return Err(NetcodeError::ProtocolViolation {
                    reason: format!("unknown message tag {other}"),
                })
            },
        };

        Ok((message, total_len))
    }

    fn expect_size(actual: usize, expected: usize, tag: u8) -> Result<(), NetcodeError> {
        if actual != expected {
            return Err(NetcodeError::ProtocolViolation {
                reason: format!("tag {tag}: payload_size {actual} != expected {expected}"),
            });
        }
        Ok(())
    }
}
