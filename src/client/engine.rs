//! The client reconciliation engine.
//!
//! Grounded directly on the teacher's `sync_layer/mod.rs` — the single
//! closest 1:1 mapping in the whole teacher crate: its `add_local_input` +
//! `advance_frame` is this module's [`ClientEngine::tick`], and its
//! rollback-and-resimulate path on receiving a confirmed frame is
//! [`ClientEngine::on_frame_events`]'s two-phase reconcile.

use crate::config::MAX_FRAMES;
use crate::error::NetcodeError;
use crate::frame_ring::FrameRing;
use crate::client::session::Session;
use crate::report_violation;
use crate::sim;
use crate::telemetry::{ViolationKind, ViolationSeverity};
use crate::types::{GameEvents, GameState, PlayerInput};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

struct EngineState {
    ring: FrameRing,
    session: Session,
}

/// Owns the client-side [`FrameRing`], the frame triad, and the
/// handshake/connection flags. One mutex (`state`) protects the ring and
/// the triad together, matching spec.md §5's single `state_lock` per side.
pub struct ClientEngine {
    state: Mutex<EngineState>,
    is_connected: AtomicBool,
    is_initialised: AtomicBool,
    to_shutdown: AtomicBool,
}

impl Default for ClientEngine {
    fn default() -> Self {
        Self {
            state: Mutex::new(EngineState {
                ring: FrameRing::default(),
                session: Session::default(),
            }),
            is_connected: AtomicBool::new(false),
            is_initialised: AtomicBool::new(false),
            to_shutdown: AtomicBool::new(false),
        }
    }
}

impl ClientEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_initialised(&self) -> bool {
        self.is_initialised.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Acquire)
    }

    pub fn request_shutdown(&self) {
        self.to_shutdown.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.to_shutdown.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.state.lock().session
    }

    /// Handles `S2P_INIT_PLAYER`: the handshake. Sets `sync = server =
    /// client = frame`, seeds the ring, publishes `is_initialised` with
    /// release ordering so the tick loop's acquire-load sees every write
    /// that happened before it.
    pub fn on_init_player(&self, frame: u32, client_index: u32, state: GameState, events: GameEvents) {
        {
            let mut guard = self.state.lock();
            guard.ring.init(frame);
            *guard.ring.state_at(frame) = state;
            *guard.ring.events_at(frame) = events;
            guard.session = Session {
                sync_frame: frame,
                server_frame: frame,
                client_frame: frame,
                client_index,
            };
        }
        self.is_connected.store(true, Ordering::Release);
        self.is_initialised.store(true, Ordering::Release);
    }

    /// The steady-state predicted tick: sample `input` into the current
    /// frame, simulate one step forward, advance `client_frame`. Returns
    /// the frame number the input was for (to send as `P2S_INPUT`) and the
    /// freshly predicted next state (to render).
    ///
    /// Returns [`NetcodeError::WindowOverflow`] if the client has run `BUF`
    /// frames ahead of `sync_frame` without the server catching up; the
    /// caller should back off (sleep) and retry rather than treat this as
    /// fatal.
    pub fn tick(&self, input: PlayerInput) -> Result<(u32, GameState), NetcodeError> {
        let mut guard = self.state.lock();
        if !guard.session.has_window_room() {
            let bound = guard.session.sync_frame + MAX_FRAMES as u32;
            return Err(NetcodeError::WindowOverflow {
                frame: guard.session.client_frame,
                bound,
            });
        }

        let frame = guard.session.client_frame;
        let client_index = guard.session.client_index as usize;
        guard.ring.events_at(frame).player_inputs[client_index] = input;

        let current_state = *guard.ring.state(frame);
        let current_events = *guard.ring.events(frame);
        let mut next = GameState::default();
        sim::simulate(&current_state, &current_events, &mut next);
        *guard.ring.state_at(frame + 1) = next;
        guard.session.client_frame = frame + 1;

        Ok((frame, next))
    }

    /// Handles `S2P_FRAME_EVENTS(frame, events)`: the reconciliation path.
    ///
    /// On the normal case (`frame == server_frame + 1`): records the
    /// authoritative events, then two-phase reconciles —
    /// sync->server re-simulates with the now-authoritative events
    /// (overwriting predicted states), then server->client resimulates
    /// using the client's own previously-stored predicted inputs for
    /// frames the server hasn't caught up to yet.
    ///
    /// Out-of-order frames are dropped unless `frame == server_frame`: the
    /// very first authoritative broadcast a client sees after handshake
    /// always carries the frame the server had already simulated at join
    /// time, which is the triad's `server_frame` as set by
    /// [`Self::on_init_player`] — `0` for a client that joined from
    /// scratch, but some `F > 0` for one that joined mid-session. That case
    /// is processed the same as the normal one, just without the
    /// sequencing check.
    pub fn on_frame_events(&self, frame: u32, events: GameEvents) {
        let mut guard = self.state.lock();
        let server_frame = guard.session.server_frame;
        let expected = server_frame + 1;

        if frame != expected {
            if frame == server_frame {
                report_violation!(
                    ViolationSeverity::Warning,
                    ViolationKind::OutOfOrderFrame,
                    "accepting first post-handshake confirmation for frame {frame} (expected {expected})"
                );
            } else {
                report_violation!(
                    ViolationSeverity::Warning,
                    ViolationKind::OutOfOrderFrame,
                    "expected frame {expected}, got {frame}, dropped"
                );
                return;
            }
        }

        *guard.ring.events_at(frame) = events;
        guard.session.server_frame = frame;

        let sync_frame = guard.session.sync_frame;
        let server_frame = guard.session.server_frame;
        for i in sync_frame..server_frame {
            Self::resimulate_one(&mut guard.ring, i);
        }
        guard.session.sync_frame = server_frame;

        let client_frame = guard.session.client_frame;
        for i in server_frame..client_frame {
            Self::resimulate_one(&mut guard.ring, i);
        }
    }

    fn resimulate_one(ring: &mut FrameRing, frame: u32) {
        let current_state = *ring.state(frame);
        let current_events = *ring.events(frame);
        let mut next = GameState::default();
        sim::simulate(&current_state, &current_events, &mut next);
        *ring.state_at(frame + 1) = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlayerEvent;

    fn joined_state() -> GameState {
        let mut state = GameState::default();
        state.players[0] = crate::types::PlayerData {
            x: 400.0,
            y: 400.0,
            active: true,
        };
        state
    }

    #[test]
    fn handshake_sets_triad_and_initialised_flag() {
        let engine = ClientEngine::new();
        assert!(!engine.is_initialised());
        engine.on_init_player(5, 2, GameState::default(), GameEvents::default());
        assert!(engine.is_initialised());
        assert!(engine.is_connected());
        let session = engine.session();
        assert_eq!(session.sync_frame, 5);
        assert_eq!(session.server_frame, 5);
        assert_eq!(session.client_frame, 5);
        assert_eq!(session.client_index, 2);
    }

    #[test]
    fn scenario_a_single_client_first_frame() {
        let engine = ClientEngine::new();
        engine.on_init_player(0, 0, GameState::default(), GameEvents::default());

        let (sent_frame, predicted) = engine.tick(PlayerInput::default()).expect("tick");
        assert_eq!(sent_frame, 0);
        assert!(!predicted.players[0].active);

        let mut events = GameEvents::default();
        events.player_events[0] = PlayerEvent::Join;
        engine.on_frame_events(0, events);

        // Only one authoritative message (frame 0) has arrived so far, so
        // the triad's confirmed marker sits at 0; client_frame is untouched
        // by the receive path.
        let session = engine.session();
        assert_eq!(session.sync_frame, 0);
        assert_eq!(session.server_frame, 0);
        assert_eq!(session.client_frame, 1);
    }

    #[test]
    fn scenario_b_two_clients_one_moves_right() {
        let engine = ClientEngine::new();
        let mut init_events = GameEvents::default();
        init_events.player_events[0] = PlayerEvent::None;
        engine.on_init_player(0, 0, joined_state(), GameEvents::default());
        {
            let mut guard = engine.state.lock();
            guard.ring.state_at(0).players[1] = crate::types::PlayerData {
                x: 400.0,
                y: 400.0,
                active: true,
            };
        }

        engine.tick(PlayerInput::default()).expect("tick");

        let mut events = GameEvents::default();
        events.player_inputs[0].right = true;
        engine.on_frame_events(0, events);

        let state = {
            let guard = engine.state.lock();
            *guard.ring.state(1)
        };
        assert_eq!(state.players[0].x, 401.0);
        assert_eq!(state.players[1].x, 400.0);
    }

    #[test]
    fn window_overflow_when_buf_frames_ahead() {
        let engine = ClientEngine::new();
        engine.on_init_player(0, 0, GameState::default(), GameEvents::default());
        for _ in 0..MAX_FRAMES {
            engine.tick(PlayerInput::default()).expect("tick within window");
        }
        let err = engine.tick(PlayerInput::default()).unwrap_err();
        assert!(matches!(err, NetcodeError::WindowOverflow { .. }));
    }

    #[test]
    fn reconcile_with_server_frame_equal_sync_frame_is_a_no_op() {
        let engine = ClientEngine::new();
        engine.on_init_player(0, 0, GameState::default(), GameEvents::default());
        // client_frame == server_frame == sync_frame == 0: both reconcile
        // ranges are empty, so this must not touch state[1] at all.
        engine.on_frame_events(0, GameEvents::default());
        let state = {
            let guard = engine.state.lock();
            *guard.ring.state(1)
        };
        assert_eq!(state, GameState::default());
    }

    #[test]
    fn scenario_c_rollback_on_mispredict() {
        let engine = ClientEngine::new();
        engine.on_init_player(0, 0, joined_state(), GameEvents::default());
        {
            let mut guard = engine.state.lock();
            guard.ring.state_at(0).players[1] = crate::types::PlayerData {
                x: 400.0,
                y: 400.0,
                active: true,
            };
        }

        // Client predicts 3 frames of all-zero input for both players.
        engine.tick(PlayerInput::default()).expect("tick 0"); // client_frame -> 1
        engine.tick(PlayerInput::default()).expect("tick 1"); // client_frame -> 2
        engine.tick(PlayerInput::default()).expect("tick 2"); // client_frame -> 3

        // Authoritative frame 0 arrives: client 1 actually held Down.
        let mut authoritative = GameEvents::default();
        authoritative.player_inputs[1].down = true;
        engine.on_frame_events(0, authoritative);

        let session = engine.session();
        assert_eq!(session.sync_frame, 0);
        assert_eq!(session.server_frame, 0);
        assert_eq!(session.client_frame, 3);

        let final_state = {
            let guard = engine.state.lock();
            *guard.ring.state(3)
        };
        assert_eq!(final_state.players[1].y, 401.0);
    }

    #[test]
    fn late_join_accepts_first_frame_events_at_server_frame() {
        let engine = ClientEngine::new();
        // Handshake mid-session: server was already at frame 5 when this
        // client joined.
        engine.on_init_player(5, 1, joined_state(), GameEvents::default());
        let session = engine.session();
        assert_eq!(session.sync_frame, 5);
        assert_eq!(session.server_frame, 5);

        // The first broadcast this client receives carries that same
        // frame, not frame 6 — it must not be dropped as out-of-order.
        let mut events = GameEvents::default();
        events.player_events[0] = PlayerEvent::Join;
        engine.on_frame_events(5, events);

        let session = engine.session();
        assert_eq!(session.sync_frame, 5);
        assert_eq!(session.server_frame, 5);
    }

    #[test]
    fn determinism_repeated_reconcile_from_same_inputs_matches() {
        let a = ClientEngine::new();
        let b = ClientEngine::new();
        for engine in [&a, &b] {
            engine.on_init_player(0, 0, joined_state(), GameEvents::default());
            engine.tick(PlayerInput::default()).expect("tick");
            let mut events = GameEvents::default();
            events.player_inputs[0].up = true;
            engine.on_frame_events(0, events);
        }
        let state_a = { let g = a.state.lock(); *g.ring.state(1) };
        let state_b = { let g = b.state.lock(); *g.ring.state(1) };
        assert_eq!(state_a.players[0].y.to_bits(), state_b.players[0].y.to_bits());
    }
}
