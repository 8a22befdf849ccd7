//! The client binary's core: connects a socket to [`engine::ClientEngine`].
//!
//! Grounded on the teacher's `sessions/session_trait.rs` for the "one
//! struct owns the session, exposes `advance_frame`/`add_local_input`"
//! shape; the receiver-thread split is grounded on `other_examples`'
//! socket-client code.

pub mod engine;
pub mod session;

pub use engine::ClientEngine;
pub use session::Session;

use crate::config::Config;
use crate::error::NetcodeError;
use crate::report_violation;
use crate::telemetry::{ViolationKind, ViolationSeverity};
use crate::types::{GameState, PlayerInput};
use crate::wire::{self, Message};
use parking_lot::Mutex;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Owns the socket and the [`ClientEngine`], and runs the receiver thread
/// that feeds inbound messages to it.
pub struct Client {
    engine: Arc<ClientEngine>,
    writer: Arc<Mutex<TcpStream>>,
}

impl Client {
    /// Connects to `host:port` and starts the receiver thread. Does not
    /// block for the handshake; call [`Client::wait_for_handshake`] before
    /// ticking.
    pub fn connect(host: &str, config: &Config) -> Result<Self, NetcodeError> {
        let stream = TcpStream::connect((host, config.port))?;
        let reader = stream.try_clone()?;
        let writer = Arc::new(Mutex::new(stream));
        let engine = Arc::new(ClientEngine::new());

        let recv_engine = Arc::clone(&engine);
        thread::spawn(move || Self::receive_loop(&recv_engine, reader));

        Ok(Self { engine, writer })
    }

    fn receive_loop(engine: &Arc<ClientEngine>, mut reader: TcpStream) {
        loop {
            if engine.is_shutdown() {
                return;
            }
            match wire::read_message(&mut reader) {
                Ok(Message::S2pInitPlayer { frame, client_index, state, events }) => {
                    engine.on_init_player(frame, client_index, state, events);
                },
                Ok(Message::S2pFrameEvents { frame, events }) => {
                    engine.on_frame_events(frame, events);
                },
                Ok(Message::PlayerPresence { player_id, joined, .. }) => {
                    tracing::info!(player_id, joined, "player presence update");
                },
                Ok(other) => {
                    report_violation!(
                        ViolationSeverity::Error,
                        ViolationKind::Protocol,
                        "unexpected message on client ingress: {other:?}"
                    );
                    engine.request_shutdown();
                    return;
                },
                Err(_) => {
                    engine.request_shutdown();
                    return;
                },
            }
        }
    }

    /// Blocks (with a short poll interval) until the handshake completes.
    pub fn wait_for_handshake(&self) {
        while !self.engine.is_initialised() && !self.engine.is_shutdown() {
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// One steady-state tick: predicts locally, sends the resulting input
    /// upstream, and returns the predicted state to render. On window
    /// overflow, the caller should back off instead of treating this as
    /// fatal (spec.md §5's backpressure policy).
    pub fn tick_once(&self, input: PlayerInput) -> Result<GameState, NetcodeError> {
        let (frame, next_state) = self.engine.tick(input)?;
        let client_index = self.engine.session().client_index;
        let msg = Message::P2sInput { frame, client_index, input };
        wire::write_message(&mut *self.writer.lock(), &msg)?;
        Ok(next_state)
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<ClientEngine> {
        &self.engine
    }

    pub fn request_shutdown(&self) {
        self.engine.request_shutdown();
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.engine.is_shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameEvents, PlayerEvent};
    use std::net::TcpListener;

    #[test]
    fn connect_handshake_then_one_tick_round_trips() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let port = listener.local_addr().expect("local addr").port();

        let server_thread = thread::spawn(move || {
            let (mut server_stream, _) = listener.accept().expect("accept");
            wire::write_message(
                &mut server_stream,
                &Message::S2pInitPlayer {
                    frame: 0,
                    client_index: 0,
                    state: GameState::default(),
                    events: GameEvents::default(),
                },
            )
            .expect("send init");

            let msg = wire::read_message(&mut server_stream).expect("read input");
            assert!(matches!(msg, Message::P2sInput { frame: 0, client_index: 0, .. }));

            let mut events = GameEvents::default();
            events.player_events[0] = PlayerEvent::Join;
            wire::write_message(&mut server_stream, &Message::S2pFrameEvents { frame: 0, events })
                .expect("send frame events");
        });

        let client = Client::connect("127.0.0.1", &Config { port, ..Config::default() }).expect("connect");
        client.wait_for_handshake();
        assert!(client.engine().is_initialised());

        let predicted = client.tick_once(PlayerInput::default()).expect("tick");
        assert!(!predicted.players[0].active);

        // Give the receiver thread a moment to apply the authoritative
        // frame-events message sent by the fake server above.
        thread::sleep(Duration::from_millis(50));
        let session = client.engine().session();
        assert_eq!(session.server_frame, 0);

        server_thread.join().expect("join fake server");
    }
}
