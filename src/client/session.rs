//! The client-side frame triad.
//!
//! Grounded on the teacher's `sessions/session_trait.rs`/`sessions/config.rs`
//! (a small plain-data struct the session logic reads and writes under its
//! own lock), reduced to exactly the fields spec.md §3 names.

use crate::config::MAX_FRAMES;

/// `sync_frame <= server_frame <= client_frame < sync_frame + BUF`.
///
/// Always accessed under the engine's `state_lock`; this type enforces
/// nothing on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Session {
    pub sync_frame: u32,
    pub server_frame: u32,
    pub client_frame: u32,
    pub client_index: u32,
}

impl Session {
    /// True while `client_frame` still has room to advance within the
    /// window. `false` means the client must stop predicting and back off.
    #[must_use]
    pub fn has_window_room(&self) -> bool {
        self.client_frame < self.sync_frame + MAX_FRAMES as u32
    }
}
