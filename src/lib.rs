//! Deterministic lockstep-with-rollback netcode core.
//!
//! This crate implements the network-facing half of a multiplayer game:
//! a fixed-capacity per-peer frame ring ([`frame_ring`]), a binary wire
//! protocol over a reliable ordered stream ([`wire`]), a server that
//! accepts connections and drives a single authoritative simulation in
//! lockstep with its clients ([`server`]), and a client that predicts
//! locally ahead of the server and reconciles on receipt of authoritative
//! frame events ([`client`]).
//!
//! Presentation, input capture, and the actual game rules are out of
//! scope; [`sim::simulate`] is the one seam both sides call into, and it
//! must be pure and deterministic for any of the above to mean anything.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod config;
pub mod error;
pub mod frame_ring;
pub mod server;
pub mod sim;
pub mod telemetry;
pub mod types;
pub mod wire;

pub use client::{Client, ClientEngine};
pub use config::Config;
pub use error::{NetcodeError, NetcodeResult};
pub use frame_ring::FrameRing;
pub use server::{Server, ServerSynchronizer};
pub use types::{GameEvents, GameState, PlayerEvent, PlayerInput};
