//! The lockstep server binary.
//!
//! Thin wrapper around [`lockstep_netcode::server::Server`]: parse
//! argv, install a tracing subscriber, wire SIGINT/SIGTERM into a
//! shutdown flag, bind, and run until asked to stop.

use anyhow::Context;
use clap::Parser;
use lockstep_netcode::{Config, Server};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))
        .context("registering SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))
        .context("registering SIGTERM handler")?;

    let server = Server::bind(&config).context("binding server listener")?;
    tracing::info!(port = server.local_port(), "server ready");

    server.run(&shutdown).context("server run loop")?;

    tracing::info!("server shut down cleanly");
    Ok(())
}
