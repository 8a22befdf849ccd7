//! The lockstep client binary.
//!
//! Connects to a server, waits for the handshake, then ticks at
//! `config.tick_rate`, sampling a placeholder input each tick —
//! presentation and real input capture are out of scope for this crate.

use anyhow::Context;
use clap::Parser;
use lockstep_netcode::{Client, Config, PlayerInput};
use std::sync::atomic::Ordering;
use std::thread;

#[derive(Parser)]
struct Cli {
    /// Server host to connect to.
    #[arg(default_value = "127.0.0.1")]
    host: String,

    #[command(flatten)]
    config: Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let shutdown = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, std::sync::Arc::clone(&shutdown))
        .context("registering SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, std::sync::Arc::clone(&shutdown))
        .context("registering SIGTERM handler")?;

    let client = Client::connect(&cli.host, &cli.config).context("connecting to server")?;
    tracing::info!(host = %cli.host, port = cli.config.port, "connecting");
    client.wait_for_handshake();
    if client.is_shutdown() {
        anyhow::bail!("connection closed during handshake");
    }
    tracing::info!("handshake complete");

    let tick_interval = cli.config.tick_interval();
    while !client.is_shutdown() && !shutdown.load(Ordering::Acquire) {
        match client.tick_once(PlayerInput::default()) {
            Ok(_state) => {},
            Err(lockstep_netcode::NetcodeError::WindowOverflow { .. }) => {
                thread::sleep(tick_interval);
            },
            Err(err) => {
                tracing::error!(%err, "tick failed");
                break;
            },
        }
        thread::sleep(tick_interval);
    }

    client.request_shutdown();
    tracing::info!("client shut down");
    Ok(())
}
