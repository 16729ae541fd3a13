// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wv - wavelet store CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{daemon, reopen, store, submit};
use wv_core::WaveletName;

use crate::client::{resolve_socket, DaemonClient};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "wv",
    version,
    about = "wv - submit, replay, and audit wavelet deltas"
)]
struct Cli {
    /// Daemon socket (defaults to the one in the daemon's config)
    #[arg(long, global = true, env = "WV_SOCKET")]
    socket: Option<PathBuf>,

    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the daemon and its loaded wavelets
    Status,
    /// Ask the daemon to shut down
    Stop,
    /// Submit a delta (JSON) to a wavelet
    Submit(submit::SubmitArgs),
    /// Fetch the deltas committed after a known signature
    Reopen(reopen::ReopenArgs),
    /// Unload a wavelet from the daemon
    Evict { wavelet: WaveletName },
    /// List wavelets
    Wavelets(store::WaveletsArgs),
    /// Show committed deltas of a wavelet
    History(store::HistoryArgs),
    /// Recompute hash chains of a store directory
    Verify(store::VerifyArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();
    let format = cli.output;

    // Offline commands read the store directly and never need the daemon
    match cli.command {
        Commands::Verify(args) => store::verify(args),
        Commands::Wavelets(store::WaveletsArgs { store: Some(dir) }) => {
            store::wavelets_offline(&dir, format)
        }
        Commands::History(args @ store::HistoryArgs { store: Some(_), .. }) => {
            store::history_offline(&args, format)
        }
        command => {
            let client = DaemonClient::connect(resolve_socket(cli.socket)?)?;
            run(&client, command, format).await
        }
    }
}

async fn run(client: &DaemonClient, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Status => daemon::status(client, format).await,
        Commands::Stop => daemon::stop(client).await,
        Commands::Submit(args) => submit::handle(client, args, format).await,
        Commands::Reopen(args) => reopen::handle(client, args, format).await,
        Commands::Evict { wavelet } => daemon::evict(client, wavelet).await,
        Commands::Wavelets(_) => store::wavelets(client, format).await,
        Commands::History(args) => store::history(client, args, format).await,
        Commands::Verify(args) => store::verify(args),
    }
}

/// Log to stderr; quiet unless RUST_LOG says otherwise
fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
