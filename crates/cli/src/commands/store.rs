// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listing, history, and verification
//!
//! With `--store DIR` these read a file store directly, which is how a
//! stopped daemon's logs are exported or checked. Without it, listing and
//! history go through the running daemon.

use std::path::{Path, PathBuf};

use anyhow::Result;
use wv_core::{DeltaRecord, Sha256VersionFactory, WaveletName, DEFAULT_HASH_BITS};
use wv_storage::{DeltaHistory, DeltaStore, FileDeltaStore};

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(clap::Args)]
pub struct WaveletsArgs {
    /// Read this store directory instead of asking the daemon
    #[arg(long)]
    pub store: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct HistoryArgs {
    pub wavelet: WaveletName,

    /// First version (must start a delta)
    #[arg(long, default_value_t = 0)]
    pub start: u64,

    /// Last version (must end a delta); defaults to the current version
    #[arg(long)]
    pub end: Option<u64>,

    /// Read this store directory instead of asking the daemon
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Hash width the store was written with
    #[arg(long, default_value_t = DEFAULT_HASH_BITS)]
    pub hash_bits: u32,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Only check this wavelet
    pub wavelet: Option<WaveletName>,

    /// Store directory to check
    #[arg(long)]
    pub store: PathBuf,

    /// Hash width the store was written with
    #[arg(long, default_value_t = DEFAULT_HASH_BITS)]
    pub hash_bits: u32,
}

pub fn wavelets_offline(dir: &Path, format: OutputFormat) -> Result<()> {
    let names = FileDeltaStore::open(dir)?.list_wavelets()?;
    print_wavelets(&names, format)
}

pub async fn wavelets(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let names = client.list_wavelets().await?;
    print_wavelets(&names, format)
}

fn print_wavelets(names: &[WaveletName], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => output::print_json(names)?,
        OutputFormat::Text if names.is_empty() => println!("No wavelets"),
        OutputFormat::Text => {
            for name in names {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

pub fn history_offline(args: &HistoryArgs, format: OutputFormat) -> Result<()> {
    let Some(dir) = &args.store else {
        anyhow::bail!("--store is required to read history offline");
    };
    let factory = Sha256VersionFactory::new(args.hash_bits)?;
    let store = FileDeltaStore::open(dir)?;
    let mut history = DeltaHistory::new(store.open(&args.wavelet)?, &factory);
    let end = args.end.unwrap_or_else(|| history.current_version());
    let records: Vec<DeltaRecord> = history
        .deltas_between(args.start, end)?
        .iter()
        .map(|r| r.as_ref().clone())
        .collect();
    history.close()?;
    print_history(&records, format)
}

pub async fn history(client: &DaemonClient, args: HistoryArgs, format: OutputFormat) -> Result<()> {
    let records = client.history(args.wavelet, args.start, args.end).await?;
    print_history(&records, format)
}

fn print_history(records: &[DeltaRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => output::print_json(records)?,
        OutputFormat::Text if records.is_empty() => println!("No deltas"),
        OutputFormat::Text => {
            for record in records {
                println!("{}", output::record_line(record));
            }
        }
    }
    Ok(())
}

/// Recompute every hash chain in the store; fails if any wavelet is broken
pub fn verify(args: VerifyArgs) -> Result<()> {
    let factory = Sha256VersionFactory::new(args.hash_bits)?;
    let store = FileDeltaStore::open(&args.store)?;
    let names = match args.wavelet {
        Some(name) => vec![name],
        None => store.list_wavelets()?,
    };

    let mut failures = 0;
    for name in &names {
        match verify_one(&store, name, &factory) {
            Ok((count, end)) => println!(
                "ok      {}  {} delta(s), ends at {}",
                name,
                count,
                output::signature(&end)
            ),
            Err(e) => {
                failures += 1;
                println!("FAILED  {}  {}", name, e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} wavelet(s) failed verification", failures, names.len());
    }
    Ok(())
}

fn verify_one(
    store: &FileDeltaStore,
    name: &WaveletName,
    factory: &Sha256VersionFactory,
) -> Result<(usize, wv_core::HashedVersion)> {
    let mut history = DeltaHistory::new(store.open(name)?, factory);
    let count = history.verify(factory)?;
    let end = history.end_version();
    history.close()?;
    Ok((count, end))
}
