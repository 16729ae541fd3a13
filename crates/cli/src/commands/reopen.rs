// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catch up from the signatures a client holds

use anyhow::Result;
use wv_core::version::hex_decode;
use wv_core::{HashedVersion, WaveletName};

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(clap::Args)]
pub struct ReopenArgs {
    pub wavelet: WaveletName,

    /// Known signature as VERSION:HEXHASH, oldest first (repeatable)
    #[arg(long = "known", value_parser = parse_signature, required = true)]
    pub known: Vec<HashedVersion>,
}

pub async fn handle(client: &DaemonClient, args: ReopenArgs, format: OutputFormat) -> Result<()> {
    let Some((start, deltas)) = client.reopen(args.wavelet.clone(), args.known).await? else {
        anyhow::bail!(
            "none of the given signatures belong to {}; resynchronize from a snapshot",
            args.wavelet
        );
    };

    match format {
        OutputFormat::Json => output::print_json(&serde_json::json!({
            "start_signature": start,
            "deltas": deltas,
        }))?,
        OutputFormat::Text => {
            println!("Recognized {}", output::signature(&start));
            if deltas.is_empty() {
                println!("Up to date");
            }
            for delta in &deltas {
                println!("{}", output::transformed_line(delta));
            }
        }
    }
    Ok(())
}

/// Parse `VERSION:HEXHASH`
pub fn parse_signature(s: &str) -> Result<HashedVersion, String> {
    let (version, hash) = s
        .split_once(':')
        .ok_or_else(|| format!("expected VERSION:HASH, got {:?}", s))?;
    let version = version
        .parse::<u64>()
        .map_err(|e| format!("bad version {:?}: {}", version, e))?;
    let hash = hex_decode(hash).ok_or_else(|| format!("bad hex hash {:?}", hash))?;
    Ok(HashedVersion::of(version, hash))
}

#[cfg(test)]
#[path = "reopen_tests.rs"]
mod tests;
