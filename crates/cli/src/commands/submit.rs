// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submit a client delta

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wv_core::{WaveletDelta, WaveletName};

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(clap::Args)]
pub struct SubmitArgs {
    /// Wavelet URI, e.g. wave://example.com/w+abc/conv+root
    pub wavelet: WaveletName,

    /// JSON file holding the delta ("-" reads stdin)
    #[arg(long, default_value = "-")]
    pub delta: PathBuf,
}

pub async fn handle(client: &DaemonClient, args: SubmitArgs, format: OutputFormat) -> Result<()> {
    let delta = read_delta(&args.delta)?;
    let committed = client.submit(args.wavelet, delta).await?;

    match format {
        OutputFormat::Json => output::print_json(&committed.record)?,
        OutputFormat::Text => {
            let note = if committed.duplicate {
                " (already committed)"
            } else {
                ""
            };
            println!(
                "Committed at {}{}",
                output::signature(committed.record.resulting_version()),
                note
            );
        }
    }
    Ok(())
}

fn read_delta(path: &Path) -> Result<WaveletDelta> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading delta from {}", path.display()))?
    };
    serde_json::from_str(&content).context("delta is not valid JSON")
}
