// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commands that inspect or control a running daemon

use anyhow::Result;
use wv_core::WaveletName;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn status(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let protocol = client.hello().await?;
    let (uptime_secs, wavelets) = client.status().await?;

    if let OutputFormat::Json = format {
        return output::print_json(&serde_json::json!({
            "socket": client.socket_path(),
            "protocol": protocol,
            "uptime_secs": uptime_secs,
            "wavelets": wavelets,
        }));
    }

    println!("Daemon: {}", client.socket_path().display());
    println!("  Protocol: {}", protocol);
    println!("  Uptime: {}s", uptime_secs);
    if wavelets.is_empty() {
        println!("  No wavelets loaded");
        return Ok(());
    }
    println!(
        "  {:<48} {:>8} {:>6} {:>6}  STATE",
        "WAVELET", "VERSION", "PEOPLE", "DOCS"
    );
    for status in wavelets {
        let state = match &status.corrupted {
            Some(reason) => format!("read-only ({})", reason),
            None => "ok".to_string(),
        };
        println!(
            "  {:<48} {:>8} {:>6} {:>6}  {}",
            status.name.to_string(),
            status.version.version(),
            status.participants,
            status.documents,
            state
        );
    }
    Ok(())
}

pub async fn stop(client: &DaemonClient) -> Result<()> {
    client.shutdown().await?;
    println!("Daemon stopping");
    Ok(())
}

pub async fn evict(client: &DaemonClient, wavelet: WaveletName) -> Result<()> {
    if client.evict(wavelet.clone()).await? {
        println!("Evicted {}", wavelet);
    } else {
        println!("{} was not loaded", wavelet);
    }
    Ok(())
}
