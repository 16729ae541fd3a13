// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;
use wv_core::version::hex_encode;
use wv_core::{DeltaRecord, HashedVersion, TransformedWaveletDelta};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Full `VERSION:HASH` form, accepted back by `wv reopen --known`
pub fn signature(version: &HashedVersion) -> String {
    format!("{}:{}", version.version(), hex_encode(version.history_hash()))
}

/// One line per committed record
pub fn record_line(record: &DeltaRecord) -> String {
    format!(
        "{:>8} -> {:<8} {:<28} {:>3} op(s)  {}",
        record.applied_at().version(),
        record.resulting_version().version(),
        record.author().to_string(),
        record.ops().len(),
        signature(record.resulting_version()),
    )
}

/// One line per catch-up delta
pub fn transformed_line(delta: &TransformedWaveletDelta) -> String {
    format!(
        "{:>8} -> {:<8} {:<28} {:>3} op(s)  {}",
        delta.applied_at_version(),
        delta.resulting_version().version(),
        delta.author().to_string(),
        delta.ops().len(),
        signature(delta.resulting_version()),
    )
}
