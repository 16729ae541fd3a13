// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by the backend tests

use wv_core::{
    DeltaRecord, HashedVersion, HashedVersionFactory, ParticipantId, Sha256VersionFactory,
    WaveletDelta, WaveletName, WaveletOperation,
};

pub(crate) fn name() -> WaveletName {
    WaveletName::of("example.com", "w+abc", "conv+root").unwrap()
}

pub(crate) fn factory() -> Sha256VersionFactory {
    Sha256VersionFactory::default()
}

pub(crate) fn v0() -> HashedVersion {
    factory().create_version_zero(&name())
}

fn participant(i: usize) -> ParticipantId {
    ParticipantId::new(format!("user{}@example.com", i)).unwrap()
}

/// Commit a delta of `ops` participant additions on top of `previous`
pub(crate) fn next_record(previous: &HashedVersion, ops: usize) -> DeltaRecord {
    let base = previous.version() as usize;
    let ops = (0..ops)
        .map(|i| WaveletOperation::add_participant(participant(base + i)))
        .collect();
    let delta = WaveletDelta::new(participant(0), previous.clone(), ops);
    DeltaRecord::commit(delta, &factory(), 1_000 + base as i64).unwrap()
}

/// A valid chain of `len` records from version zero, alternating 1 and 2 ops
pub(crate) fn chain(len: usize) -> Vec<DeltaRecord> {
    let mut records: Vec<DeltaRecord> = Vec::new();
    let mut end = v0();
    for i in 0..len {
        let record = next_record(&end, 1 + i % 2);
        end = record.resulting_version().clone();
        records.push(record);
    }
    records
}
