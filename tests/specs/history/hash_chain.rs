//! Every version's hash commits to the whole history before it

use crate::prelude::*;
use wv_storage::{DeltaHistory, HistoryError};

fn record(target: &HashedVersion, ops: Vec<WaveletOperation>) -> DeltaRecord {
    DeltaRecord::commit(delta(ALICE, target, ops), &factory(), 1_000).unwrap()
}

/// alice joins, bob joins, carol joins
fn chain() -> Vec<DeltaRecord> {
    let first = record(&v0(), vec![add(ALICE)]);
    let second = record(first.resulting_version(), vec![add(BOB)]);
    let third = record(second.resulting_version(), vec![add(CAROL)]);
    vec![first, second, third]
}

fn history_of(records: Vec<DeltaRecord>) -> DeltaHistory {
    let store = MemoryDeltaStore::new();
    let mut history = DeltaHistory::new(store.open(&name()).unwrap(), &factory());
    history.append(records).unwrap();
    history
}

#[test]
fn rewriting_an_early_delta_changes_every_later_hash() {
    let honest = chain();

    let forged_first = record(&v0(), vec![add("mallory@example.com")]);
    let forged_second = record(forged_first.resulting_version(), vec![add(BOB)]);
    let forged_third = record(forged_second.resulting_version(), vec![add(CAROL)]);

    // Same versions, different hashes all the way up
    for (honest, forged) in honest.iter().zip([&forged_first, &forged_second, &forged_third]) {
        assert_eq!(
            honest.resulting_version().version(),
            forged.resulting_version().version()
        );
        assert_ne!(
            honest.resulting_version().history_hash(),
            forged.resulting_version().history_hash()
        );
    }
}

#[test]
fn hashes_are_truncated_to_the_configured_width() {
    let honest = chain();
    for record in &honest {
        assert_eq!(record.resulting_version().history_hash().len(), 20);
    }

    let wide = Sha256VersionFactory::new(256).unwrap();
    let recomputed = honest[0].recompute_resulting_version(&wide).unwrap();
    assert_eq!(recomputed.history_hash().len(), 32);
    assert!(recomputed
        .history_hash()
        .starts_with(honest[0].resulting_version().history_hash()));
}

#[test]
fn only_committed_signatures_are_recognized() {
    let honest = chain();
    let history = history_of(honest.clone());

    for record in &honest {
        assert!(history.has_signature(record.resulting_version()).unwrap());
    }
    let forged = HashedVersion::of(2, vec![0u8; 20]);
    assert!(!history.has_signature(&forged).unwrap());
    // A real hash at the wrong version is not a signature either
    let shifted = HashedVersion::of(1, honest[1].resulting_version().history_hash().to_vec());
    assert!(!history.has_signature(&shifted).unwrap());
}

#[test]
fn history_is_contiguous_and_verifies() {
    let history = history_of(chain());
    let records = history.deltas_between(0, 3).unwrap();

    let mut expected = v0();
    for record in &records {
        assert_eq!(record.applied_at(), &expected);
        expected = record.resulting_version().clone();
    }
    assert_eq!(history.end_version(), expected);
    assert_eq!(history.verify(&factory()).unwrap(), 3);
}

#[test]
fn appending_out_of_place_is_refused() {
    let honest = chain();
    let mut history = history_of(vec![honest[0].clone()]);

    let err = history.append(vec![honest[2].clone()]).unwrap_err();
    assert!(matches!(err, HistoryError::Discontiguous { .. }), "{err:?}");
    assert_eq!(history.current_version(), 1);
}

#[test]
fn verify_catches_a_rewritten_record() {
    let honest = chain();
    let tampered = DeltaRecord::new(
        honest[1].applied_at().clone(),
        wv_core::TransformedWaveletDelta::new(
            p(ALICE),
            honest[1].resulting_version().clone(),
            1_000,
            vec![add("mallory@example.com")],
        ),
    );
    let history = history_of(vec![honest[0].clone(), tampered, honest[2].clone()]);

    let err = history.verify(&factory()).unwrap_err();
    match err {
        HistoryError::HashMismatch { version, .. } => assert_eq!(version, 2),
        other => panic!("expected hash mismatch, got {other:?}"),
    }
}
