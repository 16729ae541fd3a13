//! Concurrent deltas that touch the same state

use crate::prelude::*;

/// Alice and Bob join, then Alice writes "hello world"
async fn seeded() -> (WaveletRegistry<FakeClock>, HashedVersion) {
    let registry = memory_registry();
    let joined = commit(&registry, delta(ALICE, &v0(), vec![add(ALICE), add(BOB)])).await;
    let written = commit(
        &registry,
        delta(
            ALICE,
            joined.resulting_version(),
            vec![edit(DocOp::new().insert("hello world"))],
        ),
    )
    .await;
    (registry, written.resulting_version().clone())
}

fn delete_world() -> WaveletOperation {
    edit(DocOp::new().retain(6).delete("world"))
}

#[tokio::test]
async fn deleting_the_same_range_twice_leaves_a_retain() {
    let (registry, base) = seeded().await;

    let first = commit(&registry, delta(ALICE, &base, vec![delete_world()])).await;
    let second = commit(&registry, delta(BOB, &base, vec![delete_world()])).await;

    // Bob's delete lands on text that is already gone
    assert_eq!(second.applied_at(), first.resulting_version());
    assert_eq!(second.ops(), &[edit(DocOp::new().retain(6))]);
    assert!(second.ops()[0].is_noop());

    let snapshot = registry.get_or_load(&name()).await.unwrap().snapshot().await;
    assert_eq!(snapshot.document(BLIP), "hello ");
    assert_eq!(snapshot.version().version(), base.version() + 2);
}

#[tokio::test]
async fn adding_the_same_participant_twice_keeps_one() {
    let (registry, base) = seeded().await;

    commit(&registry, delta(ALICE, &base, vec![add(CAROL)])).await;
    let second = commit(&registry, delta(BOB, &base, vec![add(CAROL)])).await;

    assert_eq!(second.ops(), &[WaveletOperation::NoOp]);
    let snapshot = registry.get_or_load(&name()).await.unwrap().snapshot().await;
    assert_eq!(snapshot.participants(), &[p(ALICE), p(BOB), p(CAROL)]);
}

#[tokio::test]
async fn add_against_remove_of_the_same_participant_is_rejected() {
    let (registry, base) = seeded().await;

    let removed = commit(&registry, delta(ALICE, &base, vec![remove(BOB)])).await;
    let result = registry
        .submit(&name(), delta(CAROL, &base, vec![add(BOB)]))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, SubmitError::Transform(_)), "{err:?}");
    assert!(err.is_client_error());

    // Nothing was appended and the wavelet stays writable
    let container = registry.get_or_load(&name()).await.unwrap();
    assert_eq!(&container.end_version().await, removed.resulting_version());
    let retry = delta(CAROL, removed.resulting_version(), vec![add(BOB)]);
    assert!(registry.submit(&name(), retry).await.is_ok());
}

#[tokio::test]
async fn insert_at_the_same_spot_puts_the_earlier_commit_first() {
    let (registry, base) = seeded().await;

    commit(
        &registry,
        delta(ALICE, &base, vec![edit(DocOp::new().retain(11).insert("!"))]),
    )
    .await;
    commit(
        &registry,
        delta(BOB, &base, vec![edit(DocOp::new().retain(11).insert("?"))]),
    )
    .await;

    let snapshot = registry.get_or_load(&name()).await.unwrap().snapshot().await;
    assert_eq!(snapshot.document(BLIP), "hello world!?");
}
