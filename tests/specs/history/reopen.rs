//! Reconnecting clients catch up from the newest signature they share

use crate::prelude::*;

/// Three committed deltas; returns the registry and each resulting version
async fn seeded() -> (WaveletRegistry<FakeClock>, Vec<HashedVersion>) {
    let registry = memory_registry();
    let mut versions = vec![v0()];
    for who in [ALICE, BOB, CAROL] {
        let target = versions.last().unwrap().clone();
        let record = commit(&registry, delta(who, &target, vec![add(who)])).await;
        versions.push(record.resulting_version().clone());
    }
    (registry, versions)
}

fn forged(version: u64) -> HashedVersion {
    HashedVersion::of(version, vec![0xAB; 20])
}

#[tokio::test]
async fn reopen_is_idempotent() {
    let (registry, versions) = seeded().await;
    let known = [versions[1].clone()];

    let first = registry.reopen(&name(), &known).await.unwrap();
    let second = registry.reopen(&name(), &known).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.unwrap().deltas.len(), 2);
}

#[tokio::test]
async fn newest_recognized_signature_wins() {
    let (registry, versions) = seeded().await;

    let reopened = registry
        .reopen(&name(), &[v0(), versions[1].clone(), versions[2].clone()])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.start_signature, versions[2]);
    assert_eq!(reopened.deltas.len(), 1);
    assert_eq!(reopened.deltas[0].resulting_version(), &versions[3]);
}

#[tokio::test]
async fn unknown_signatures_are_not_recognized() {
    let (registry, _) = seeded().await;

    assert_eq!(registry.reopen(&name(), &[forged(2)]).await.unwrap(), None);
    assert_eq!(registry.reopen(&name(), &[]).await.unwrap(), None);
    // Version zero must carry the real hash too
    assert_eq!(registry.reopen(&name(), &[forged(0)]).await.unwrap(), None);
}

#[tokio::test]
async fn forged_newest_signature_falls_back_to_an_older_one() {
    let (registry, versions) = seeded().await;

    let reopened = registry
        .reopen(&name(), &[v0(), forged(3)])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.start_signature, v0());
    assert_eq!(reopened.deltas.len(), 3);
    assert_eq!(reopened.deltas[2].resulting_version(), &versions[3]);
}

#[tokio::test]
async fn reopen_at_the_end_returns_nothing_new() {
    let (registry, versions) = seeded().await;

    let reopened = registry
        .reopen(&name(), &[versions[3].clone()])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.start_signature, versions[3]);
    assert!(reopened.deltas.is_empty());
}

#[tokio::test]
async fn later_commits_show_up_on_the_next_reopen() {
    let (registry, versions) = seeded().await;
    let known = [versions[3].clone()];
    let before = registry.reopen(&name(), &known).await.unwrap().unwrap();

    let extra = commit(
        &registry,
        delta(ALICE, &versions[3], vec![edit(DocOp::new().insert("hi"))]),
    )
    .await;

    let after = registry.reopen(&name(), &known).await.unwrap().unwrap();
    assert_ne!(before, after);
    assert_eq!(after.deltas, vec![extra.transformed().clone()]);
}
