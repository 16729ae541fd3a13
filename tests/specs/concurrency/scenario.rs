//! Two clients based at version zero, committed one after the other

use crate::prelude::*;

#[tokio::test]
async fn concurrent_adds_commit_in_order_with_chained_hashes() {
    let registry = memory_registry();

    let from_a = delta(ALICE, &v0(), vec![add(ALICE)]);
    let h1 = expected_version(&from_a);
    let a = commit(&registry, from_a).await;
    assert_eq!(a.applied_at(), &v0());
    assert_eq!(a.resulting_version(), &h1);
    assert_eq!(h1.version(), 1);

    // B still thinks the wavelet is at version zero
    let b = commit(&registry, delta(BOB, &v0(), vec![add(BOB)])).await;
    let rebased = delta(BOB, &h1, vec![add(BOB)]);
    let h2 = expected_version(&rebased);
    assert_eq!(b.applied_at(), &h1);
    assert_eq!(b.resulting_version(), &h2);
    assert_eq!(b.committed_delta(), rebased);
    assert_eq!(h2.version(), 2);

    assert_eq!(registry.history(&name(), 0, Some(1)).await.unwrap(), vec![a.clone()]);
    assert_eq!(registry.history(&name(), 1, Some(2)).await.unwrap(), vec![b.clone()]);

    let reopened = registry.reopen(&name(), &[v0()]).await.unwrap().unwrap();
    assert_eq!(reopened.start_signature, v0());
    assert_eq!(
        reopened.deltas,
        vec![a.transformed().clone(), b.transformed().clone()]
    );

    let snapshot = registry.get_or_load(&name()).await.unwrap().snapshot().await;
    assert_eq!(snapshot.participants(), &[p(ALICE), p(BOB)]);
    assert_eq!(snapshot.version(), &h2);
    assert_eq!(snapshot.creator(), Some(&p(ALICE)));
}

#[tokio::test]
async fn simultaneous_submissions_serialize() {
    let registry = memory_registry();

    let wavelet = name();
    let (a, b) = tokio::join!(
        registry.submit(&wavelet, delta(ALICE, &v0(), vec![add(ALICE)])),
        registry.submit(&wavelet, delta(BOB, &v0(), vec![add(BOB)])),
    );
    let (a, b) = (a.unwrap().record, b.unwrap().record);

    let (first, second) = if a.applied_at() == &v0() { (a, b) } else { (b, a) };
    assert_eq!(first.applied_at(), &v0());
    assert_eq!(second.applied_at(), first.resulting_version());
    assert_eq!(second.resulting_version().version(), 2);
}
