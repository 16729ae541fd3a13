//! Committed deltas survive a restart; torn writes do not

use crate::prelude::*;
use std::io::Write;
use tempfile::TempDir;

fn file_registry(dir: &TempDir) -> WaveletRegistry<FakeClock> {
    registry(Arc::new(FileDeltaStore::open(dir.path()).unwrap()))
}

/// Alice joins, then writes "hello"; returns the end version
async fn seed(registry: &WaveletRegistry<FakeClock>) -> HashedVersion {
    let joined = commit(registry, delta(ALICE, &v0(), vec![add(ALICE)])).await;
    let written = commit(
        registry,
        delta(
            ALICE,
            joined.resulting_version(),
            vec![edit(DocOp::new().insert("hello"))],
        ),
    )
    .await;
    written.resulting_version().clone()
}

#[tokio::test]
async fn reloaded_wavelet_continues_where_it_stopped() {
    let dir = TempDir::new().unwrap();
    let end = {
        let registry = file_registry(&dir);
        let end = seed(&registry).await;
        registry.shutdown().await;
        end
    };

    let registry = file_registry(&dir);
    assert_eq!(registry.list_wavelets().unwrap(), vec![name()]);
    let container = registry.get_or_load(&name()).await.unwrap();
    assert_eq!(container.end_version().await, end);

    let snapshot = container.snapshot().await;
    assert_eq!(snapshot.document(BLIP), "hello");
    assert_eq!(snapshot.participants(), &[p(ALICE)]);

    let next = commit(&registry, delta(BOB, &end, vec![add(BOB)])).await;
    assert_eq!(next.applied_at(), &end);
    assert_eq!(next.resulting_version().version(), 3);
    assert_eq!(container.verify().await.unwrap(), 3);
}

#[tokio::test]
async fn torn_tail_is_dropped_on_reload() {
    let dir = TempDir::new().unwrap();
    let end = {
        let registry = file_registry(&dir);
        let end = seed(&registry).await;
        registry.shutdown().await;
        end
    };

    // A crash in the middle of writing a third entry
    let path = FileDeltaStore::open(dir.path()).unwrap().path_for(&name());
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"{\"record\":{\"applied_at\":{\"version\":2,").unwrap();
    drop(file);

    let registry = file_registry(&dir);
    let container = registry.get_or_load(&name()).await.unwrap();
    assert_eq!(container.end_version().await, end);
    assert_eq!(container.verify().await.unwrap(), 2);

    // The log is writable again after the truncation
    let next = commit(&registry, delta(BOB, &end, vec![add(BOB)])).await;
    assert_eq!(next.resulting_version().version(), 3);
    registry.shutdown().await;

    let reloaded = file_registry(&dir);
    let history = reloaded.history(&name(), 0, None).await.unwrap();
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn history_reads_match_what_was_committed() {
    let dir = TempDir::new().unwrap();
    let registry = file_registry(&dir);
    seed(&registry).await;
    let before = registry.history(&name(), 0, None).await.unwrap();
    registry.shutdown().await;

    let reloaded = file_registry(&dir);
    let after = reloaded.history(&name(), 0, None).await.unwrap();
    similar_asserts::assert_eq!(before, after);
}
