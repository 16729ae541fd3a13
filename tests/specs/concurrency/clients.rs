//! Two editing clients, each with one delta in flight, converge with the server

use crate::prelude::*;
use wv_core::{ClientConcurrencyControl, WaveletData};

struct Editor {
    cc: ClientConcurrencyControl,
    local: WaveletData,
}

impl Editor {
    fn new(address: &str) -> Self {
        Self {
            cc: ClientConcurrencyControl::new(p(address), v0()),
            local: WaveletData::new(name(), v0()),
        }
    }

    fn type_ops(&mut self, ops: Vec<WaveletOperation>) {
        for op in &ops {
            self.local.apply_operation(op).unwrap();
        }
        self.cc.on_client_ops(ops);
    }

    async fn send(&mut self, registry: &WaveletRegistry<FakeClock>) {
        let delta = self.cc.take_outgoing().unwrap();
        registry.submit(&name(), delta).await.unwrap();
    }

    /// Apply everything committed since the client's version
    async fn catch_up(&mut self, registry: &WaveletRegistry<FakeClock>) {
        let records = registry
            .history(&name(), self.cc.version().version(), None)
            .await
            .unwrap();
        for record in records {
            for op in self.cc.on_server_delta(record.transformed()).unwrap() {
                self.local.apply_operation(&op).unwrap();
            }
        }
    }
}

fn sorted(data: &WaveletData) -> Vec<ParticipantId> {
    let mut participants = data.participants().to_vec();
    participants.sort();
    participants
}

#[tokio::test]
async fn clients_with_overlapping_edits_converge() {
    let registry = memory_registry();
    let mut alice = Editor::new(ALICE);
    let mut bob = Editor::new(BOB);

    alice.type_ops(vec![add(ALICE), edit(DocOp::new().insert("hello"))]);
    let seed = registry
        .submit(&name(), alice.cc.take_outgoing().unwrap())
        .await
        .unwrap()
        .record;
    alice.cc.on_success(seed.resulting_version().clone()).unwrap();
    bob.catch_up(&registry).await;
    assert_eq!(bob.local.document(BLIP), "hello");

    // Both edit version 2 concurrently
    alice.type_ops(vec![edit(DocOp::new().retain(5).insert(" world"))]);
    let from_alice = alice.cc.take_outgoing().unwrap();
    bob.type_ops(vec![add(BOB), edit(DocOp::new().insert("Oh ").retain(5))]);
    bob.send(&registry).await;
    registry.submit(&name(), from_alice).await.unwrap();

    // Typed while the first delta is unacknowledged
    bob.type_ops(vec![edit(DocOp::new().retain(8).insert("!"))]);
    bob.catch_up(&registry).await;
    assert!(bob.cc.in_flight().is_none());
    bob.send(&registry).await;
    bob.catch_up(&registry).await;

    alice.catch_up(&registry).await;

    let snapshot = registry.get_or_load(&name()).await.unwrap().snapshot().await;
    assert_eq!(snapshot.document(BLIP), "Oh hello world!");
    for editor in [&alice, &bob] {
        assert!(!editor.cc.has_pending());
        assert_eq!(editor.cc.version(), snapshot.version());
        assert_eq!(editor.local.documents(), snapshot.documents());
        assert_eq!(sorted(&editor.local), sorted(&snapshot));
    }
}

#[tokio::test]
async fn reconnecting_client_resends_what_the_server_lacks() {
    let registry = memory_registry();
    let mut bob = Editor::new(BOB);

    bob.type_ops(vec![add(BOB)]);
    bob.send(&registry).await;
    bob.catch_up(&registry).await;

    // Sent into a connection that dropped before the server saw it
    bob.type_ops(vec![edit(DocOp::new().insert("draft"))]);
    bob.cc.take_outgoing().unwrap();

    let reopened = registry
        .reopen(&name(), &bob.cc.reconnection_versions())
        .await
        .unwrap()
        .unwrap();
    let ops = bob
        .cc
        .on_reopen(&reopened.start_signature, &reopened.deltas)
        .unwrap();
    assert!(ops.is_empty());
    assert!(bob.cc.in_flight().is_none());

    bob.send(&registry).await;
    bob.catch_up(&registry).await;

    let snapshot = registry.get_or_load(&name()).await.unwrap().snapshot().await;
    assert_eq!(snapshot.document(BLIP), "draft");
    assert!(!bob.cc.has_pending());
    assert_eq!(bob.cc.version(), snapshot.version());
}
