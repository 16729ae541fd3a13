//! Random concurrent edits to one document converge

use crate::prelude::*;
use proptest::prelude::*;
use wv_core::transform_ops;

/// Build an op over `doc` from (kind, length, text) steps
fn build_op(doc: &str, steps: &[(u8, usize, String)]) -> DocOp {
    let chars: Vec<char> = doc.chars().collect();
    let mut pos = 0;
    let mut op = DocOp::new();
    for (kind, n, text) in steps {
        let n = (*n).min(chars.len() - pos);
        match kind % 3 {
            0 => op = op.retain(n),
            1 => op = op.insert(text.clone()),
            _ => op = op.delete(chars[pos..pos + n].iter().collect::<String>()),
        }
        if kind % 3 != 1 {
            pos += n;
        }
    }
    op.retain(chars.len() - pos)
}

fn steps() -> impl Strategy<Value = Vec<(u8, usize, String)>> {
    prop::collection::vec((0u8..3, 0usize..4, "[x-z]{1,2}"), 0..5)
}

fn apply_edits(doc: &str, ops: &[WaveletOperation]) -> String {
    ops.iter().fold(doc.to_string(), |doc, op| match op {
        WaveletOperation::Blip { op, .. } => op.apply(&doc).unwrap(),
        _ => doc,
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn server_and_late_client_see_the_same_document(
        doc in "[a-e]{1,10}",
        first_steps in steps(),
        second_steps in steps(),
    ) {
        let first_op = build_op(&doc, &first_steps);
        let second_op = build_op(&doc, &second_steps);

        let (snapshot_doc, first, second) = runtime().block_on(async {
            let registry = memory_registry();
            let seeded = commit(
                &registry,
                delta(ALICE, &v0(), vec![add(ALICE), add(BOB), edit(DocOp::new().insert(doc.clone()))]),
            )
            .await;
            let base = seeded.resulting_version().clone();

            let first = commit(&registry, delta(ALICE, &base, vec![edit(first_op.clone())])).await;
            let second = commit(&registry, delta(BOB, &base, vec![edit(second_op.clone())])).await;
            let snapshot = registry.get_or_load(&name()).await.unwrap().snapshot().await;
            (snapshot.document(BLIP).to_string(), first, second)
        });

        // The server's view: both committed records replayed in order
        let replayed = apply_edits(&apply_edits(&doc, first.ops()), second.ops());
        prop_assert_eq!(&replayed, &snapshot_doc);

        // Bob's view: his own edit, then Alice's edit transformed past it
        let pair = transform_ops(&[edit(second_op.clone())], first.ops()).unwrap();
        let bobs = apply_edits(&apply_edits(&doc, &[edit(second_op)]), &pair.server);
        prop_assert_eq!(&bobs, &snapshot_doc);
    }
}
