// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn builder_merges_adjacent_components() {
    let op = DocOp::new().retain(2).retain(3).insert("a").insert("b").retain(0);
    assert_eq!(
        op.components(),
        &[DocComponent::Retain(5), DocComponent::Insert("ab".to_string())]
    );
}

#[test]
fn lengths_count_characters() {
    let op = DocOp::new().retain(1).delete("héllo").insert("ü");
    assert_eq!(op.base_len(), 6);
    assert_eq!(op.target_len(), 2);
}

#[test]
fn apply_inserts_and_deletes() {
    let op = DocOp::new().retain(6).delete("world").insert("there");
    assert_eq!(op.apply("hello world").unwrap(), "hello there");
}

#[test]
fn apply_into_empty_document() {
    let op = DocOp::new().insert("hi");
    assert_eq!(op.apply("").unwrap(), "hi");
}

#[test]
fn apply_rejects_length_mismatch() {
    let op = DocOp::new().retain(3);
    assert_eq!(
        op.apply("hello"),
        Err(DocOpError::LengthMismatch {
            expected: 3,
            actual: 5
        })
    );
}

#[test]
fn apply_rejects_wrong_deleted_text() {
    let op = DocOp::new().retain(1).delete("xy").retain(2);
    assert_eq!(
        op.apply("hello"),
        Err(DocOpError::DeleteMismatch {
            position: 1,
            expected: "xy".to_string(),
            found: "el".to_string(),
        })
    );
}

#[test]
fn retain_only_op_is_noop() {
    assert!(DocOp::new().retain(4).is_noop());
    assert!(DocOp::new().is_noop());
    assert!(!DocOp::new().insert("x").is_noop());
}

#[test]
fn deserializing_normalizes_components() {
    let op: DocOp =
        serde_json::from_str(r#"[{"retain":1},{"retain":2},{"insert":""},{"delete":"a"}]"#)
            .unwrap();
    assert_eq!(op, DocOp::new().retain(3).delete("a"));
}

#[test]
fn deserializing_rejects_lengths_that_overflow() {
    let json = format!(r#"[{{"retain":{}}},{{"insert":"x"}},{{"retain":2}}]"#, usize::MAX);
    let err = serde_json::from_str::<DocOp>(&json).unwrap_err();
    assert!(err.to_string().contains("do not fit"), "{err}");

    let json = format!(r#"[{{"insert":"ab"}},{{"retain":{}}}]"#, usize::MAX - 1);
    assert!(serde_json::from_str::<DocOp>(&json).is_err());
}

#[test]
fn oversized_built_op_saturates_and_never_applies() {
    let op = DocOp::new().retain(usize::MAX).insert("x").retain(2);
    assert_eq!(op.base_len(), usize::MAX);
    assert!(matches!(
        op.apply("ab"),
        Err(DocOpError::LengthMismatch { expected: usize::MAX, actual: 2 })
    ));
}
