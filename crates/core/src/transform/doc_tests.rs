// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn converge(doc: &str, client: &DocOp, server: &DocOp) -> (String, String) {
    let client_prime = transform_doc(client, server, false).unwrap();
    let server_prime = transform_doc(server, client, true).unwrap();
    let via_server = client_prime.apply(&server.apply(doc).unwrap()).unwrap();
    let via_client = server_prime.apply(&client.apply(doc).unwrap()).unwrap();
    (via_server, via_client)
}

#[test]
fn insert_after_concurrent_insert_earlier_shifts() {
    let server = DocOp::new().insert(">> ").retain(5);
    let client = DocOp::new().retain(5).insert("!");
    let client_prime = transform_doc(&client, &server, false).unwrap();
    assert_eq!(client_prime, DocOp::new().retain(8).insert("!"));
    assert_eq!(converge("hello", &client, &server), (">> hello!".into(), ">> hello!".into()));
}

#[test]
fn same_position_inserts_place_server_first() {
    let server = DocOp::new().retain(2).insert("S").retain(3);
    let client = DocOp::new().retain(2).insert("C").retain(3);
    let (a, b) = converge("hello", &client, &server);
    assert_eq!(a, "heSCllo");
    assert_eq!(b, "heSCllo");
}

#[test]
fn same_position_inserts_at_end_place_server_first() {
    let server = DocOp::new().retain(5).insert("S");
    let client = DocOp::new().retain(5).insert("C");
    assert_eq!(converge("hello", &client, &server), ("helloSC".into(), "helloSC".into()));
}

#[test]
fn overlapping_deletes_become_noop_for_deleted_range() {
    let server = DocOp::new().retain(1).delete("ell").retain(1);
    let client = DocOp::new().retain(1).delete("ell").retain(1);
    let client_prime = transform_doc(&client, &server, false).unwrap();
    assert!(client_prime.is_noop());
    assert_eq!(client_prime, DocOp::new().retain(2));
    assert_eq!(converge("hello", &client, &server), ("ho".into(), "ho".into()));
}

#[test]
fn partially_overlapping_deletes_keep_remainder() {
    let server = DocOp::new().delete("hel").retain(2);
    let client = DocOp::new().retain(1).delete("ell").retain(1);
    let client_prime = transform_doc(&client, &server, false).unwrap();
    assert_eq!(client_prime, DocOp::new().delete("l").retain(1));
    assert_eq!(converge("hello", &client, &server), ("o".into(), "o".into()));
}

#[test]
fn insert_inside_concurrently_deleted_range_survives() {
    let server = DocOp::new().delete("hello");
    let client = DocOp::new().retain(2).insert("XY").retain(3);
    assert_eq!(converge("hello", &client, &server), ("XY".into(), "XY".into()));
}

#[test]
fn length_mismatch_returns_none() {
    let server = DocOp::new().retain(4);
    let client = DocOp::new().retain(5);
    assert!(transform_doc(&client, &server, false).is_none());
}

#[test]
fn transformed_op_spans_other_result() {
    let server = DocOp::new().retain(2).insert("abc").delete("l").retain(2);
    let client = DocOp::new().delete("he").retain(3);
    let client_prime = transform_doc(&client, &server, false).unwrap();
    assert_eq!(client_prime.base_len(), server.target_len());
}
