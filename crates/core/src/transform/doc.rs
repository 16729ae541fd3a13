// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document operation transform
//!
//! Walks `other` component by component, pulling matching spans out of
//! `op`. Spans `other` deleted vanish from the result (including spans
//! `op` also deleted), and text `other` inserted becomes a retain.

use crate::doc::{DocComponent, DocOp};

/// Iterator over an op's components, split on demand to a base length
struct ComponentIter<'a> {
    components: &'a [DocComponent],
    idx: usize,
    offset: usize,
}

impl<'a> ComponentIter<'a> {
    fn new(op: &'a DocOp) -> Self {
        Self {
            components: op.components(),
            idx: 0,
            offset: 0,
        }
    }

    /// Take the next chunk spanning at most `max` base characters.
    /// Inserts span none and are always returned whole.
    fn next(&mut self, max: usize) -> Option<DocComponent> {
        let component = self.components.get(self.idx)?;
        let len = component.base_len();
        if len == 0 {
            self.idx += 1;
            return Some(component.clone());
        }

        let remaining = len - self.offset;
        let take = remaining.min(max);
        let chunk = component.slice(self.offset, take);
        if take == remaining {
            self.idx += 1;
            self.offset = 0;
        } else {
            self.offset += take;
        }
        Some(chunk)
    }

    fn at_insert(&self) -> bool {
        matches!(self.components.get(self.idx), Some(DocComponent::Insert(_)))
    }
}

/// Rewrite `op` to apply after `other`; both must start from the same document.
///
/// `op_first` decides ties: when both insert at the same position, the side
/// holding it places its text first. Returns `None` if the ops do not span the
/// same document.
pub(crate) fn transform_doc(op: &DocOp, other: &DocOp, op_first: bool) -> Option<DocOp> {
    if op.base_len() != other.base_len() {
        return None;
    }

    let mut result = DocOp::new();
    let mut iter = ComponentIter::new(op);

    for component in other.components() {
        match component {
            DocComponent::Retain(n) => {
                let mut len = *n;
                while len > 0 {
                    let chunk = iter.next(len)?;
                    len -= chunk.base_len();
                    result.push(chunk);
                }
            }
            DocComponent::Delete(text) => {
                let mut len = text.chars().count();
                while len > 0 {
                    let chunk = iter.next(len)?;
                    len -= chunk.base_len();
                    // Our inserts survive; anything we retained or deleted is already gone
                    if let DocComponent::Insert(_) = chunk {
                        result.push(chunk);
                    }
                }
            }
            DocComponent::Insert(text) => {
                if op_first {
                    while iter.at_insert() {
                        result.push(iter.next(0)?);
                    }
                }
                result.push(DocComponent::Retain(text.chars().count()));
            }
        }
    }

    // Only trailing inserts can remain
    while let Some(chunk) = iter.next(usize::MAX) {
        result.push(chunk);
    }

    Some(result)
}

#[cfg(test)]
#[path = "doc_tests.rs"]
mod tests;
