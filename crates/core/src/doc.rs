// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document operations
//!
//! A `DocOp` walks the whole document from start to end. Lengths are
//! counted in characters, so the components' base lengths must add up to
//! the length of the document the op is applied to.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from applying a document operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocOpError {
    #[error("op spans {expected} characters but document has {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("delete at {position} expected {expected:?} but found {found:?}")]
    DeleteMismatch {
        position: usize,
        expected: String,
        found: String,
    },
    #[error("op lengths do not fit in a document")]
    TooLong,
}

/// One step of a document operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocComponent {
    /// Keep the next `n` characters
    Retain(usize),
    /// Insert text at the cursor
    Insert(String),
    /// Remove the given text, which must be at the cursor
    Delete(String),
}

impl DocComponent {
    /// Characters consumed from the input document
    pub fn base_len(&self) -> usize {
        match self {
            DocComponent::Retain(n) => *n,
            DocComponent::Insert(_) => 0,
            DocComponent::Delete(text) => text.chars().count(),
        }
    }

    /// Characters produced in the output document
    pub fn target_len(&self) -> usize {
        match self {
            DocComponent::Retain(n) => *n,
            DocComponent::Insert(text) => text.chars().count(),
            DocComponent::Delete(_) => 0,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            DocComponent::Retain(n) => *n == 0,
            DocComponent::Insert(text) | DocComponent::Delete(text) => text.is_empty(),
        }
    }

    /// Sub-range of a retain or delete, in base characters. Inserts are returned whole.
    pub(crate) fn slice(&self, offset: usize, len: usize) -> DocComponent {
        match self {
            DocComponent::Retain(_) => DocComponent::Retain(len),
            DocComponent::Delete(text) => {
                DocComponent::Delete(text.chars().skip(offset).take(len).collect())
            }
            DocComponent::Insert(text) => DocComponent::Insert(text.clone()),
        }
    }
}

/// Normalized sequence of document components
///
/// Adjacent components of the same kind are merged and empty components
/// dropped, so equal edits compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DocComponent>", into = "Vec<DocComponent>")]
pub struct DocOp {
    components: Vec<DocComponent>,
}

impl DocOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retain(mut self, n: usize) -> Self {
        self.push(DocComponent::Retain(n));
        self
    }

    pub fn insert(mut self, text: impl Into<String>) -> Self {
        self.push(DocComponent::Insert(text.into()));
        self
    }

    pub fn delete(mut self, text: impl Into<String>) -> Self {
        self.push(DocComponent::Delete(text.into()));
        self
    }

    /// Append a component, merging with the previous one when possible
    pub fn push(&mut self, component: DocComponent) {
        if component.is_empty() {
            return;
        }
        if let Some(last) = self.components.last_mut() {
            match (last, &component) {
                (DocComponent::Retain(prev), DocComponent::Retain(n)) => {
                    *prev = prev.saturating_add(*n);
                    return;
                }
                (DocComponent::Insert(prev), DocComponent::Insert(text))
                | (DocComponent::Delete(prev), DocComponent::Delete(text)) => {
                    prev.push_str(text);
                    return;
                }
                _ => {}
            }
        }
        self.components.push(component);
    }

    pub fn components(&self) -> &[DocComponent] {
        &self.components
    }

    /// Saturates rather than wrapping, so an oversized op never matches a document
    pub fn base_len(&self) -> usize {
        self.components
            .iter()
            .fold(0, |len, c| len.saturating_add(c.base_len()))
    }

    pub fn target_len(&self) -> usize {
        self.components
            .iter()
            .fold(0, |len, c| len.saturating_add(c.target_len()))
    }

    /// True if applying the op leaves any document unchanged
    pub fn is_noop(&self) -> bool {
        self.components
            .iter()
            .all(|c| matches!(c, DocComponent::Retain(_)))
    }

    /// Apply the op to a document, producing the new document
    pub fn apply(&self, doc: &str) -> Result<String, DocOpError> {
        let actual = doc.chars().count();
        let expected = self.base_len();
        if expected != actual {
            return Err(DocOpError::LengthMismatch { expected, actual });
        }

        let mut chars = doc.chars();
        let mut out = String::with_capacity(doc.len());
        let mut position = 0;

        for component in &self.components {
            match component {
                DocComponent::Retain(n) => {
                    out.extend(chars.by_ref().take(*n));
                    position += *n;
                }
                DocComponent::Insert(text) => out.push_str(text),
                DocComponent::Delete(text) => {
                    let len = text.chars().count();
                    let found: String = chars.by_ref().take(len).collect();
                    if found != *text {
                        return Err(DocOpError::DeleteMismatch {
                            position,
                            expected: text.clone(),
                            found,
                        });
                    }
                    position += len;
                }
            }
        }

        Ok(out)
    }
}

impl FromIterator<DocComponent> for DocOp {
    fn from_iter<I: IntoIterator<Item = DocComponent>>(components: I) -> Self {
        let mut op = DocOp::new();
        for component in components {
            op.push(component);
        }
        op
    }
}

/// Decoding path for ops from the wire: both lengths must fit in `usize`
impl TryFrom<Vec<DocComponent>> for DocOp {
    type Error = DocOpError;

    fn try_from(components: Vec<DocComponent>) -> Result<Self, Self::Error> {
        let mut base = 0usize;
        let mut target = 0usize;
        for component in &components {
            base = base
                .checked_add(component.base_len())
                .ok_or(DocOpError::TooLong)?;
            target = target
                .checked_add(component.target_len())
                .ok_or(DocOpError::TooLong)?;
        }
        Ok(components.into_iter().collect())
    }
}

impl From<DocOp> for Vec<DocComponent> {
    fn from(op: DocOp) -> Self {
        op.components
    }
}

#[cfg(test)]
#[path = "doc_tests.rs"]
mod tests;
