//! Edit descriptors and their application to source text.
//!
//! An [`Edit`] replaces the byte range `start..end` of the *original* source
//! with `replacement`. Edits are collected while walking a file and applied in
//! one pass by [`commit_edits`], so offsets never have to be shifted by hand.

use crate::error::{NodemodError, NodemodResult};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::trace;

/// A single text replacement expressed in byte offsets of the original source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    /// Replace `range` with `replacement`
    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            replacement: replacement.into(),
        }
    }

    /// Insert `text` at `offset`
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            start: offset,
            end: offset,
            replacement: text.into(),
        }
    }

    /// Delete `range`
    pub fn delete(range: Range<usize>) -> Self {
        Self::replace(range, String::new())
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Apply `edits` to `source` and return the rewritten text.
///
/// Edits may be given in any order. Exact duplicates are applied once.
/// Insertions at the same offset keep their relative order. Two edits whose
/// ranges intersect are rejected with [`NodemodError::OverlappingEdits`].
pub fn commit_edits(source: &str, edits: Vec<Edit>) -> NodemodResult<String> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    let mut edits = edits;
    // Stable sort keeps insertion order for edits sharing a start offset.
    edits.sort_by_key(|edit| (edit.start, edit.end));
    edits.dedup();

    for edit in &edits {
        if edit.start > edit.end || edit.end > source.len() {
            return Err(NodemodError::invalid_input(format!(
                "Edit range {}..{} is outside of source (length {})",
                edit.start,
                edit.end,
                source.len()
            )));
        }
        if !source.is_char_boundary(edit.start) || !source.is_char_boundary(edit.end) {
            return Err(NodemodError::invalid_input(format!(
                "Edit range {}..{} does not fall on character boundaries",
                edit.start, edit.end
            )));
        }
    }

    for pair in edits.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if first.end > second.start {
            return Err(NodemodError::OverlappingEdits {
                first_start: first.start,
                first_end: first.end,
                second_start: second.start,
                second_end: second.end,
            });
        }
    }

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        output.push_str(&source[cursor..edit.start]);
        output.push_str(&edit.replacement);
        cursor = edit.end;
    }
    output.push_str(&source[cursor..]);

    trace!(edits = edits.len(), "Committed edits");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_commit_no_edits_returns_source() {
        assert_eq!(commit_edits("let a = 1;", vec![]).unwrap(), "let a = 1;");
    }

    #[test]
    fn test_commit_out_of_order_edits() {
        let source = "util.print(a); util.puts(b);";
        let edits = vec![
            Edit::replace(15..24, "console.log"),
            Edit::replace(0..10, "console.log"),
        ];
        assert_eq!(
            commit_edits(source, edits).unwrap(),
            "console.log(a); console.log(b);"
        );
    }

    #[test]
    fn test_commit_insertions_keep_order() {
        let edits = vec![Edit::insert(0, "a"), Edit::insert(0, "b"), Edit::delete(0..1)];
        assert_eq!(commit_edits("xy", edits).unwrap(), "aby");
    }

    #[test]
    fn test_commit_duplicate_edits_applied_once() {
        let edit = Edit::replace(0..3, "let");
        assert_eq!(
            commit_edits("var x;", vec![edit.clone(), edit]).unwrap(),
            "let x;"
        );
    }

    #[test]
    fn test_commit_overlapping_edits_rejected() {
        let edits = vec![Edit::replace(0..5, "a"), Edit::replace(3..8, "b")];
        let err = commit_edits("0123456789", edits).unwrap_err();
        assert!(matches!(
            err,
            NodemodError::OverlappingEdits {
                first_start: 0,
                second_start: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_commit_out_of_bounds_rejected() {
        let err = commit_edits("abc", vec![Edit::replace(2..10, "x")]).unwrap_err();
        assert!(matches!(err, NodemodError::InvalidInput { .. }));
    }
}
