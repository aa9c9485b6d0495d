//! Property-based tests for edit application

use nodemod_foundation::{commit_edits, Edit};
use proptest::prelude::*;

proptest! {
    /// Property: Applying no edits returns the source unchanged
    #[test]
    fn prop_no_edits_is_identity(source in ".*") {
        prop_assert_eq!(commit_edits(&source, vec![]).unwrap(), source);
    }

    /// Property: Replacing a range with its own text is a no-op
    #[test]
    fn prop_self_replacement_is_identity(source in "[a-z ]{0,64}", a in 0usize..64, b in 0usize..64) {
        let len = source.len();
        let (start, end) = (a.min(b).min(len), a.max(b).min(len));
        let edit = Edit::replace(start..end, &source[start..end]);
        prop_assert_eq!(commit_edits(&source, vec![edit]).unwrap(), source);
    }

    /// Property: Output length is source length plus the net size of all edits
    #[test]
    fn prop_length_accounting(source in "[a-z]{8,64}", replacement in "[A-Z]{0,8}") {
        let mid = source.len() / 2;
        let edits = vec![
            Edit::replace(0..2, replacement.clone()),
            Edit::insert(mid, replacement.clone()),
        ];
        let result = commit_edits(&source, edits).unwrap();
        prop_assert_eq!(result.len(), source.len() - 2 + 2 * replacement.len());
    }

    /// Property: Edit order does not matter for disjoint edits
    #[test]
    fn prop_order_independent(source in "[a-z]{10,40}") {
        let first = Edit::replace(0..3, "X");
        let second = Edit::replace(5..7, "Y");
        let forward = commit_edits(&source, vec![first.clone(), second.clone()]).unwrap();
        let backward = commit_edits(&source, vec![second, first]).unwrap();
        prop_assert_eq!(forward, backward);
    }
}
