//! Property-based tests for the diff/patch codec
//!
//! Uses proptest to generate random snapshots and verify the codec laws

use collabpad::shared::delta::Operation;
use collabpad::shared::diff::{apply_edit_script, common_affixes, compute_edit_script};
use proptest::prelude::*;

/// Small alphabet so prefixes and suffixes overlap often
fn snapshot() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!['a', 'b', 'é', '\n', ' ', '😀']), 0..24)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn test_apply_inverts_compute(old in snapshot(), new in snapshot()) {
        let ops = compute_edit_script(&old, &new);
        prop_assert_eq!(apply_edit_script(&old, &ops).unwrap(), new);
    }

    #[test]
    fn test_identical_snapshots_have_empty_script(text in ".*") {
        prop_assert!(compute_edit_script(&text, &text).is_empty());
    }

    #[test]
    fn test_affixes_never_overlap(old in snapshot(), new in snapshot()) {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();
        let (prefix, suffix) = common_affixes(&old, &new);
        prop_assert!(prefix + suffix <= old.len().min(new.len()));
    }

    #[test]
    fn test_script_shape(old in snapshot(), new in snapshot()) {
        let ops = compute_edit_script(&old, &new);
        prop_assert!(ops.len() <= 3);
        prop_assert!(ops.windows(2).all(|pair| rank(&pair[0]) < rank(&pair[1])));
    }

    #[test]
    fn test_arbitrary_unicode_round_trips(old in ".{0,40}", new in ".{0,40}") {
        let ops = compute_edit_script(&old, &new);
        prop_assert_eq!(apply_edit_script(&old, &ops).unwrap(), new);
    }
}

fn rank(op: &Operation) -> u8 {
    match op {
        Operation::Retain { .. } => 0,
        Operation::Delete { .. } => 1,
        Operation::Insert { .. } => 2,
    }
}
