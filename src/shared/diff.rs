//! Text diff and patch
//!
//! Converts between two text snapshots and an edit script, and applies an edit
//! script to a snapshot. The diff is a common prefix / common suffix diff: it
//! runs in linear time and is exact for one contiguous edit (typing, pasting,
//! deleting a run). Edits at several disjoint places between two snapshots
//! collapse into one delete + insert spanning all of them.
//!
//! All positions and lengths count `char`s.

use crate::shared::delta::Operation;
use crate::shared::error::SyncError;

/// Lengths of the common prefix and suffix of two snapshots.
///
/// The suffix is searched only in what remains after the prefix, so
/// `prefix + suffix <= min(old.len(), new.len())` always holds.
pub fn common_affixes(old: &[char], new: &[char]) -> (usize, usize) {
    let min_len = old.len().min(new.len());

    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take(min_len - prefix)
        .take_while(|(a, b)| a == b)
        .count();

    (prefix, suffix)
}

/// Edit script turning `old_text` into `new_text`.
///
/// Empty iff the texts are equal. Otherwise at most one each of
/// `Retain`, `Delete`, `Insert`, in that order.
pub fn compute_edit_script(old_text: &str, new_text: &str) -> Vec<Operation> {
    if old_text == new_text {
        return Vec::new();
    }

    let old: Vec<char> = old_text.chars().collect();
    let new: Vec<char> = new_text.chars().collect();
    let (prefix, suffix) = common_affixes(&old, &new);

    let mut ops = Vec::with_capacity(3);

    if prefix > 0 {
        ops.push(Operation::retain(0, prefix));
    }

    let deleted = old.len() - prefix - suffix;
    if deleted > 0 {
        ops.push(Operation::delete(prefix, deleted));
    }

    let inserted = &new[prefix..new.len() - suffix];
    if !inserted.is_empty() {
        ops.push(Operation::insert(prefix, inserted.iter().collect::<String>()));
    }

    ops
}

/// Apply an edit script to `text`.
///
/// Operation positions are in `text`'s coordinates. A read cursor tracks how
/// much of `text` has been consumed and `offset` tracks the net length change
/// so far. `Retain` and `Delete` consume base text and must start at or after
/// the read cursor. An `Insert` may also sit at the start of the deletion that
/// precedes it, which is how a replacement is expressed. Other positions
/// behind the read cursor or past the end of `text` are rejected with
/// [`SyncError::InvalidPatchPosition`]; nothing is partially applied.
pub fn apply_edit_script(text: &str, ops: &[Operation]) -> Result<String, SyncError> {
    let source: Vec<char> = text.chars().collect();
    let len = source.len();

    let mut out = String::with_capacity(text.len());
    let mut read = 0usize;
    // Base position an insert may still target once `read` has moved past it.
    let mut anchor = 0usize;
    let mut offset: isize = 0;

    let out_of_bounds = |position: usize| SyncError::InvalidPatchPosition {
        position,
        length: len,
    };

    for op in ops {
        let pos = op.pos();
        if pos > len {
            return Err(out_of_bounds(pos));
        }

        match op {
            Operation::Retain { length, .. } => {
                if pos < read {
                    return Err(out_of_bounds(pos));
                }
                let end = pos.checked_add(*length).filter(|end| *end <= len);
                let end = end.ok_or_else(|| out_of_bounds(pos.saturating_add(*length)))?;
                out.extend(&source[read..end]);
                read = end;
                anchor = end;
            }
            Operation::Insert { text, .. } => {
                if pos >= read {
                    out.extend(&source[read..pos]);
                    read = pos;
                    anchor = pos;
                } else if pos != anchor {
                    return Err(out_of_bounds(pos));
                }
                debug_assert_eq!(out.chars().count() as isize, read as isize + offset);
                out.push_str(text);
                offset += text.chars().count() as isize;
            }
            Operation::Delete { length, .. } => {
                if pos < read {
                    return Err(out_of_bounds(pos));
                }
                let end = pos.checked_add(*length).filter(|end| *end <= len);
                let end = end.ok_or_else(|| out_of_bounds(pos.saturating_add(*length)))?;
                out.extend(&source[read..pos]);
                offset -= *length as isize;
                read = end;
                anchor = pos;
            }
        }
    }

    out.extend(&source[read..]);
    Ok(out)
}
