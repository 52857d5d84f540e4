//! The STOUT-interleaving rule shared by the basic sets (component D) and
//! the identifier constructions (component F). See `spec.md` §4.F "STOUT
//! interleaving rule" — restated here once since both components need it.

use crate::types::{InputId, InputSequence, STOUT_INPUT};

/// Inserts [`STOUT_INPUT`] after every real input in `seq` that is not
/// already followed by one. Leaves existing `STOUT_INPUT` tokens alone.
pub fn interleave_one(seq: &[InputId]) -> InputSequence {
    let mut out = Vec::with_capacity(seq.len() * 2);
    let mut i = 0;
    while i < seq.len() {
        out.push(seq[i]);
        if seq[i] != STOUT_INPUT {
            let already_followed = seq.get(i + 1) == Some(&STOUT_INPUT);
            out.push(STOUT_INPUT);
            if already_followed {
                i += 1; // skip the original STOUT_INPUT, we just re-inserted an equivalent one
            }
        }
        i += 1;
    }
    out
}

/// Applies [`interleave_one`] to every sequence in `seqs`, then enforces the
/// "all start with STOUT_INPUT, or none do" rule: if any sequence in the
/// *original* set began with `STOUT_INPUT`, every sequence is forced to
/// start with one (prepended if missing); otherwise a leading `STOUT_INPUT`
/// is stripped from all of them.
pub fn interleave_set(seqs: &[InputSequence]) -> Vec<InputSequence> {
    let start_with_stout = seqs.iter().any(|s| s.first() == Some(&STOUT_INPUT));
    seqs.iter()
        .map(|s| {
            let mut interleaved = interleave_one(s);
            if start_with_stout {
                if interleaved.first() != Some(&STOUT_INPUT) {
                    interleaved.insert(0, STOUT_INPUT);
                }
            } else if interleaved.first() == Some(&STOUT_INPUT) {
                interleaved.remove(0);
            }
            interleaved
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaves_after_each_real_input() {
        assert_eq!(interleave_one(&[0, 1]), vec![0, STOUT_INPUT, 1, STOUT_INPUT]);
    }

    #[test]
    fn set_alignment_prepends_when_any_starts_with_stout() {
        let seqs = vec![vec![STOUT_INPUT, 0], vec![1]];
        let out = interleave_set(&seqs);
        assert!(out.iter().all(|s| s.first() == Some(&STOUT_INPUT)));
    }

    #[test]
    fn set_alignment_strips_when_none_start_with_stout() {
        let seqs = vec![vec![0], vec![1]];
        let out = interleave_set(&seqs);
        assert!(out.iter().all(|s| s.first() != Some(&STOUT_INPUT)));
    }
}
