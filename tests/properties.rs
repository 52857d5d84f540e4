//! Property tests over randomly generated reduced, strongly-connected FSMs
//! (`spec.md` §8 "Testable Properties"). Grounded in the dev-dependency
//! pattern used by `fsm_governance_engine_lib` (`other_examples/`), which
//! drives FSM invariants with `proptest` the same way.

use proptest::prelude::*;

use fsmcheck::fsm::{are_isomorphic, Fsm};
use fsmcheck::identifiers::{ads, pds, svs};
use fsmcheck::prefix_set::PrefixSet;
use fsmcheck::separating::state_pair_shortest_separating_sequences;
use fsmcheck::shortest_paths::{all_shortest_paths, get_shortest_path};
use fsmcheck::types::FsmVariant;

/// Builds a totally-defined FSM (every `(state, input)` has a transition)
/// from flat index vectors, the shape `proptest` strategies can generate
/// directly without a hand-rolled `Arbitrary` impl for `Fsm` itself.
fn build_fsm(
    variant_idx: u8,
    n: usize,
    inputs: usize,
    outputs: usize,
    targets: Vec<usize>,
    transition_outputs: Vec<usize>,
    state_outputs: Vec<usize>,
) -> Fsm {
    let variant = match variant_idx % 4 {
        0 => FsmVariant::Dfa,
        1 => FsmVariant::Moore,
        2 => FsmVariant::Mealy,
        _ => FsmVariant::Dfsm,
    };
    let mut fsm = Fsm::new(variant, n, inputs, outputs);
    for q in 0..n {
        for a in 0..inputs {
            let idx = q * inputs + a;
            fsm.set_transition(q, a, targets[idx] % n);
            if fsm.is_output_transition() {
                fsm.set_transition_output(q, a, transition_outputs[idx] % outputs);
            }
        }
    }
    if fsm.is_output_state() {
        for q in 0..n {
            fsm.set_state_output(q, state_outputs[q] % outputs);
        }
    }
    fsm
}

fn small_fsm() -> impl Strategy<Value = Fsm> {
    (2usize..=6, 1usize..=3, 1usize..=3).prop_flat_map(|(n, inputs, outputs)| {
        (
            Just(n),
            Just(inputs),
            Just(outputs),
            0u8..4,
            prop::collection::vec(0..n, n * inputs),
            prop::collection::vec(0..outputs, n * inputs),
            prop::collection::vec(0..outputs, n),
        )
            .prop_map(|(n, inputs, outputs, variant_idx, targets, t_outs, s_outs)| {
                build_fsm(variant_idx, n, inputs, outputs, targets, t_outs, s_outs)
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        max_global_rejects: 4096,
        ..ProptestConfig::default()
    })]

    /// Property 1: minimize is reduced, never grows, and is a fixpoint up to
    /// isomorphism.
    #[test]
    fn reducedness_preservation(fsm in small_fsm()) {
        prop_assume!(fsm.is_reduced() && fsm.is_strongly_connected());
        let mut once = fsm.clone();
        once.minimize();
        prop_assert!(once.is_reduced());
        prop_assert!(once.num_states() <= fsm.num_states());
        let mut twice = once.clone();
        twice.minimize();
        prop_assert!(are_isomorphic(&twice, &once));
    }

    /// Property 2: the state cover has exactly one, shortest, access sequence
    /// per state.
    #[test]
    fn state_cover_is_shortest_and_unique(fsm in small_fsm()) {
        prop_assume!(fsm.is_strongly_connected());
        let paths = all_shortest_paths(&fsm);
        let cover = fsmcheck::basic_sets::state_cover(&fsm, false);
        prop_assert_eq!(cover.len(), fsm.num_states());
        for q in 0..fsm.num_states() {
            let matches: Vec<_> = cover
                .iter()
                .filter(|s| fsm.end_state_path(fsm.initial_state(), s) == q)
                .collect();
            prop_assert_eq!(matches.len(), 1);
            let shortest = get_shortest_path(&paths, fsm.initial_state(), q);
            prop_assert_eq!(matches[0].len(), shortest.len());
        }
    }

    /// Property 3: every reported separating sequence actually separates, and
    /// is no longer than `n - 1`.
    #[test]
    fn separating_sequences_are_correct_and_bounded(fsm in small_fsm()) {
        prop_assume!(fsm.is_reduced());
        let sep = state_pair_shortest_separating_sequences(&fsm);
        for ((p, q), w) in &sep {
            let (out_p, _) = fsm.output_along(*p, w);
            let (out_q, _) = fsm.output_along(*q, w);
            prop_assert_ne!(out_p, out_q);
            prop_assert!(w.len() < fsm.num_states());
        }
        // Reduced implies every pair has a separator.
        let n = fsm.num_states();
        prop_assert_eq!(sep.len(), n * (n.saturating_sub(1)) / 2);
    }

    /// Property 4 (PDS/ADS half not already covered by unit tests): when a
    /// PDS exists it actually yields distinct output sequences per state.
    #[test]
    fn pds_when_present_distinguishes_every_state(fsm in small_fsm()) {
        prop_assume!(fsm.is_reduced());
        if let Some(w) = pds(&fsm) {
            let mut seen = std::collections::HashSet::new();
            for q in 0..fsm.num_states() {
                let (out, _) = fsm.output_along(q, &w);
                prop_assert!(seen.insert(out));
            }
        }
    }

    /// Property 4 (ADS half): every root-to-leaf path in the ADS, when
    /// present, identifies a unique originating state.
    #[test]
    fn ads_when_present_has_unique_leaves(fsm in small_fsm()) {
        prop_assume!(fsm.is_reduced());
        if let Some(tree) = ads(&fsm) {
            let leaves = tree.leaves();
            let mut states: Vec<_> = leaves.iter().map(|(_, s)| *s).collect();
            states.sort_unstable();
            let before = states.len();
            states.dedup();
            prop_assert_eq!(states.len(), before);
        }
    }

    /// Any SVS found for a state must actually separate it from every other.
    #[test]
    fn svs_when_present_separates_from_every_other_state(fsm in small_fsm()) {
        prop_assume!(fsm.is_reduced());
        for q in 0..fsm.num_states() {
            if let Some(w) = svs(&fsm, q) {
                let (out_q, _) = fsm.output_along(q, &w);
                for p in 0..fsm.num_states() {
                    if p != q {
                        let (out_p, _) = fsm.output_along(p, &w);
                        prop_assert_ne!(out_p, out_q);
                    }
                }
            }
        }
    }

    /// Property 6: load(save(fsm)) is identical to fsm.
    #[test]
    fn round_trips_through_save_and_load(fsm in small_fsm()) {
        let dir = std::env::temp_dir().join(format!(
            "fsmcheck-proptest-{}-{}",
            std::process::id(),
            fsm.num_states()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.fsm");
        fsm.save(&path).unwrap();
        let loaded = Fsm::load(&path).unwrap();
        prop_assert_eq!(fsm, loaded);
        std::fs::remove_dir_all(&dir).ok();
    }

    /// Property 7: the prefix set is idempotent under re-insertion and never
    /// grows past the input multiset, and every inserted element has a
    /// maximal prefix in the result.
    #[test]
    fn prefix_set_is_idempotent(seqs in prop::collection::vec(prop::collection::vec(0usize..4, 0..6), 1..10)) {
        let mut once = PrefixSet::new();
        for s in &seqs {
            once.insert(s.clone());
        }
        let mut twice = once.clone();
        for s in &seqs {
            twice.insert(s.clone());
        }
        prop_assert_eq!(once.maximal_sequences(), twice.maximal_sequences());
        prop_assert!(once.maximal_sequences().len() <= seqs.len());
        for s in &seqs {
            prop_assert!(once.maximal_sequences().iter().any(|m| m.starts_with(s.as_slice())));
        }
    }
}
