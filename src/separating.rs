//! Component E: state-pair shortest separating sequences and the splitting
//! tree they are built from (`spec.md` §4.E).

use std::collections::{BTreeMap, HashMap};

use crate::fsm::Fsm;
use crate::types::{InputSequence, OutputSequence, StateId, NULL_STATE, STOUT_INPUT};

type PairKey = (StateId, StateId);

fn pair_key(a: StateId, b: StateId) -> PairKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Deterministic tie-break: shorter sequence wins; among equal-length
/// candidates, the lexicographically smaller one wins (`spec.md` §4.E).
fn better(a: &InputSequence, b: &InputSequence) -> bool {
    a.len() < b.len() || (a.len() == b.len() && a < b)
}

fn immediate_separator(fsm: &Fsm, p: StateId, q: StateId) -> Option<InputSequence> {
    if fsm.is_output_state() && fsm.state_output(p) != fsm.state_output(q) {
        return Some(vec![STOUT_INPUT]);
    }
    for a in 0..fsm.num_inputs() {
        let (np, nq) = (fsm.next(p, a), fsm.next(q, a));
        if (np == NULL_STATE) != (nq == NULL_STATE) {
            return Some(vec![a]);
        }
        if fsm.is_output_transition() && fsm.output(p, a) != fsm.output(q, a) {
            return Some(vec![a]);
        }
    }
    None
}

/// For every unordered pair of distinct states, the shortest input sequence
/// that separates them (`λ*(p, w) != λ*(q, w)`), if one exists. A pair
/// absent from the map witnesses the FSM being non-reduced at that pair.
pub fn state_pair_shortest_separating_sequences(fsm: &Fsm) -> HashMap<PairKey, InputSequence> {
    let n = fsm.num_states();
    let mut sep: HashMap<PairKey, InputSequence> = HashMap::new();

    for p in 0..n {
        for q in (p + 1)..n {
            if let Some(w) = immediate_separator(fsm, p, q) {
                sep.insert((p, q), w);
            }
        }
    }

    loop {
        let mut changed = false;
        for p in 0..n {
            for q in (p + 1)..n {
                if sep.contains_key(&(p, q)) {
                    continue;
                }
                let mut best: Option<InputSequence> = None;
                for a in 0..fsm.num_inputs() {
                    let (np, nq) = (fsm.next(p, a), fsm.next(q, a));
                    if np == NULL_STATE || nq == NULL_STATE || np == nq {
                        continue;
                    }
                    if let Some(w) = sep.get(&pair_key(np, nq)) {
                        let mut candidate = Vec::with_capacity(w.len() + 1);
                        candidate.push(a);
                        candidate.extend(w.iter().copied());
                        if best.as_ref().map_or(true, |b| better(&candidate, b)) {
                            best = Some(candidate);
                        }
                    }
                }
                if let Some(w) = best {
                    sep.insert((p, q), w);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    sep
}

/// A node of the splitting tree: a subset of states not yet distinguished,
/// and (for internal nodes) the input sequence that refines it into its
/// children's equivalence classes (`spec.md` §3/§4.E).
#[derive(Debug, Clone)]
pub struct SplittingTree {
    pub states: Vec<StateId>,
    pub label: Option<InputSequence>,
    pub children: Vec<SplittingTree>,
}

impl SplittingTree {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Finds the leaf whose state set contains `q`.
    pub fn leaf_for(&self, q: StateId) -> Option<&SplittingTree> {
        if self.states.contains(&q) {
            if self.is_leaf() {
                return Some(self);
            }
            for child in &self.children {
                if let Some(leaf) = child.leaf_for(q) {
                    return Some(leaf);
                }
            }
        }
        None
    }

    /// The input-sequence labels on the path from the root to `q`'s leaf,
    /// root-first. Used to build harmonized state identifiers (component F).
    pub fn path_labels(&self, q: StateId) -> Vec<InputSequence> {
        let mut labels = Vec::new();
        self.collect_path(q, &mut labels);
        labels
    }

    fn collect_path(&self, q: StateId, labels: &mut Vec<InputSequence>) -> bool {
        if !self.states.contains(&q) {
            return false;
        }
        if let Some(label) = &self.label {
            labels.push(label.clone());
        }
        for child in &self.children {
            if child.collect_path(q, labels) {
                return true;
            }
        }
        self.is_leaf()
    }
}

/// Builds the splitting tree. Exists (all leaves singleton) iff the FSM is
/// reduced (`spec.md` §4.E); a non-singleton leaf witnesses a group of
/// states no input sequence can tell apart.
pub fn splitting_tree(fsm: &Fsm) -> SplittingTree {
    let sep = state_pair_shortest_separating_sequences(fsm);
    let all_states: Vec<StateId> = (0..fsm.num_states()).collect();
    build_node(fsm, all_states, &sep)
}

fn build_node(fsm: &Fsm, states: Vec<StateId>, sep: &HashMap<PairKey, InputSequence>) -> SplittingTree {
    if states.len() <= 1 {
        return SplittingTree {
            states,
            label: None,
            children: Vec::new(),
        };
    }

    let mut best: Option<&InputSequence> = None;
    for i in 0..states.len() {
        for j in (i + 1)..states.len() {
            if let Some(w) = sep.get(&pair_key(states[i], states[j])) {
                if best.map_or(true, |b| better(w, b)) {
                    best = Some(w);
                }
            }
        }
    }

    match best {
        None => SplittingTree {
            states,
            label: None,
            children: Vec::new(),
        },
        Some(w) => {
            let w = w.clone();
            let mut groups: BTreeMap<OutputSequence, Vec<StateId>> = BTreeMap::new();
            for &q in &states {
                let (out, _) = fsm.output_along(q, &w);
                groups.entry(out).or_default().push(q);
            }
            let children = groups.into_values().map(|g| build_node(fsm, g, sep)).collect();
            SplittingTree {
                states,
                label: Some(w),
                children,
            }
        }
    }
}

/// `true` iff every leaf of the splitting tree is a singleton, i.e. every
/// pair of distinct states has a separating sequence.
pub fn is_fully_separated(tree: &SplittingTree) -> bool {
    if tree.is_leaf() {
        tree.states.len() <= 1
    } else {
        tree.children.iter().all(is_fully_separated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FsmVariant;

    fn moore_3() -> Fsm {
        let mut fsm = Fsm::new(FsmVariant::Moore, 3, 2, 2);
        fsm.set_transition(0, 0, 1);
        fsm.set_transition(0, 1, 2);
        fsm.set_transition(1, 0, 0);
        fsm.set_transition(1, 1, 2);
        fsm.set_transition(2, 0, 2);
        fsm.set_transition(2, 1, 0);
        fsm.set_state_output(0, 0);
        fsm.set_state_output(1, 1);
        fsm.set_state_output(2, 1);
        fsm
    }

    #[test]
    fn separating_sequences_actually_separate() {
        let fsm = moore_3();
        let sep = state_pair_shortest_separating_sequences(&fsm);
        for (&(p, q), w) in &sep {
            let (out_p, _) = fsm.output_along(p, w);
            let (out_q, _) = fsm.output_along(q, w);
            assert_ne!(out_p, out_q, "({p},{q}) not actually separated by {w:?}");
            assert!(w.len() as u64 <= fsm.num_states() as u64);
        }
    }

    #[test]
    fn splitting_tree_is_fully_separated_for_reduced_fsm() {
        let fsm = moore_3();
        assert!(fsm.is_reduced());
        let tree = splitting_tree(&fsm);
        assert!(is_fully_separated(&tree));
    }

    #[test]
    fn splitting_tree_witnesses_nonreduced_states() {
        // States 1 and 2 are indistinguishable twins.
        let mut fsm = Fsm::new(FsmVariant::Moore, 3, 1, 1);
        fsm.set_transition(0, 0, 1);
        fsm.set_transition(1, 0, 1);
        fsm.set_transition(2, 0, 2);
        fsm.set_state_output(0, 0);
        fsm.set_state_output(1, 0);
        fsm.set_state_output(2, 0);
        assert!(!fsm.is_reduced());
        let tree = splitting_tree(&fsm);
        assert!(!is_fully_separated(&tree));
    }
}
