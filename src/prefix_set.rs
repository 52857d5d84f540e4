//! Component B: a trie of input sequences supporting insertion and
//! extraction of the maximal-length sequences it holds. Every testing method
//! in `src/methods` pours its candidate sequences through a [`PrefixSet`]
//! before returning, which is the crate's canonical suite-minimisation step
//! (component H, `spec.md` §4.H).
//!
//! Grounded in the trie usage pattern in
//! `original_source/FSMlib/Testing/SVS-method.cpp` (`FSMlib::PrefixSet pset;
//! pset.insert(...); pset.getMaximalSequences()`), implemented here as an
//! owned arena of child maps in the style of `dennisss-dacha`'s tree modules
//! (`pkg/common/src/tree/avl.rs`).

use std::collections::BTreeMap;

use crate::types::InputId;

#[derive(Default, Debug, Clone)]
struct Node {
    terminal: bool,
    children: BTreeMap<InputId, Node>,
}

/// A multi-way trie keyed on inputs. See `spec.md` §3/§4.B.
#[derive(Default, Debug, Clone)]
pub struct PrefixSet {
    root: Node,
}

impl PrefixSet {
    pub fn new() -> Self {
        PrefixSet::default()
    }

    /// Inserts `seq`, marking its terminal node. Idempotent. Any terminal
    /// ancestor of the inserted node is un-marked, preserving the invariant
    /// that no terminal sequence is a strict prefix of another terminal
    /// sequence (`spec.md` §4.B).
    pub fn insert(&mut self, seq: impl IntoIterator<Item = InputId>) {
        let mut node = &mut self.root;
        let mut first = true;
        for input in seq {
            if first {
                first = false;
            } else {
                // Un-mark any intermediate terminal so it stops being
                // reported as maximal once something extends past it.
                node.terminal = false;
            }
            node = node.children.entry(input).or_default();
        }
        node.terminal = true;
    }

    /// Whether `seq` (exactly) was inserted and is still marked terminal, or
    /// is a prefix of the trie's structure.
    pub fn contains(&self, seq: &[InputId]) -> bool {
        let mut node = &self.root;
        for &input in seq {
            match node.children.get(&input) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.terminal
    }

    /// The set of terminal sequences with no terminal descendant — i.e. the
    /// maximal-length sequences stored (`spec.md` §4.B).
    pub fn maximal_sequences(&self) -> Vec<Vec<InputId>> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        collect_maximal(&self.root, &mut prefix, &mut out);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty() && !self.root.terminal
    }
}

fn collect_maximal(node: &Node, prefix: &mut Vec<InputId>, out: &mut Vec<Vec<InputId>>) {
    if node.children.is_empty() {
        if node.terminal {
            out.push(prefix.clone());
        }
        return;
    }
    let before = out.len();
    for (&input, child) in &node.children {
        prefix.push(input);
        collect_maximal(child, prefix, out);
        prefix.pop();
    }
    // A terminal node with descendants only counts as maximal if none of its
    // descendants turned out to be terminal themselves.
    if node.terminal && out.len() == before {
        out.push(prefix.clone());
    }
}
