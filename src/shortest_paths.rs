//! Component C: all-pairs shortest input sequences over the transition
//! graph, ignoring outputs. Grounded in
//! `original_source/FSMlib/Model/FSMmodel.h` (`createAllShortestPaths`,
//! `getShortestPath`).

use std::collections::VecDeque;

use crate::fsm::Fsm;
use crate::types::{InputId, InputSequence, StateId, NULL_STATE};

/// `table[to][from] = Some((pred_input, pred_state))` on the shortest-path
/// tree rooted at `to` (single-source BFS on the reverse graph), or `None`
/// if `from` cannot reach `to`. Mirrors the `shortest_paths_t` matrix in
/// `spec.md` §4.C.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    num_states: StateId,
    table: Vec<Vec<Option<(InputId, StateId)>>>,
}

impl ShortestPaths {
    pub fn num_states(&self) -> StateId {
        self.num_states
    }

    pub fn predecessor(&self, to: StateId, from: StateId) -> Option<(InputId, StateId)> {
        self.table[to][from]
    }
}

/// Computes the all-pairs shortest-path table via one multi-source-style BFS
/// per destination state on the reversed transition graph.
pub fn all_shortest_paths(fsm: &Fsm) -> ShortestPaths {
    let n = fsm.num_states();

    // Build reverse adjacency once: rev[q] = list of (pred, input) with pred --input--> q.
    let mut rev: Vec<Vec<(StateId, InputId)>> = vec![Vec::new(); n];
    for q in 0..n {
        for a in 0..fsm.num_inputs() {
            let nxt = fsm.next(q, a);
            if nxt != NULL_STATE {
                rev[nxt].push((q, a));
            }
        }
    }

    let mut table = Vec::with_capacity(n);
    for dest in 0..n {
        let mut pred: Vec<Option<(InputId, StateId)>> = vec![None; n];
        let mut visited = vec![false; n];
        visited[dest] = true;
        let mut queue = VecDeque::new();
        queue.push_back(dest);
        while let Some(cur) = queue.pop_front() {
            for &(from, input) in &rev[cur] {
                if !visited[from] {
                    visited[from] = true;
                    pred[from] = Some((input, cur));
                    queue.push_back(from);
                }
            }
        }
        table.push(pred);
    }

    ShortestPaths { num_states: n, table }
}

/// Reconstructs the shortest input sequence from `from` to `to`. Returns the
/// empty sequence both when `from == to` and when no path exists — the two
/// cases are distinguished by caller context, per `spec.md` §4.C.
pub fn get_shortest_path(paths: &ShortestPaths, from: StateId, to: StateId) -> InputSequence {
    if from == to {
        return Vec::new();
    }
    let mut seq = Vec::new();
    let mut cur = from;
    loop {
        match paths.predecessor(to, cur) {
            Some((input, next)) => {
                seq.push(input);
                if next == to {
                    break;
                }
                cur = next;
            }
            None => return Vec::new(),
        }
    }
    seq
}
