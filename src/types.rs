//! Shared alphabet types and the sentinel values used across the crate.
//!
//! States, inputs and outputs are all dense, non-negative integers (`[0..n)`)
//! per the data model. The sentinels below are *distinct values*, not
//! `Option`-style wrappers: every operation that may fail documents whether
//! it returns one of these or an empty sequence/collection.

use std::fmt;

/// Identifier for a single state. States are drawn from `[0..num_states)`.
pub type StateId = usize;

/// Identifier for a single input symbol, drawn from `[0..num_inputs)`
/// (plus the reserved [`STOUT_INPUT`] pseudo-input).
pub type InputId = usize;

/// Identifier for a single output symbol, drawn from `[0..num_outputs)`.
pub type OutputId = usize;

/// Absent state: returned by `next`/`endStatePath` when a transition (or
/// path) is undefined. Not a valid member of `[0..num_states)`.
pub const NULL_STATE: StateId = StateId::MAX;

/// Same sentinel, named for its use as a path-walk failure result
/// (`outputAlong` stops at the first undefined transition and reports this).
pub const WRONG_STATE: StateId = StateId::MAX;

/// Pseudo-input that, on an output-state FSM (Moore/DFA/DFSM), produces the
/// current state's output without advancing the state. Valid only when
/// [`crate::fsm::FsmVariant::is_output_state`] holds for the FSM in question.
pub const STOUT_INPUT: InputId = InputId::MAX;

/// Missing or undefined output, distinct from any output in `[0..num_outputs)`.
pub const DEFAULT_OUTPUT: OutputId = OutputId::MAX;

/// Alias for [`DEFAULT_OUTPUT`] used where the source speaks of an
/// observed-but-unexpected output rather than a structurally absent one.
pub const WRONG_OUTPUT: OutputId = OutputId::MAX;

/// An input sequence: an ordered list of inputs, possibly including
/// [`STOUT_INPUT`].
pub type InputSequence = Vec<InputId>;

/// An output sequence: an ordered list of outputs.
pub type OutputSequence = Vec<OutputId>;

/// The four FSM variants the data model distinguishes. See `spec.md` §3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FsmVariant {
    /// Binary-output Moore machine.
    Dfa,
    /// Output depends on the destination state only.
    Moore,
    /// Output depends on the transition (source state + input).
    Mealy,
    /// Produces both a transition output and a state output.
    Dfsm,
}

impl FsmVariant {
    /// `type` field of the `.fsm` file format (§4.A).
    pub fn from_type_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FsmVariant::Dfa),
            1 => Some(FsmVariant::Moore),
            2 => Some(FsmVariant::Mealy),
            3 => Some(FsmVariant::Dfsm),
            _ => None,
        }
    }

    pub fn type_code(self) -> u8 {
        match self {
            FsmVariant::Dfa => 0,
            FsmVariant::Moore => 1,
            FsmVariant::Mealy => 2,
            FsmVariant::Dfsm => 3,
        }
    }

    /// Whether `λ(q, STOUT_INPUT) = stateOutput(q)` is meaningful for this
    /// variant, i.e. outputs are (at least partly) bound to states.
    pub const fn is_output_state(self) -> bool {
        matches!(self, FsmVariant::Dfa | FsmVariant::Moore | FsmVariant::Dfsm)
    }

    /// Whether `λ(q, a)` depends on the transition taken, not just the
    /// destination state.
    pub const fn is_output_transition(self) -> bool {
        matches!(self, FsmVariant::Mealy | FsmVariant::Dfsm)
    }
}

impl fmt::Display for FsmVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FsmVariant::Dfa => "DFA",
            FsmVariant::Moore => "Moore",
            FsmVariant::Mealy => "Mealy",
            FsmVariant::Dfsm => "DFSM",
        };
        f.write_str(s)
    }
}

/// Renders a single input for human-readable output (CLI, DOT labels).
/// [`STOUT_INPUT`] is rendered as `-`, matching the original CLI's
/// human-readable marker (`spec.md` §6).
pub fn input_to_string(input: InputId) -> String {
    if input == STOUT_INPUT {
        "-".to_string()
    } else {
        input.to_string()
    }
}

/// Renders a whole input sequence as space-separated symbols (§6).
pub fn sequence_to_string(seq: &[InputId]) -> String {
    seq.iter()
        .map(|&i| input_to_string(i))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_distinct_from_valid_range() {
        assert!(NULL_STATE > 0);
        assert_ne!(STOUT_INPUT, 0);
        assert_ne!(DEFAULT_OUTPUT, 0);
    }

    #[test]
    fn variant_round_trips_type_code() {
        for v in [
            FsmVariant::Dfa,
            FsmVariant::Moore,
            FsmVariant::Mealy,
            FsmVariant::Dfsm,
        ] {
            assert_eq!(FsmVariant::from_type_code(v.type_code()), Some(v));
        }
        assert_eq!(FsmVariant::from_type_code(4), None);
    }

    #[test]
    fn stout_rendering_uses_dash() {
        assert_eq!(sequence_to_string(&[0, STOUT_INPUT, 1]), "0 - 1");
    }
}
