//! Checking-experiment construction for finite state machines.
//!
//! Builds the discriminating structures (state cover, separating sequences,
//! PDS/ADS/SVS/SCSet/CSet/HSI) and the test-suite and checking-sequence
//! methods (W, Wp, HSI, H, SPY, SPYH, C, Ma, Mra) that consume them, proving
//! conformance of an implementation to a specification FSM up to a bounded
//! number of hidden states.

pub mod basic_sets;
pub mod error;
pub mod fsm;
pub mod identifiers;
pub mod methods;
pub mod prefix_set;
pub mod reporter;
pub mod separating;
pub mod shortest_paths;
pub mod stout;
pub mod types;

pub use error::{FsmError, Result};
pub use fsm::Fsm;
pub use types::{FsmVariant, InputSequence, OutputSequence, StateId};
