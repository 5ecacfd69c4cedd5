mod executor;
pub mod fsm;

pub use executor::Analyzer;
pub use fsm::{SequenceContext, SequenceEvent, SequenceState, SequenceStateMachine};
