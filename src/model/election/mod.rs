mod ledger;
mod state;

pub use ledger::ElectionLedger;
pub use state::{ElectionPhase, ElectionState, ElectionStatus};

/// Our candidate IDs are integers, assigned sequentially from 1.
pub type CandidateId = u32;
