//! Core state machine for our decentralized voting system: voter
//! eligibility, the candidate roster, and the one-person-one-vote ledger
//! for a single timed election.
//!
//! The presentation layer (wallet connection, forms, result rendering)
//! lives elsewhere and only ever calls the public operations exposed here;
//! this crate holds all of the invariants worth enforcing.

pub mod clock;
pub mod error;
pub mod model;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use model::candidate::{Candidate, CandidateRegistry};
pub use model::election::{CandidateId, ElectionLedger, ElectionPhase, ElectionStatus};
pub use model::identity::Identity;
pub use model::voter::VoterRegistry;
