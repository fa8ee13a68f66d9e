use thiserror::Error;

use crate::model::election::CandidateId;

pub type Result<T> = std::result::Result<T, Error>;

/// Every rejection the core can report.
///
/// All variants are caller-input or authorization faults, surfaced
/// synchronously with no partial state change; nothing here is internal or
/// fatal. Retrying is the presentation layer's decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("caller is not the election admin")]
    NotAdmin,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("the election has already been started")]
    AlreadyStarted,
    #[error("the election is not currently active")]
    NotActive,
    #[error("you are not registered to vote")]
    NotRegistered,
    #[error("you have already voted")]
    AlreadyVoted,
    #[error("no candidate with ID {0}")]
    InvalidCandidate(CandidateId),
}
