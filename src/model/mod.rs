pub mod candidate;
pub mod election;
pub mod identity;
pub mod voter;
