use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::election::CandidateId;
use crate::model::identity::Identity;

/// A single entry on the ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Ballot position, assigned in insertion order starting at 1.
    pub id: CandidateId,
    /// Display name. Names are not unique; candidates stay distinct by ID.
    pub name: String,
}

/// The ordered roster of candidates.
///
/// Additions are admin-gated but have no lifecycle gate: the roster accepts
/// new candidates even after the election starts. Stopping that is left to
/// the calling layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRegistry {
    admin: Identity,
    // Invariant: candidates[i].id == i + 1.
    candidates: Vec<Candidate>,
}

impl CandidateRegistry {
    /// An empty roster administered by `admin`.
    pub fn new(admin: Identity) -> Self {
        Self {
            admin,
            candidates: Vec::new(),
        }
    }

    /// Append a candidate and return its assigned ID. Admin only.
    ///
    /// The name must be non-empty after trimming; duplicates are allowed.
    pub fn add_candidate(&mut self, caller: &Identity, name: &str) -> Result<CandidateId> {
        if caller != &self.admin {
            warn!("{caller} attempted to add a candidate without admin rights");
            return Err(Error::NotAdmin);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "candidate name must not be empty".to_string(),
            ));
        }

        let id = self.candidates.len() as CandidateId + 1;
        self.candidates.push(Candidate {
            id,
            name: name.to_string(),
        });
        info!("Added candidate {id}: {name}");
        Ok(id)
    }

    /// Number of candidates on the roster.
    pub fn count(&self) -> u32 {
        self.candidates.len() as u32
    }

    /// Look up a candidate by ID. IDs start at 1, so 0 is never valid.
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        id.checked_sub(1)
            .and_then(|index| self.candidates.get(index as usize))
    }

    /// All candidates in ballot order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}
