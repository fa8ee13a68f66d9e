use std::collections::HashSet;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::identity::Identity;

/// The set of identities eligible to vote, and the single admin allowed to
/// grow it.
///
/// Registration is monotonic: no removal operation exists, and registering
/// an already-registered voter succeeds as a no-op, so an admin
/// re-submitting the same address can never be destructive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRegistry {
    admin: Identity,
    registered: HashSet<Identity>,
}

impl VoterRegistry {
    /// An empty registry administered by `admin`. The admin identity is
    /// fixed for the life of the registry.
    pub fn new(admin: Identity) -> Self {
        Self {
            admin,
            registered: HashSet::new(),
        }
    }

    /// The administrative identity.
    pub fn admin(&self) -> &Identity {
        &self.admin
    }

    /// Mark `target` as eligible to vote. Admin only.
    pub fn register_voter(&mut self, caller: &Identity, target: Identity) -> Result<()> {
        if caller != &self.admin {
            warn!("{caller} attempted to register a voter without admin rights");
            return Err(Error::NotAdmin);
        }
        if self.registered.insert(target.clone()) {
            info!("Registered voter {target}");
        }
        Ok(())
    }

    /// Whether `target` is eligible to vote.
    pub fn is_registered(&self, target: &Identity) -> bool {
        self.registered.contains(target)
    }
}
