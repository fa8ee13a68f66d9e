use std::fmt::{Display, Formatter};
use std::str::FromStr;

use data_encoding::HEXLOWER_PERMISSIVE;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Expected number of hex digits in an account address.
const ADDRESS_HEX_LEN: usize = 40;

/// An opaque account handle identifying a caller: `0x` plus 40 hex digits.
///
/// The handle format is case-insensitive, so the hex digits are lowercased
/// once at construction; every later comparison is plain structural
/// equality on the normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Parse and normalize an address.
    pub fn new(address: &str) -> Result<Self, Error> {
        let address = address.trim();
        let hex = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .ok_or_else(|| {
                Error::InvalidInput(format!("address must start with 0x: '{address}'"))
            })?;
        if hex.len() != ADDRESS_HEX_LEN {
            return Err(Error::InvalidInput(format!(
                "address must contain {ADDRESS_HEX_LEN} hex digits, got {}",
                hex.len()
            )));
        }
        HEXLOWER_PERMISSIVE.decode(hex.as_bytes()).map_err(|_| {
            Error::InvalidInput(format!("address contains non-hex characters: '{address}'"))
        })?;

        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// The normalized textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
