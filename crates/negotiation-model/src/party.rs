use std::fmt;

use derive_more::Display;

use crate::Error;

/// A seller's stable identifier, e.g. `s1`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Display, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SellerId(String);

impl SellerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SellerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Which side of the bilateral table a party sits on. There is a single
/// buyer per run; sellers are distinguished by `SellerId`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Buyer => f.write_str("buyer"),
            Role::Seller => f.write_str("seller"),
        }
    }
}

/// Identifies a party for the purposes of looking up per-party configuration
/// (weights, risk posture, concession posture, TFN tables, synergy overrides).
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyId {
    Buyer,
    Seller(SellerId),
}

impl PartyId {
    pub fn role(&self) -> Role {
        match self {
            PartyId::Buyer => Role::Buyer,
            PartyId::Seller(_) => Role::Seller,
        }
    }

    pub fn seller_id(&self) -> Result<&SellerId, Error> {
        match self {
            PartyId::Seller(id) => Ok(id),
            PartyId::Buyer => Err(Error::InvalidBid("expected a seller party".into())),
        }
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyId::Buyer => f.write_str("buyer"),
            PartyId::Seller(id) => write!(f, "seller:{id}"),
        }
    }
}
