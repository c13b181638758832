//! Shared data model for the procurement negotiation engine.
//!
//! Every other crate in the workspace (`negotiation-config`,
//! `negotiation-evaluator`, `negotiation-concessor`, `negotiation-session`,
//! `negotiation-solver`, `negotiation-orchestrator`) depends on this crate
//! rather than defining its own copies of `Bid`, `Proposal`, `Outcome`, etc.

pub mod bid;
pub mod bundle;
pub mod error;
pub mod issue;
pub mod message;
pub mod outcome;
pub mod party;
pub mod product;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use bid::Bid;
pub use bundle::{Bundle, BundleId, BundleItem, SynergyBounds};
pub use error::Error;
pub use issue::{IssueEntry, IssueKind, IssueParameters, IssueValue, LinguisticGrade};
pub use message::{Content, ConversationId, Envelope, Performative, ReplyToken};
pub use outcome::Outcome;
pub use party::{PartyId, Role, SellerId};
pub use product::ProductId;

/// A non-empty, immutable, ordered list of bids. Each bundle id appears at
/// most once within a proposal.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Proposal {
    bids: Vec<Bid>,
}

impl Proposal {
    pub fn new(bids: Vec<Bid>) -> Result<Self, Error> {
        if bids.is_empty() {
            return Err(Error::InvalidProposal("proposal must contain at least one bid".into()));
        }
        let mut seen = std::collections::HashSet::with_capacity(bids.len());
        for bid in &bids {
            if !seen.insert(bid.bundle().id().clone()) {
                return Err(Error::InvalidProposal(format!(
                    "bundle {} appears more than once in proposal",
                    bid.bundle().id()
                )));
            }
        }
        Ok(Self { bids })
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn into_bids(self) -> Vec<Bid> {
        self.bids
    }
}
