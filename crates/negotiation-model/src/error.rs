//! The error taxonomy of the negotiation engine (see the error handling
//! design notes). Most variants are logged as warnings by the crate that
//! detects them and do not abort the run; only configuration unreadable at
//! startup is treated as fatal by `negotiation-config`.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid bid: {0}")]
    InvalidBid(String),

    #[error("invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("configuration key {key} missing or malformed, using default")]
    ConfigFallback { key: String },

    #[error("configuration unreadable at startup: {0}")]
    ConfigUnreadable(String),

    #[error("bundle parameters missing for party {party}, bundle {bundle}, issue {issue}")]
    BundleParamsMissing {
        party: String,
        bundle: String,
        issue: String,
    },

    #[error("inbound message failed correlation filter")]
    MessageCorrelationFailure,

    #[error("inbound message content unreadable: {0}")]
    UnreadableMessage(String),

    #[error("wait state timed out")]
    Timeout,

    #[error("no combination of outcomes satisfies demand")]
    SolverInfeasible,
}
