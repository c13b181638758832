use derive_more::Display;
use uuid::Uuid;

use crate::{outcome::Outcome, party::PartyId, Proposal};

/// Stable, exact protocol identifiers used for message dispatch. These are
/// never used for business-logic branching beyond routing/logging.
pub const DEFINE_TASK_PROTOCOL: &str = "define-task-protocol";
pub const GET_BUNDLES_PROTOCOL: &str = "get-bundles-protocol";
pub const REPORT_NEGOTIATION_RESULT_PROTOCOL: &str = "report-negotiation-result";

/// A session's conversation identifier, fixed at session start and carried
/// on every message exchanged within that session.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// A fresh token attached to every outbound message; the next inbound
/// message must carry it as `in_reply_to` to be accepted by the session's
/// correlation filter.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Display, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ReplyToken(String);

impl ReplyToken {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Performative {
    Request,
    Propose,
    Accept,
    Inform,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Proposal(Proposal),
    Outcome(Outcome),
    Demand(String),
    Ack,
}

/// The wire message exchanged between buyer and seller sessions.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Envelope {
    pub performative: Performative,
    pub sender: PartyId,
    pub receiver: PartyId,
    pub conversation_id: ConversationId,
    pub in_reply_to: Option<ReplyToken>,
    pub reply_with: ReplyToken,
    pub content: Content,
}
