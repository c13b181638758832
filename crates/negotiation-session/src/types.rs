use std::time::Duration;

use negotiation_model::{ConversationId, Outcome};

/// The default wall-clock timeout for a session's wait states (§4.3).
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-session parameters fixed at spawn time by the orchestrator.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub conversation_id: ConversationId,
    pub deadline_rounds: u32,
    pub wait_timeout: Duration,
}

/// What a session reports back to the orchestrator on termination. A
/// successful multi-bid proposal yields one `Outcome` per accepted bid; the
/// Solver later enforces that at most one of a seller's outcomes is used.
#[derive(Clone, Debug)]
pub enum SessionResult {
    Success(Vec<Outcome>),
    Failed,
}
