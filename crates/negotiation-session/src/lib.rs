//! One bilateral buyer-seller negotiation dialogue (§4.3): an explicit
//! finite state machine plus the conversation-scoped message router it runs
//! behind.

pub mod router;
mod session;
mod types;

pub use router::{run_router, Registration};
pub use session::{run_buyer_session, run_seller_session};
pub use types::{SessionConfig, SessionResult, DEFAULT_WAIT_TIMEOUT};
