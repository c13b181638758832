//! Routes envelopes arriving on a shared inbound stream to the mailbox of
//! the session whose conversation-id they carry. This is the coarse
//! (conversation-id) routing layer; the finer (sender, in-reply-to) filter
//! lives in each session's own receive loop (`session::recv_matching`),
//! since it depends on state — the last reply token — only the session
//! itself holds.

use std::collections::HashMap;

use negotiation_model::{ConversationId, Envelope};
use tokio::sync::mpsc;

/// A session announcing itself to the router so inbound traffic for its
/// conversation can find its mailbox.
pub struct Registration {
    pub conversation_id: ConversationId,
    pub mailbox: mpsc::Sender<Envelope>,
}

/// Runs until the inbound stream closes. Registrations may keep arriving
/// for as long as the orchestrator that owns the sending half is alive.
pub async fn run_router(
    mut inbound: mpsc::Receiver<Envelope>,
    mut registrations: mpsc::Receiver<Registration>,
) {
    let mut mailboxes: HashMap<ConversationId, mpsc::Sender<Envelope>> = HashMap::new();

    loop {
        tokio::select! {
            registration = registrations.recv() => {
                match registration {
                    Some(Registration { conversation_id, mailbox }) => {
                        mailboxes.insert(conversation_id, mailbox);
                    }
                    None => {
                        // No more sessions will register; keep forwarding until
                        // the inbound stream itself closes.
                    }
                }
            }
            envelope = inbound.recv() => {
                match envelope {
                    Some(envelope) => route(&mut mailboxes, envelope).await,
                    None => break,
                }
            }
        }
    }
}

async fn route(
    mailboxes: &mut HashMap<ConversationId, mpsc::Sender<Envelope>>,
    envelope: Envelope,
) {
    match mailboxes.get(&envelope.conversation_id) {
        Some(mailbox) => {
            if mailbox.send(envelope).await.is_err() {
                tracing::trace!("session mailbox closed, dropping message");
            }
        }
        None => {
            tracing::trace!(
                conversation_id = %envelope.conversation_id,
                "no session registered for conversation, dropping message"
            );
        }
    }
}
