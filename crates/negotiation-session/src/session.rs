//! The bilateral session FSM (§4.3): `Request`/`InitialOffer` →
//! `WaitProposal`/`WaitResponse` → `Evaluate` → `Accept`/`Counter` → `End`.
//! Buyer and seller are driven by the same `negotiate` loop, parameterised
//! by which side of the table `role` sits on; only the opening move differs:
//! `run_buyer_session` sends a bare CFP and then waits for a reply to it;
//! `run_seller_session` first waits for that CFP (its `InitialOffer` state
//! is triggered by "CFP received", per §4.3) and only then builds and sends
//! an opening multi-bid proposal whose `in_reply_to` references the CFP's
//! reply token.

use std::sync::Arc;

use negotiation_concessor::Concessor;
use negotiation_config::Config;
use negotiation_evaluator::{Evaluator, SynergyCache};
use negotiation_model::{
    bid::Bid,
    bundle::Bundle,
    issue::{IssueEntry, IssueKind, IssueValue, LinguisticGrade, RECOGNIZED_ISSUES},
    message::{Content, ConversationId, Envelope, Performative, ReplyToken},
    party::{PartyId, SellerId},
    Error, Outcome, Proposal,
};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::types::{SessionConfig, SessionResult};

/// Drives the buyer side: send a bare CFP, then negotiate.
pub async fn run_buyer_session(
    config: &Config,
    cache: &SynergyCache,
    seller_id: SellerId,
    session_config: SessionConfig,
    outbox: mpsc::Sender<Envelope>,
    inbox: mpsc::Receiver<Envelope>,
) -> SessionResult {
    let role = PartyId::Buyer;
    let counterparty = PartyId::Seller(seller_id.clone());
    let reply_with = ReplyToken::new_random();
    let request = Envelope {
        performative: Performative::Request,
        sender: role.clone(),
        receiver: counterparty.clone(),
        conversation_id: session_config.conversation_id.clone(),
        in_reply_to: None,
        reply_with: reply_with.clone(),
        content: Content::Ack,
    };
    if outbox.send(request).await.is_err() {
        tracing::warn!(%role, "counterparty mailbox closed before the CFP could be sent");
        return SessionResult::Failed;
    }

    negotiate(
        config,
        cache,
        role,
        counterparty,
        seller_id,
        session_config,
        outbox,
        inbox,
        reply_with,
        None,
    )
    .await
}

/// Drives the seller side: wait for the buyer's CFP, build an opening
/// multi-bid proposal (one bid per `catalog` bundle, each at the seller's
/// own worst-for-buyer extreme, via the Concessor at round 1) that replies
/// to that CFP, then negotiate.
pub async fn run_seller_session(
    config: &Config,
    cache: &SynergyCache,
    seller_id: SellerId,
    catalog: Vec<Arc<Bundle>>,
    session_config: SessionConfig,
    outbox: mpsc::Sender<Envelope>,
    mut inbox: mpsc::Receiver<Envelope>,
) -> SessionResult {
    let role = PartyId::Seller(seller_id.clone());
    let counterparty = PartyId::Buyer;
    let concessor = Concessor::new(config, cache);

    let cfp = match recv_initial_request(
        &mut inbox,
        &counterparty,
        &session_config.conversation_id,
        session_config.wait_timeout,
    )
    .await
    {
        Ok(envelope) => envelope,
        Err(_) => {
            tracing::info!(%role, %seller_id, "timed out waiting for the buyer's CFP");
            return SessionResult::Failed;
        }
    };

    let mut opening_bids = Vec::with_capacity(catalog.len());
    for bundle in &catalog {
        let seed = match seed_bid(bundle) {
            Ok(seed) => seed,
            Err(error) => {
                tracing::error!(%error, bundle = %bundle.id(), "failed to seed opening bid, ending session in failure");
                return SessionResult::Failed;
            }
        };
        opening_bids.push(concessor.concede(&seed, 1, session_config.deadline_rounds, &role));
    }
    let opening_proposal = match Proposal::new(opening_bids) {
        Ok(proposal) => proposal,
        Err(error) => {
            tracing::error!(%error, "failed to build opening proposal, ending session in failure");
            return SessionResult::Failed;
        }
    };

    let reply_with = ReplyToken::new_random();
    let initial_offer = Envelope {
        performative: Performative::Propose,
        sender: role.clone(),
        receiver: counterparty.clone(),
        conversation_id: session_config.conversation_id.clone(),
        in_reply_to: Some(cfp.reply_with.clone()),
        reply_with: reply_with.clone(),
        content: Content::Proposal(opening_proposal.clone()),
    };
    if outbox.send(initial_offer).await.is_err() {
        tracing::warn!(%role, "counterparty mailbox closed before the opening offer could be sent");
        return SessionResult::Failed;
    }

    negotiate(
        config,
        cache,
        role,
        counterparty,
        seller_id,
        session_config,
        outbox,
        inbox,
        reply_with,
        Some(opening_proposal),
    )
    .await
}

/// The shared post-opening-move loop: wait for a matching reply, evaluate it,
/// accept, counter, or fail on timeout/deadline/protocol desynchronisation.
/// `last_tok` is the reply token of the opening message the caller has
/// already sent; the first inbound message accepted must carry it as
/// `in_reply_to`.
#[allow(clippy::too_many_arguments)]
async fn negotiate(
    config: &Config,
    cache: &SynergyCache,
    role: PartyId,
    counterparty: PartyId,
    seller_id: SellerId,
    session_config: SessionConfig,
    outbox: mpsc::Sender<Envelope>,
    mut inbox: mpsc::Receiver<Envelope>,
    mut last_tok: ReplyToken,
    mut last_sent_proposal: Option<Proposal>,
) -> SessionResult {
    let evaluator = Evaluator::new(config, cache);
    let concessor = Concessor::new(config, cache);
    let threshold = config.party_params(&role).acceptance_threshold;

    let mut round: u32 = 1;
    loop {
        let envelope = match recv_matching(
            &mut inbox,
            &counterparty,
            &session_config.conversation_id,
            &last_tok,
            session_config.wait_timeout,
        )
        .await
        {
            Ok(envelope) => envelope,
            Err(_) => {
                tracing::info!(%role, %seller_id, round, "session timed out waiting for a reply");
                return SessionResult::Failed;
            }
        };

        match envelope.performative {
            Performative::Accept => {
                return match &last_sent_proposal {
                    Some(proposal) => SessionResult::Success(to_outcomes(&evaluator, proposal, &seller_id)),
                    None => {
                        tracing::warn!(%role, "received ACCEPT with no outstanding proposal, ending session in failure");
                        SessionResult::Failed
                    }
                };
            }
            Performative::Propose => {
                let incoming = match envelope.content {
                    Content::Proposal(proposal) => proposal,
                    _ => {
                        tracing::warn!(%role, "expected a proposal, got a different content, ending session in failure");
                        return SessionResult::Failed;
                    }
                };

                if round > session_config.deadline_rounds {
                    tracing::info!(%role, %seller_id, round, "deadline exhausted, ending session in failure");
                    return SessionResult::Failed;
                }
                round += 1;

                let mut all_acceptable = true;
                for bid in incoming.bids() {
                    if !acceptable(&evaluator, &concessor, &role, bid, round, session_config.deadline_rounds, threshold) {
                        all_acceptable = false;
                        break;
                    }
                }

                if all_acceptable {
                    let accept = Envelope {
                        performative: Performative::Accept,
                        sender: role.clone(),
                        receiver: counterparty.clone(),
                        conversation_id: session_config.conversation_id.clone(),
                        in_reply_to: Some(envelope.reply_with.clone()),
                        reply_with: ReplyToken::new_random(),
                        content: Content::Ack,
                    };
                    let _ = outbox.send(accept).await;
                    return SessionResult::Success(to_outcomes(&evaluator, &incoming, &seller_id));
                }

                let counter_bids: Vec<Bid> = incoming
                    .bids()
                    .iter()
                    .map(|bid| concessor.concede(bid, round, session_config.deadline_rounds, &role))
                    .collect();
                let counter_proposal = match Proposal::new(counter_bids) {
                    Ok(proposal) => proposal,
                    Err(error) => {
                        tracing::error!(%error, %role, "failed to build counter-proposal, ending session in failure");
                        return SessionResult::Failed;
                    }
                };

                let reply_with = ReplyToken::new_random();
                let counter = Envelope {
                    performative: Performative::Propose,
                    sender: role.clone(),
                    receiver: counterparty.clone(),
                    conversation_id: session_config.conversation_id.clone(),
                    in_reply_to: Some(envelope.reply_with.clone()),
                    reply_with: reply_with.clone(),
                    content: Content::Proposal(counter_proposal.clone()),
                };
                if outbox.send(counter).await.is_err() {
                    tracing::warn!(%role, "counterparty mailbox closed while sending counter-proposal");
                    return SessionResult::Failed;
                }
                last_tok = reply_with;
                last_sent_proposal = Some(counter_proposal);
            }
            Performative::Request | Performative::Inform => {
                tracing::warn!(%role, "unexpected performative, ending session in failure");
                return SessionResult::Failed;
            }
        }
    }
}

/// Buyer: `U(received) >= threshold AND U(received) >= U(hypothetical next
/// counter)`. Seller: threshold test only.
fn acceptable(
    evaluator: &Evaluator<'_>,
    concessor: &Concessor<'_>,
    role: &PartyId,
    bid: &Bid,
    round: u32,
    deadline: u32,
    threshold: f64,
) -> bool {
    let utility = evaluator.evaluate(role, bid);
    match role {
        PartyId::Buyer => {
            let hypothetical = concessor.concede(bid, round, deadline, role);
            let hypothetical_utility = evaluator.evaluate(role, &hypothetical);
            utility >= threshold && utility >= hypothetical_utility
        }
        PartyId::Seller(_) => utility >= threshold,
    }
}

/// A session's outcomes are always valued from the buyer's perspective,
/// regardless of which side produced them.
fn to_outcomes(evaluator: &Evaluator<'_>, proposal: &Proposal, seller_id: &SellerId) -> Vec<Outcome> {
    proposal
        .bids()
        .iter()
        .map(|bid| {
            let utility = evaluator.evaluate(&PartyId::Buyer, bid);
            Outcome::new(bid.clone(), utility, seller_id.clone())
        })
        .collect()
}

/// Builds a placeholder bid for a catalog bundle; the Concessor overwrites
/// every issue value independently of this seed when computing the actual
/// opening extreme, so only validity (every recognised issue present, of
/// the shape the issue's kind implies) matters here.
fn seed_bid(bundle: &Arc<Bundle>) -> Result<Bid, Error> {
    let issues: Vec<IssueEntry> = RECOGNIZED_ISSUES
        .iter()
        .map(|(name, kind)| {
            let value = match kind {
                IssueKind::Qualitative => IssueValue::Linguistic(LinguisticGrade::Medium),
                IssueKind::Cost | IssueKind::Benefit => IssueValue::Number(0.0),
            };
            IssueEntry {
                name: (*name).to_string(),
                value,
            }
        })
        .collect();
    let quantities = bundle.items().iter().map(|item| item.quantity).collect();
    Bid::new(bundle.clone(), issues, quantities)
}

/// Waits for the buyer's opening CFP: the one message in a session that is
/// not itself a reply, so there is no `in_reply_to` token to correlate
/// against yet. Only sender and conversation are checked; everything else
/// is dropped, bounded by `wait_timeout`.
async fn recv_initial_request(
    inbox: &mut mpsc::Receiver<Envelope>,
    expected_sender: &PartyId,
    conversation_id: &ConversationId,
    wait_timeout: Duration,
) -> Result<Envelope, Error> {
    let wait = async {
        loop {
            let envelope = inbox.recv().await.ok_or(Error::Timeout)?;
            if &envelope.sender == expected_sender && &envelope.conversation_id == conversation_id {
                return Ok(envelope);
            }
            tracing::trace!("dropping message that fails the session's correlation filter");
        }
    };
    tokio::time::timeout(wait_timeout, wait).await.unwrap_or(Err(Error::Timeout))
}

/// Waits for the next message from `expected_sender` within this
/// conversation whose `in_reply_to` matches the last token we sent,
/// dropping everything else, bounded by `wait_timeout`. A closed mailbox is
/// treated the same as an elapsed timeout: the counterparty is gone.
async fn recv_matching(
    inbox: &mut mpsc::Receiver<Envelope>,
    expected_sender: &PartyId,
    conversation_id: &ConversationId,
    expected_reply_to: &ReplyToken,
    wait_timeout: Duration,
) -> Result<Envelope, Error> {
    let wait = async {
        loop {
            let envelope = inbox.recv().await.ok_or(Error::Timeout)?;
            if &envelope.sender == expected_sender
                && &envelope.conversation_id == conversation_id
                && envelope.in_reply_to.as_ref() == Some(expected_reply_to)
            {
                return Ok(envelope);
            }
            tracing::trace!("dropping message that fails the session's correlation filter");
        }
    };
    tokio::time::timeout(wait_timeout, wait).await.unwrap_or(Err(Error::Timeout))
}
