//! Owns the end-to-end procurement run (§4.4): parse a demand string, spawn
//! one bilateral session per known seller, collect their outcomes, invoke
//! the Solver, and log the winning set.

pub mod demand;

use std::{collections::HashMap, sync::Arc, time::Duration};

use negotiation_config::Config;
use negotiation_evaluator::SynergyCache;
use negotiation_model::{
    bundle::Bundle,
    message::ConversationId,
    party::SellerId,
    Outcome,
};
use negotiation_session::{
    run_buyer_session, run_router, run_seller_session, Registration, SessionConfig, SessionResult,
    DEFAULT_WAIT_TIMEOUT,
};
use negotiation_solver::Solution;
use tokio::sync::mpsc;

/// How many in-flight envelopes the shared bus and registration channels
/// will buffer before a sender has to wait.
const BUS_CAPACITY: usize = 1024;
const MAILBOX_CAPACITY: usize = 32;

/// The roster of sellers a run negotiates against, each with the bundles it
/// is prepared to offer. Fetching this catalog from an external source is
/// explicitly advisory and out of scope (§4.4 step 2); callers build it
/// however they like and hand it to the Orchestrator.
pub type SellerCatalog = HashMap<SellerId, Vec<Arc<Bundle>>>;

pub struct Orchestrator {
    config: Arc<Config>,
    cache: Arc<SynergyCache>,
    sellers: SellerCatalog,
    global_timeout: Duration,
}

impl Orchestrator {
    pub fn new(config: Config, sellers: SellerCatalog) -> Self {
        let global_timeout = default_global_timeout(&sellers);
        Self::with_global_timeout(config, sellers, global_timeout)
    }

    pub fn with_global_timeout(config: Config, sellers: SellerCatalog, global_timeout: Duration) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(SynergyCache::new()),
            sellers,
            global_timeout,
        }
    }

    /// Runs one demand to completion: spawns a session per seller, waits for
    /// every session to finish (or the global timeout to elapse), and
    /// returns the winning set. Solver infeasibility is not an error at this
    /// level (§7 condition 6) — it surfaces as an empty, zero-utility
    /// solution, logged at `info`.
    pub async fn run_once(&self, demand_str: &str) -> Solution {
        let demand = demand::parse(demand_str);

        let (bus_tx, bus_rx) = mpsc::channel(BUS_CAPACITY);
        let (registrations_tx, registrations_rx) = mpsc::channel(self.sellers.len().max(1) * 2);
        let router = tokio::spawn(run_router(bus_rx, registrations_rx));

        let mut buyer_handles = Vec::with_capacity(self.sellers.len());
        let mut seller_handles = Vec::with_capacity(self.sellers.len());

        for (seller_id, catalog) in &self.sellers {
            let conversation_id = ConversationId::new_random();
            let (buyer_mailbox_tx, buyer_mailbox_rx) = mpsc::channel(MAILBOX_CAPACITY);
            let (seller_mailbox_tx, seller_mailbox_rx) = mpsc::channel(MAILBOX_CAPACITY);

            let registered_buyer = registrations_tx
                .send(Registration {
                    conversation_id: conversation_id.clone(),
                    mailbox: buyer_mailbox_tx,
                })
                .await
                .is_ok();
            let registered_seller = registrations_tx
                .send(Registration {
                    conversation_id: conversation_id.clone(),
                    mailbox: seller_mailbox_tx,
                })
                .await
                .is_ok();
            if !registered_buyer || !registered_seller {
                tracing::warn!(%seller_id, "router unavailable, skipping seller for this run");
                continue;
            }

            let session_config = SessionConfig {
                conversation_id,
                deadline_rounds: self.config.negotiation().max_rounds,
                wait_timeout: DEFAULT_WAIT_TIMEOUT,
            };

            let config = Arc::clone(&self.config);
            let cache = Arc::clone(&self.cache);
            let seller_id_for_buyer = seller_id.clone();
            let buyer_session_config = session_config.clone();
            let buyer_outbox = bus_tx.clone();
            buyer_handles.push(tokio::spawn(async move {
                run_buyer_session(
                    &config,
                    &cache,
                    seller_id_for_buyer,
                    buyer_session_config,
                    buyer_outbox,
                    buyer_mailbox_rx,
                )
                .await
            }));

            let config = Arc::clone(&self.config);
            let cache = Arc::clone(&self.cache);
            let seller_id_for_seller = seller_id.clone();
            let catalog = catalog.clone();
            let seller_outbox = bus_tx.clone();
            seller_handles.push(tokio::spawn(async move {
                run_seller_session(
                    &config,
                    &cache,
                    seller_id_for_seller,
                    catalog,
                    session_config,
                    seller_outbox,
                    seller_mailbox_rx,
                )
                .await
            }));
        }
        drop(bus_tx);
        drop(registrations_tx);

        let buyer_abort_handles: Vec<_> = buyer_handles.iter().map(tokio::task::JoinHandle::abort_handle).collect();
        let results = match tokio::time::timeout(self.global_timeout, futures::future::join_all(buyer_handles)).await {
            Ok(results) => results,
            Err(_) => {
                tracing::warn!("global timeout elapsed before every session reported back");
                for handle in &buyer_abort_handles {
                    handle.abort();
                }
                Vec::new()
            }
        };
        router.abort();
        for handle in seller_handles {
            handle.abort();
        }

        let outcomes: Vec<Outcome> = results
            .into_iter()
            .filter_map(Result::ok)
            .flat_map(|result| match result {
                SessionResult::Success(outcomes) => outcomes,
                SessionResult::Failed => Vec::new(),
            })
            .collect();

        match negotiation_solver::solve(&outcomes, &demand) {
            Ok(solution) => {
                tracing::info!(
                    winners = solution.selected.len(),
                    utility = solution.total_utility,
                    "negotiation run complete"
                );
                solution
            }
            Err(_) => {
                tracing::info!("no combination of outcomes satisfies demand, reporting no-solution");
                Solution {
                    selected: Vec::new(),
                    total_utility: 0.0,
                }
            }
        }
    }

    /// Runs demands as they arrive on `demands`, one at a time. A demand
    /// arriving while a run is in progress queues behind it rather than
    /// interrupting it (§4.4's "(a) queue" choice — see `DESIGN.md`).
    pub async fn run_forever(&self, mut demands: mpsc::Receiver<String>) {
        let mut queue: std::collections::VecDeque<String> = std::collections::VecDeque::new();
        loop {
            if queue.is_empty() {
                match demands.recv().await {
                    Some(demand) => queue.push_back(demand),
                    None => return,
                }
            }
            while let Ok(demand) = demands.try_recv() {
                queue.push_back(demand);
            }
            let Some(demand) = queue.pop_front() else {
                continue;
            };
            self.run_once(&demand).await;
        }
    }
}

fn default_global_timeout(sellers: &SellerCatalog) -> Duration {
    // One session round-trip's worth of wait-timeouts per seller run in
    // parallel, so the global ceiling only needs slack for a handful of
    // negotiation rounds rather than growing with the seller count.
    let _ = sellers;
    DEFAULT_WAIT_TIMEOUT * 20
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiation_model::testing::sample_bundle;

    fn config() -> Config {
        Config::from_toml_str(
            r#"
            [negotiation]
            max_rounds = 5

            [buyer]
            acceptance_threshold = 0.5
            gamma = 1.0
            concession_floor = 0.1

            [seller]
            acceptance_threshold = 0.5
            gamma = 1.0
            concession_floor = 0.1

            [weights]
            price = 0.4
            delivery = 0.2
            quality = 0.2
            service = 0.2

            [params.buyer.b1]
            price = "10,100"
            delivery = "1,10"

            [params.seller.s1.b1]
            price = "10,100"
            delivery = "1,10"
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn run_once_finds_a_winner_for_satisfiable_demand() {
        let mut sellers = SellerCatalog::new();
        sellers.insert(SellerId::new("s1"), vec![Arc::new(sample_bundle("b1", &[("P1", 1)]))]);

        let orchestrator = Orchestrator::with_global_timeout(config(), sellers, Duration::from_secs(5));
        let solution = orchestrator.run_once("P1").await;
        assert_eq!(solution.selected.len(), 1);
    }

    #[tokio::test]
    async fn run_once_reports_no_solution_for_unmet_demand() {
        let mut sellers = SellerCatalog::new();
        sellers.insert(SellerId::new("s1"), vec![Arc::new(sample_bundle("b1", &[("P1", 1)]))]);

        let orchestrator = Orchestrator::with_global_timeout(config(), sellers, Duration::from_secs(5));
        let solution = orchestrator.run_once("P404").await;
        assert!(solution.selected.is_empty());
        assert_eq!(solution.total_utility, 0.0);
    }

    #[tokio::test]
    async fn run_once_with_no_sellers_is_a_no_solution() {
        let orchestrator = Orchestrator::with_global_timeout(config(), SellerCatalog::new(), Duration::from_secs(1));
        let solution = orchestrator.run_once("P1").await;
        assert!(solution.selected.is_empty());
    }
}
