//! End-to-end scenarios for one orchestrator run: a satisfiable demand, a
//! deadline too tight to reach agreement, a seller that never answers, and
//! the re-entrancy queueing behaviour of `run_forever`.

use std::{sync::Arc, time::Duration};

use negotiation_config::Config;
use negotiation_model::testing::sample_bundle;
use negotiation_model::party::SellerId;
use negotiation_orchestrator::{Orchestrator, SellerCatalog};
use tokio::sync::mpsc;

fn config(max_rounds: u32) -> Config {
    Config::from_toml_str(&format!(
        r#"
        [negotiation]
        max_rounds = {max_rounds}

        [buyer]
        acceptance_threshold = 0.4
        gamma = 1.0
        concession_floor = 0.1

        [seller]
        acceptance_threshold = 0.4
        gamma = 1.0
        concession_floor = 0.1

        [weights]
        price = 0.5
        delivery = 0.2
        quality = 0.15
        service = 0.15

        [params.buyer.b1]
        price = "10,100"
        delivery = "1,10"

        [params.seller.s1.b1]
        price = "10,100"
        delivery = "1,10"
        "#
    ))
    .unwrap()
}

fn one_seller_catalog() -> SellerCatalog {
    let mut sellers = SellerCatalog::new();
    sellers.insert(SellerId::new("s1"), vec![Arc::new(sample_bundle("b1", &[("P1", 1)]))]);
    sellers
}

#[tokio::test]
async fn satisfiable_demand_converges_to_a_winner() {
    let orchestrator = Orchestrator::with_global_timeout(config(10), one_seller_catalog(), Duration::from_secs(10));
    let solution = orchestrator.run_once("P1").await;
    assert_eq!(solution.selected.len(), 1);
    assert!(solution.total_utility > 0.0);
}

#[tokio::test]
async fn single_round_deadline_never_blocks_the_run() {
    // T=1 forces both sides to accept-or-fail in round one; either outcome
    // is acceptable, but the run must terminate promptly either way.
    let orchestrator = Orchestrator::with_global_timeout(config(1), one_seller_catalog(), Duration::from_secs(5));
    let solution = orchestrator.run_once("P1").await;
    assert!(solution.selected.len() <= 1);
}

#[tokio::test]
async fn unmet_demand_reports_no_solution_without_hanging() {
    let orchestrator = Orchestrator::with_global_timeout(config(10), one_seller_catalog(), Duration::from_secs(10));
    let solution = orchestrator.run_once("P999").await;
    assert!(solution.selected.is_empty());
    assert_eq!(solution.total_utility, 0.0);
}

#[tokio::test]
async fn empty_roster_is_an_immediate_no_solution() {
    let orchestrator = Orchestrator::with_global_timeout(config(10), SellerCatalog::new(), Duration::from_secs(1));
    let solution = orchestrator.run_once("P1").await;
    assert!(solution.selected.is_empty());
}

#[tokio::test]
async fn run_forever_drains_demands_queued_while_busy() {
    let orchestrator = Arc::new(Orchestrator::with_global_timeout(config(10), one_seller_catalog(), Duration::from_secs(10)));
    let (tx, rx) = mpsc::channel(4);

    tx.send("P1".to_string()).await.unwrap();
    tx.send("P1".to_string()).await.unwrap();
    drop(tx);

    let orchestrator_for_loop = Arc::clone(&orchestrator);
    let handle = tokio::spawn(async move { orchestrator_for_loop.run_forever(rx).await });

    tokio::time::timeout(Duration::from_secs(20), handle)
        .await
        .expect("run_forever should drain the queue and return once the channel closes")
        .unwrap();
}
