use negotiation_config::Config;
use negotiation_orchestrator::Orchestrator;

use crate::{arguments::Arguments, roster};

/// Assumes tracing has already been set up.
pub async fn main(args: Arguments) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::from_toml_str("")?,
    };
    let sellers = roster::load(&args.roster)?;
    tracing::info!(sellers = sellers.len(), "loaded seller roster");

    let orchestrator = Orchestrator::with_global_timeout(config, sellers, args.global_timeout);

    match (&args.demand, &args.demand_file) {
        (Some(demand), None) => {
            let solution = orchestrator.run_once(demand).await;
            report(demand, &solution);
        }
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path)?;
            for demand in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
                let solution = orchestrator.run_once(demand).await;
                report(demand, &solution);
            }
        }
        (None, None) => {
            anyhow::bail!("one of --demand or --demand-file is required");
        }
        (Some(_), Some(_)) => unreachable!("clap enforces these are mutually exclusive"),
    }

    Ok(())
}

fn report(demand: &str, solution: &negotiation_solver::Solution) {
    tracing::info!(
        demand,
        winners = solution.selected.len(),
        utility = solution.total_utility,
        "run complete"
    );
    for outcome in &solution.selected {
        tracing::info!(
            seller = %outcome.seller_id(),
            bundle = %outcome.bid().bundle().id(),
            utility = outcome.utility_to_buyer(),
            "winning bundle"
        );
    }
}
