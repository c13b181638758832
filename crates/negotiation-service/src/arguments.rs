use std::{path::PathBuf, time::Duration};

/// Runs one or more procurement negotiations from the command line (§6).
#[derive(clap::Parser)]
pub struct Arguments {
    /// Path to the negotiation parameters file (weights, thresholds, TFN
    /// table, per-bundle issue ranges). Falls back to documented defaults
    /// for anything the file omits.
    #[clap(long, env)]
    pub config: Option<PathBuf>,

    /// Path to the seller roster: which sellers exist and which bundles
    /// each is willing to offer.
    #[clap(long, env)]
    pub roster: PathBuf,

    /// Comma-separated product symbols describing one demand, e.g.
    /// `P1,P1,P3`. Mutually exclusive with `--demand-file`.
    #[clap(long, env, conflicts_with = "demand_file")]
    pub demand: Option<String>,

    /// Path to a file of newline-separated demand strings, run one after
    /// another through the re-entrancy queue instead of a single shot.
    #[clap(long, env)]
    pub demand_file: Option<PathBuf>,

    /// Wall-clock budget for a single run before still-pending sessions are
    /// treated as failures.
    #[clap(
        long,
        env,
        default_value = "300",
        value_parser = duration_from_seconds,
    )]
    pub global_timeout: Duration,
}

fn duration_from_seconds(s: &str) -> Result<Duration, String> {
    s.parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|err| err.to_string())
}
