//! The per-bundle issue-parameter cache: a read-through, single-writer-per-
//! key derivation of bundle-specific `[min, max]` ranges from a party's
//! global range and the bundle's synergy bounds.
//!
//! `dashmap` gives us lock-free reads once an entry is published and
//! fine-grained (shard-level) locking on insert, which is all §5 asks for:
//! "a per-bundle parameter cache is permissible if it is either
//! immutable-once-written or guarded."

use dashmap::DashMap;
use negotiation_config::Config;
use negotiation_model::{
    bundle::Bundle,
    issue::IssueParameters,
    party::PartyId,
};

#[derive(Clone, Eq, PartialEq, Hash)]
struct Key {
    party: PartyId,
    bundle: negotiation_model::bundle::BundleId,
    issue: String,
}

#[derive(Default)]
pub struct SynergyCache {
    entries: DashMap<Key, IssueParameters>,
}

impl SynergyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the issue parameters to use for `(party, bundle, issue)`:
    /// the configuration's explicit entry if present, otherwise a
    /// synergy-rescaled derivation from the party's global range, memoised
    /// for subsequent lookups. Returns `None` (and logs a warning) if even
    /// the global range is missing — the Evaluator then skips the issue.
    pub fn get_or_derive(
        &self,
        config: &Config,
        party: &PartyId,
        bundle: &Bundle,
        issue: &str,
    ) -> Option<IssueParameters> {
        let key = Key {
            party: party.clone(),
            bundle: bundle.id().clone(),
            issue: issue.to_ascii_lowercase(),
        };
        if let Some(cached) = self.entries.get(&key) {
            return Some(*cached);
        }

        let derived = match config.bundle_issue_params(party, bundle.id(), issue) {
            Some(explicit) => explicit,
            None => {
                let global = config.global_issue_params(party, issue)?;
                tracing::debug!(
                    %party,
                    bundle = %bundle.id(),
                    issue,
                    "deriving bundle issue parameters from global range and synergy bounds"
                );
                global.rescale(bundle.synergy())
            }
        };
        self.entries.insert(key, derived);
        Some(derived)
    }
}
