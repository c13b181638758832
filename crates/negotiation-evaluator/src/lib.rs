//! Computes `U(party, bid)`, the weighted aggregate utility of a bid to a
//! given party. Pure aside from the per-bundle synergy cache, which is
//! either immutable-once-written or guarded (see [`cache::SynergyCache`]).

pub mod cache;
pub mod math;

use negotiation_config::Config;
use negotiation_model::{
    bid::Bid,
    issue::IssueValue,
    party::PartyId,
};

pub use cache::SynergyCache;

pub struct Evaluator<'a> {
    config: &'a Config,
    cache: &'a SynergyCache,
}

impl<'a> Evaluator<'a> {
    pub fn new(config: &'a Config, cache: &'a SynergyCache) -> Self {
        Self { config, cache }
    }

    /// Computes `U(party, bid) ∈ [0, 1]`, clamped.
    pub fn evaluate(&self, party: &PartyId, bid: &Bid) -> f64 {
        let beta = self.config.party_params(party).risk_beta;
        let mut utility = 0.0;

        for entry in bid.issues() {
            let weight = self.config.weight(&entry.name);
            if weight == 0.0 {
                continue;
            }

            let contribution = match entry.value {
                IssueValue::Linguistic(grade) => self.config.tfn(party.role(), grade).defuzzify(),
                IssueValue::Number(value) => {
                    match self.cache.get_or_derive(self.config, party, bid.bundle(), &entry.name) {
                        Some(params) => {
                            math::normalize_quantitative(value, params.min, params.max, params.kind, beta)
                        }
                        None => {
                            tracing::warn!(
                                %party,
                                bundle = %bid.bundle().id(),
                                issue = %entry.name,
                                "bundle parameters missing, contributing 0 to utility"
                            );
                            0.0
                        }
                    }
                }
            };

            utility += weight * contribution;
        }

        utility.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiation_model::{
        issue::{IssueEntry, IssueValue, LinguisticGrade},
        party::SellerId,
        testing::sample_bundle,
    };
    use std::sync::Arc;

    fn config_with_ranges() -> Config {
        Config::from_toml_str(
            r#"
            [weights]
            price = 0.4
            delivery = 0.2
            quality = 0.2
            service = 0.2

            [params.buyer.b1]
            price = "10,100"
            delivery = "1,10"
            "#,
        )
        .unwrap()
    }

    fn bid_with_price(bundle_id: &str, price: f64) -> Bid {
        let bundle = Arc::new(sample_bundle(bundle_id, &[("P1", 1)]));
        Bid::new(
            bundle,
            vec![
                IssueEntry { name: "price".into(), value: IssueValue::Number(price) },
                IssueEntry { name: "delivery".into(), value: IssueValue::Number(5.0) },
                IssueEntry {
                    name: "quality".into(),
                    value: IssueValue::Linguistic(LinguisticGrade::Good),
                },
                IssueEntry {
                    name: "service".into(),
                    value: IssueValue::Linguistic(LinguisticGrade::Good),
                },
            ],
            vec![1],
        )
        .unwrap()
    }

    #[test]
    fn utility_is_in_unit_interval() {
        let config = config_with_ranges();
        let cache = SynergyCache::new();
        let evaluator = Evaluator::new(&config, &cache);
        let bid = bid_with_price("b1", 55.0);
        let u = evaluator.evaluate(&PartyId::Buyer, &bid);
        assert!((0.0..=1.0).contains(&u));
    }

    #[test]
    fn evaluator_is_pure() {
        let config = config_with_ranges();
        let cache = SynergyCache::new();
        let evaluator = Evaluator::new(&config, &cache);
        let bid = bid_with_price("b1", 30.0);
        let a = evaluator.evaluate(&PartyId::Buyer, &bid);
        let b = evaluator.evaluate(&PartyId::Buyer, &bid);
        assert_eq!(a, b);
    }

    #[test]
    fn buyer_prefers_lower_price_on_cost_issue() {
        let config = config_with_ranges();
        let cache = SynergyCache::new();
        let evaluator = Evaluator::new(&config, &cache);
        let cheap = evaluator.evaluate(&PartyId::Buyer, &bid_with_price("b1", 20.0));
        let expensive = evaluator.evaluate(&PartyId::Buyer, &bid_with_price("b1", 90.0));
        assert!(cheap > expensive);
    }

    #[test]
    fn missing_bundle_params_contribute_zero_without_panicking() {
        let config = Config::from_toml_str("[weights]\nprice = 0.5\n").unwrap();
        let cache = SynergyCache::new();
        let evaluator = Evaluator::new(&config, &cache);
        let bid = bid_with_price("unconfigured-bundle", 42.0);
        let u = evaluator.evaluate(&PartyId::Buyer, &bid);
        assert!((0.0..=1.0).contains(&u));
    }

    #[test]
    fn seller_party_uses_seller_tfn_table() {
        let config = config_with_ranges();
        let cache = SynergyCache::new();
        let evaluator = Evaluator::new(&config, &cache);
        let bid = bid_with_price("b1", 50.0);
        let seller = PartyId::Seller(SellerId::new("s1"));
        let u = evaluator.evaluate(&seller, &bid);
        assert!((0.0..=1.0).contains(&u));
    }
}
