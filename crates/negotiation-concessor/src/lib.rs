//! Given a reference bid and a party's concession posture (γ, `b_k`),
//! produces the next counter-bid.

use negotiation_config::Config;
use negotiation_evaluator::SynergyCache;
use negotiation_model::{
    bid::Bid,
    issue::{IssueKind, IssueValue, LinguisticGrade},
    party::{PartyId, Role},
};

/// The time-concession curve: `α(t)` for round `t` against deadline `T`.
///
/// `r = (t-1)/(T-1)` clamped to `[0, 1]` (`r = 1` when `T = 1`). `b_k` is
/// clamped to `[0.001, 0.999]`, `γ` to `>= 0.001`.
pub fn alpha(round: u32, deadline: u32, gamma: f64, concession_floor: f64) -> f64 {
    let gamma = gamma.max(0.001);
    let b_k = concession_floor.clamp(0.001, 0.999);
    let r = if deadline <= 1 {
        1.0
    } else {
        ((round.saturating_sub(1)) as f64 / (deadline - 1) as f64).clamp(0.0, 1.0)
    };

    if gamma <= 1.0 {
        b_k + (1.0 - b_k) * r.powf(1.0 / gamma)
    } else {
        (b_k.ln() * (1.0 - r).powf(gamma)).exp()
    }
}

pub struct Concessor<'a> {
    config: &'a Config,
    cache: &'a SynergyCache,
}

impl<'a> Concessor<'a> {
    pub fn new(config: &'a Config, cache: &'a SynergyCache) -> Self {
        Self { config, cache }
    }

    /// Builds the next counter-bid from `reference`, for `party`, at
    /// `round` against `deadline`. Bundle and quantities are copied
    /// verbatim; each issue is updated independently. An issue whose
    /// parameters are missing keeps its prior value, with a warning.
    pub fn concede(&self, reference: &Bid, round: u32, deadline: u32, party: &PartyId) -> Bid {
        let params = self.config.party_params(party);
        let a = alpha(round, deadline, params.gamma, params.concession_floor);

        let mut bid = reference.clone();
        for entry in reference.issues() {
            let updated = match entry.value {
                IssueValue::Number(current) => {
                    match self.cache.get_or_derive(self.config, party, reference.bundle(), &entry.name) {
                        Some(issue_params) => {
                            let range = issue_params.max - issue_params.min;
                            let next = match (party.role(), issue_params.kind) {
                                (Role::Buyer, IssueKind::Benefit) => issue_params.max - a * range,
                                (Role::Buyer, IssueKind::Cost | IssueKind::Qualitative) => {
                                    issue_params.min + a * range
                                }
                                (Role::Seller, IssueKind::Benefit) => issue_params.min + a * range,
                                (Role::Seller, IssueKind::Cost | IssueKind::Qualitative) => {
                                    issue_params.max - a * range
                                }
                            };
                            IssueValue::Number(next.clamp(issue_params.min, issue_params.max))
                        }
                        None => {
                            tracing::warn!(
                                %party,
                                bundle = %reference.bundle().id(),
                                issue = %entry.name,
                                "bundle parameters missing, keeping prior value"
                            );
                            IssueValue::Number(current)
                        }
                    }
                }
                IssueValue::Linguistic(_) => {
                    let target = match party.role() {
                        Role::Buyer => 1.0 - a,
                        Role::Seller => a,
                    };
                    IssueValue::Linguistic(LinguisticGrade::from_target(target))
                }
            };
            bid = bid.with_issue_value(&entry.name, updated);
        }
        bid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiation_model::{
        issue::IssueEntry,
        party::SellerId,
        testing::sample_bundle,
    };
    use std::sync::Arc;

    fn bid_with_price(price: f64) -> Bid {
        let bundle = Arc::new(sample_bundle("b1", &[("P1", 1)]));
        Bid::new(
            bundle,
            vec![
                IssueEntry { name: "price".into(), value: IssueValue::Number(price) },
                IssueEntry { name: "delivery".into(), value: IssueValue::Number(5.0) },
                IssueEntry {
                    name: "quality".into(),
                    value: IssueValue::Linguistic(LinguisticGrade::Medium),
                },
                IssueEntry {
                    name: "service".into(),
                    value: IssueValue::Linguistic(LinguisticGrade::Medium),
                },
            ],
            vec![1],
        )
        .unwrap()
    }

    fn config() -> Config {
        Config::from_toml_str(
            r#"
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

    #[test]
    fn alpha_is_monotonic_and_hits_bounds() {
        let deadline = 10;
        let mut prev = alpha(1, deadline, 1.0, 0.1);
        assert!((prev - 0.1).abs() < 1e-9);
        for t in 2..=deadline {
            let a = alpha(t, deadline, 1.0, 0.1);
            assert!(a >= prev - 1e-12);
            prev = a;
        }
        assert!((prev - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_round_deadline_fully_concedes() {
        assert!((alpha(1, 1, 1.0, 0.1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn alpha_stays_within_bk_and_one_for_risk_averse_and_prone() {
        for gamma in [0.3, 1.0, 2.5] {
            for t in 1..=10 {
                let a = alpha(t, 10, gamma, 0.1);
                assert!(a >= 0.1 - 1e-9 && a <= 1.0 + 1e-9, "a={a} out of bounds");
            }
        }
    }

    #[test]
    fn buyer_cost_issue_concedes_upward_over_rounds() {
        let config = config();
        let cache = SynergyCache::new();
        let concessor = Concessor::new(&config, &cache);
        let reference = bid_with_price(10.0);
        let buyer = PartyId::Buyer;
        let mut prev_price = 10.0;
        for round in 1..=10 {
            let next = concessor.concede(&reference, round, 10, &buyer);
            let price = next.issue("price").unwrap().value.as_number().unwrap();
            assert!(price >= prev_price - 1e-9);
            prev_price = price;
        }
    }

    #[test]
    fn seller_cost_issue_concedes_downward_over_rounds() {
        let config = config();
        let cache = SynergyCache::new();
        let concessor = Concessor::new(&config, &cache);
        let reference = bid_with_price(100.0);
        let seller = PartyId::Seller(SellerId::new("s1"));
        let mut prev_price = 100.0;
        for round in 1..=10 {
            let next = concessor.concede(&reference, round, 10, &seller);
            let price = next.issue("price").unwrap().value.as_number().unwrap();
            assert!(price <= prev_price + 1e-9);
            prev_price = price;
        }
    }

    #[test]
    fn missing_params_keep_prior_value() {
        let config = Config::from_toml_str("").unwrap();
        let cache = SynergyCache::new();
        let concessor = Concessor::new(&config, &cache);
        let reference = bid_with_price(55.0);
        let next = concessor.concede(&reference, 3, 10, &PartyId::Buyer);
        assert_eq!(next.issue("price").unwrap().value.as_number(), Some(55.0));
    }

    #[test]
    fn bundle_and_quantities_are_preserved() {
        let config = config();
        let cache = SynergyCache::new();
        let concessor = Concessor::new(&config, &cache);
        let reference = bid_with_price(55.0);
        let next = concessor.concede(&reference, 3, 10, &PartyId::Buyer);
        assert_eq!(next.bundle().id(), reference.bundle().id());
        assert_eq!(next.quantities(), reference.quantities());
    }
}
