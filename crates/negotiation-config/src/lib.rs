//! The configuration provider: reads the flat keyed namespace of
//! negotiation parameters from a TOML document and serves typed accessors
//! with documented fallback defaults.
//!
//! This is the one piece of the "out of scope" config reader that this
//! workspace implements concretely, because every other crate needs a
//! concrete provider to run against; the agent-hosting runtime that would
//! deliver a live reconfiguration is still left external.

pub mod defaults;

use std::{collections::HashMap, path::Path};

use negotiation_model::{
    bundle::BundleId,
    issue::{IssueKind, IssueParameters, LinguisticGrade},
    party::{PartyId, Role, SellerId},
    Error,
};
use toml::Value;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NegotiationParams {
    pub max_rounds: u32,
    pub discount_rate: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartyParams {
    pub acceptance_threshold: f64,
    pub risk_beta: f64,
    pub gamma: f64,
    /// `b_k`, the Concessor's reservation / initial concession floor. Not
    /// named among the spec's listed configuration keys; we key it as
    /// `<party>.concession_floor` (see DESIGN.md) since the Concessor's
    /// formula requires a configurable value here.
    pub concession_floor: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tfn {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Tfn {
    /// Defuzzifies this triangular fuzzy number to a crisp value in
    /// `[0, 1]`: `(a + 4b + c) / 6`.
    pub fn defuzzify(&self) -> f64 {
        (self.a + 4.0 * self.b + self.c) / 6.0
    }
}

#[derive(Clone, Debug, Default)]
struct PartyParamsOverride {
    acceptance_threshold: Option<f64>,
    risk_beta: Option<f64>,
    gamma: Option<f64>,
    concession_floor: Option<f64>,
}

impl PartyParamsOverride {
    fn apply(&self, base: PartyParams) -> PartyParams {
        PartyParams {
            acceptance_threshold: self.acceptance_threshold.unwrap_or(base.acceptance_threshold),
            risk_beta: self.risk_beta.unwrap_or(base.risk_beta),
            gamma: self.gamma.unwrap_or(base.gamma),
            concession_floor: self.concession_floor.unwrap_or(base.concession_floor),
        }
    }
}

/// A bundle-issue parameter key, scoped to the party that holds it: the
/// buyer's entries are shared across all sellers, a seller's entries are
/// private to that seller.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
enum ParamsKey {
    Buyer { bundle: BundleId, issue: String },
    Seller { seller: SellerId, bundle: BundleId, issue: String },
    BuyerGlobal { issue: String },
    SellerGlobal { seller: SellerId, issue: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    negotiation: NegotiationParams,
    buyer: PartyParams,
    weights: HashMap<String, f64>,
    seller_default: PartyParams,
    seller_overrides: HashMap<SellerId, PartyParamsOverride>,
    bundle_params: HashMap<ParamsKey, IssueParameters>,
    tfn: HashMap<Role, HashMap<LinguisticGrade, Tfn>>,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| Error::ConfigUnreadable(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let value: Value = text
            .parse()
            .map_err(|err| Error::ConfigUnreadable(format!("invalid TOML: {err}")))?;
        Ok(Self::from_value(&value))
    }

    fn from_value(root: &Value) -> Self {
        let negotiation = parse_negotiation(root.get("negotiation"));
        let buyer = parse_party_params(root.get("buyer"));
        let weights = parse_weights(root.get("weights"));
        let seller_default = parse_party_params(root.get("seller"));
        let seller_overrides = parse_seller_overrides(root.get("seller"));
        let bundle_params = parse_all_bundle_params(root.get("params"));
        let tfn = parse_all_tfn(root.get("tfn"));

        Self {
            negotiation,
            buyer,
            weights,
            seller_default,
            seller_overrides,
            bundle_params,
            tfn,
        }
    }

    pub fn negotiation(&self) -> NegotiationParams {
        self.negotiation
    }

    pub fn buyer_params(&self) -> PartyParams {
        self.buyer
    }

    pub fn seller_params(&self, seller: &SellerId) -> PartyParams {
        match self.seller_overrides.get(seller) {
            Some(over) => over.apply(self.seller_default),
            None => self.seller_default,
        }
    }

    pub fn party_params(&self, party: &PartyId) -> PartyParams {
        match party {
            PartyId::Buyer => self.buyer_params(),
            PartyId::Seller(id) => self.seller_params(id),
        }
    }

    pub fn weight(&self, issue: &str) -> f64 {
        self.weights
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(issue))
            .map(|(_, weight)| *weight)
            .unwrap_or_else(|| {
                tracing::warn!(issue, "weight missing, falling back to default");
                defaults::DEFAULT_WEIGHT
            })
    }

    pub fn weights(&self) -> &HashMap<String, f64> {
        &self.weights
    }

    /// Explicit per-bundle issue parameters, or `None` if the configuration
    /// has no entry (the Evaluator then derives one from the party's
    /// global range and the bundle's synergy bounds).
    pub fn bundle_issue_params(
        &self,
        party: &PartyId,
        bundle: &BundleId,
        issue: &str,
    ) -> Option<IssueParameters> {
        let key = match party {
            PartyId::Buyer => ParamsKey::Buyer {
                bundle: bundle.clone(),
                issue: issue.to_ascii_lowercase(),
            },
            PartyId::Seller(seller) => ParamsKey::Seller {
                seller: seller.clone(),
                bundle: bundle.clone(),
                issue: issue.to_ascii_lowercase(),
            },
        };
        self.bundle_params.get(&key).copied()
    }

    /// A party's global `[min, max]` range for a quantitative issue, used as
    /// the rescaling base for bundles with no explicit entry.
    pub fn global_issue_params(&self, party: &PartyId, issue: &str) -> Option<IssueParameters> {
        let key = match party {
            PartyId::Buyer => ParamsKey::BuyerGlobal {
                issue: issue.to_ascii_lowercase(),
            },
            PartyId::Seller(seller) => ParamsKey::SellerGlobal {
                seller: seller.clone(),
                issue: issue.to_ascii_lowercase(),
            },
        };
        self.bundle_params.get(&key).copied()
    }

    /// The triangular fuzzy number for a linguistic grade, from the
    /// party-role-scoped table, falling back to the standard ascending
    /// default table entry if absent.
    pub fn tfn(&self, role: Role, grade: LinguisticGrade) -> Tfn {
        self.tfn
            .get(&role)
            .and_then(|table| table.get(&grade))
            .copied()
            .unwrap_or_else(|| {
                tracing::warn!(?role, ?grade, "TFN entry missing, falling back to default");
                defaults::default_tfn_table()
                    .into_iter()
                    .find(|(g, _)| *g == grade)
                    .map(|(_, tfn)| tfn)
                    .expect("default table covers every grade")
            })
    }
}

fn parse_negotiation(table: Option<&Value>) -> NegotiationParams {
    let max_rounds = table
        .and_then(|t| t.get("max_rounds"))
        .and_then(Value::as_integer)
        .filter(|v| *v >= 1)
        .map(|v| v as u32)
        .unwrap_or_else(|| {
            tracing::warn!(
                key = "negotiation.max_rounds",
                "missing or invalid, using default"
            );
            defaults::DEFAULT_MAX_ROUNDS
        });
    let discount_rate = table
        .and_then(|t| t.get("discount_rate"))
        .and_then(Value::as_float)
        .filter(|v| *v > 0.0 && *v < 1.0)
        .unwrap_or_else(|| {
            tracing::warn!(
                key = "negotiation.discount_rate",
                "missing or invalid, using default"
            );
            defaults::DEFAULT_DISCOUNT_RATE
        });
    NegotiationParams {
        max_rounds,
        discount_rate,
    }
}

fn parse_party_params(table: Option<&Value>) -> PartyParams {
    let acceptance_threshold = table
        .and_then(|t| t.get("acceptance_threshold"))
        .and_then(Value::as_float)
        .unwrap_or(defaults::DEFAULT_PARTY_PARAMS.acceptance_threshold);
    let risk_beta = table
        .and_then(|t| t.get("risk_beta"))
        .and_then(Value::as_float)
        .filter(|v| *v > 0.0)
        .unwrap_or(defaults::DEFAULT_PARTY_PARAMS.risk_beta);
    let gamma = table
        .and_then(|t| t.get("gamma"))
        .and_then(Value::as_float)
        .unwrap_or(defaults::DEFAULT_PARTY_PARAMS.gamma);
    let concession_floor = table
        .and_then(|t| t.get("concession_floor"))
        .and_then(Value::as_float)
        .filter(|v| (0.001..=0.999).contains(v))
        .unwrap_or(defaults::DEFAULT_PARTY_PARAMS.concession_floor);
    PartyParams {
        acceptance_threshold,
        risk_beta,
        gamma,
        concession_floor,
    }
}

fn parse_weights(table: Option<&Value>) -> HashMap<String, f64> {
    let mut weights = HashMap::new();
    for issue in ["price", "quality", "delivery", "service"] {
        let weight = table
            .and_then(|t| t.get(issue))
            .and_then(Value::as_float)
            .unwrap_or_else(|| {
                tracing::warn!(issue, "weight missing, using default");
                defaults::DEFAULT_WEIGHT
            });
        weights.insert(issue.to_string(), weight);
    }
    weights
}

fn parse_seller_overrides(seller_table: Option<&Value>) -> HashMap<SellerId, PartyParamsOverride> {
    let mut overrides = HashMap::new();
    let Some(table) = seller_table.and_then(Value::as_table) else {
        return overrides;
    };
    for (key, value) in table {
        // The base seller params (acceptance_threshold/risk_beta/gamma) live
        // directly under `[seller]`; anything else is a per-seller table.
        if matches!(
            key.as_str(),
            "acceptance_threshold" | "risk_beta" | "gamma" | "concession_floor"
        ) {
            continue;
        }
        let Some(sub) = value.as_table() else { continue };
        let over = PartyParamsOverride {
            acceptance_threshold: sub.get("acceptance_threshold").and_then(Value::as_float),
            risk_beta: sub
                .get("risk_beta")
                .and_then(Value::as_float)
                .filter(|v| *v > 0.0),
            gamma: sub.get("gamma").and_then(Value::as_float),
            concession_floor: sub
                .get("concession_floor")
                .and_then(Value::as_float)
                .filter(|v| (0.001..=0.999).contains(v)),
        };
        overrides.insert(SellerId::new(key.clone()), over);
    }
    overrides
}

fn parse_min_max(raw: &str) -> Option<(f64, f64)> {
    let (min_str, max_str) = raw.split_once(',')?;
    let min: f64 = min_str.trim().parse().ok()?;
    let max: f64 = max_str.trim().parse().ok()?;
    if min > max {
        return None;
    }
    Some((min, max))
}

fn issue_kind_for(issue: &str) -> IssueKind {
    negotiation_model::issue::recognized_issue_kind(issue).unwrap_or(IssueKind::Cost)
}

fn parse_all_bundle_params(params_table: Option<&Value>) -> HashMap<ParamsKey, IssueParameters> {
    let mut out = HashMap::new();
    let Some(table) = params_table.and_then(Value::as_table) else {
        return out;
    };

    if let Some(buyer_table) = table.get("buyer").and_then(Value::as_table) {
        for (key, value) in buyer_table {
            match value {
                Value::String(raw) => {
                    if let Some((min, max)) = parse_min_max(raw) {
                        out.insert(
                            ParamsKey::BuyerGlobal { issue: key.to_ascii_lowercase() },
                            IssueParameters { min, max, kind: issue_kind_for(key) },
                        );
                    } else {
                        tracing::warn!(key = %format!("params.buyer.{key}"), "malformed min,max, ignoring");
                    }
                }
                Value::Table(bundle_issues) => {
                    for (issue, raw) in bundle_issues {
                        let Some(raw) = raw.as_str() else { continue };
                        if let Some((min, max)) = parse_min_max(raw) {
                            out.insert(
                                ParamsKey::Buyer {
                                    bundle: BundleId::new(key.clone()),
                                    issue: issue.to_ascii_lowercase(),
                                },
                                IssueParameters { min, max, kind: issue_kind_for(issue) },
                            );
                        } else {
                            tracing::warn!(
                                key = %format!("params.buyer.{key}.{issue}"),
                                "malformed min,max, ignoring"
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if let Some(seller_table) = table.get("seller").and_then(Value::as_table) {
        for (seller_key, per_seller) in seller_table {
            let Some(per_seller) = per_seller.as_table() else { continue };
            let seller = SellerId::new(seller_key.clone());
            for (key, value) in per_seller {
                match value {
                    Value::String(raw) => {
                        if let Some((min, max)) = parse_min_max(raw) {
                            out.insert(
                                ParamsKey::SellerGlobal {
                                    seller: seller.clone(),
                                    issue: key.to_ascii_lowercase(),
                                },
                                IssueParameters { min, max, kind: issue_kind_for(key) },
                            );
                        } else {
                            tracing::warn!(
                                key = %format!("params.seller.{seller_key}.{key}"),
                                "malformed min,max, ignoring"
                            );
                        }
                    }
                    Value::Table(bundle_issues) => {
                        for (issue, raw) in bundle_issues {
                            let Some(raw) = raw.as_str() else { continue };
                            if let Some((min, max)) = parse_min_max(raw) {
                                out.insert(
                                    ParamsKey::Seller {
                                        seller: seller.clone(),
                                        bundle: BundleId::new(key.clone()),
                                        issue: issue.to_ascii_lowercase(),
                                    },
                                    IssueParameters { min, max, kind: issue_kind_for(issue) },
                                );
                            } else {
                                tracing::warn!(
                                    key = %format!("params.seller.{seller_key}.{key}.{issue}"),
                                    "malformed min,max, ignoring"
                                );
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    out
}

fn parse_all_tfn(tfn_table: Option<&Value>) -> HashMap<Role, HashMap<LinguisticGrade, Tfn>> {
    let mut out = HashMap::new();
    let Some(table) = tfn_table.and_then(Value::as_table) else {
        return out;
    };
    for (role_key, role_value) in [("buyer", Role::Buyer), ("seller", Role::Seller)] {
        let Some(role_table) = table.get(role_key).and_then(Value::as_table) else {
            continue;
        };
        let mut grades = HashMap::new();
        for grade in LinguisticGrade::ALL {
            let Some(raw) = role_table.get(grade.config_key()).and_then(Value::as_str) else {
                continue;
            };
            let parts: Vec<&str> = raw.split(',').collect();
            if let [a, b, c] = parts.as_slice() {
                if let (Ok(a), Ok(b), Ok(c)) = (a.trim().parse(), b.trim().parse(), c.trim().parse()) {
                    grades.insert(grade, Tfn { a, b, c });
                    continue;
                }
            }
            tracing::warn!(
                key = %format!("tfn.{role_key}.{}", grade.config_key()),
                "malformed a,b,c, ignoring"
            );
        }
        out.insert(role_value, grades);
    }
    out
}
