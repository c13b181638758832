//! Documented fallback defaults. Every value here is what the config
//! provider returns when the corresponding key is missing or malformed
//! (error taxonomy condition 1: "falls back to a documented default;
//! warning logged; run proceeds").

use negotiation_model::issue::LinguisticGrade;

use crate::{PartyParams, Tfn};

pub const DEFAULT_MAX_ROUNDS: u32 = 10;
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.1;

pub const DEFAULT_PARTY_PARAMS: PartyParams = PartyParams {
    acceptance_threshold: 0.5,
    risk_beta: 1.0,
    gamma: 1.0,
    concession_floor: 0.1,
};

pub const DEFAULT_WEIGHT: f64 = 0.25;

/// A standard ascending triangular-fuzzy partition over `[0, 1]`, used for
/// both buyer and seller unless the configuration overrides one side with
/// an inverted (or otherwise asymmetric) table.
pub fn default_tfn_table() -> Vec<(LinguisticGrade, Tfn)> {
    vec![
        (LinguisticGrade::VeryPoor, Tfn { a: 0.0, b: 0.0, c: 0.25 }),
        (LinguisticGrade::Poor, Tfn { a: 0.0, b: 0.25, c: 0.5 }),
        (LinguisticGrade::Medium, Tfn { a: 0.25, b: 0.5, c: 0.75 }),
        (LinguisticGrade::Good, Tfn { a: 0.5, b: 0.75, c: 1.0 }),
        (LinguisticGrade::VeryGood, Tfn { a: 0.75, b: 1.0, c: 1.0 }),
    ]
}
