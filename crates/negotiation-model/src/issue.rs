use std::{fmt, str::FromStr};

use crate::Error;

/// The recognised issues for the reference scenario, in their canonical
/// order. A bid's `issues` list must cover exactly these, case-insensitive,
/// in this order.
pub const RECOGNIZED_ISSUES: &[(&str, IssueKind)] = &[
    ("price", IssueKind::Cost),
    ("delivery", IssueKind::Cost),
    ("quality", IssueKind::Qualitative),
    ("service", IssueKind::Qualitative),
];

pub fn recognized_issue_kind(name: &str) -> Option<IssueKind> {
    RECOGNIZED_ISSUES
        .iter()
        .find(|(issue_name, _)| issue_name.eq_ignore_ascii_case(name))
        .map(|(_, kind)| *kind)
}

/// Whether lower or higher values of a quantitative issue are preferred, or
/// whether the issue is a linguistic/qualitative grade.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueKind {
    Cost,
    Benefit,
    Qualitative,
}

/// The five linguistic grades a QUALITATIVE issue may take.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinguisticGrade {
    VeryPoor,
    Poor,
    Medium,
    Good,
    VeryGood,
}

impl LinguisticGrade {
    pub const ALL: [LinguisticGrade; 5] = [
        LinguisticGrade::VeryPoor,
        LinguisticGrade::Poor,
        LinguisticGrade::Medium,
        LinguisticGrade::Good,
        LinguisticGrade::VeryGood,
    ];

    /// Maps a concession target `t` in `[0, 1]` to the nearest grade using
    /// the Concessor's thresholds.
    pub fn from_target(t: f64) -> Self {
        if t < 0.1 {
            LinguisticGrade::VeryPoor
        } else if t < 0.3 {
            LinguisticGrade::Poor
        } else if t < 0.7 {
            LinguisticGrade::Medium
        } else if t < 0.9 {
            LinguisticGrade::Good
        } else {
            LinguisticGrade::VeryGood
        }
    }

    /// The key used to look up this grade's triangular fuzzy number in
    /// configuration, e.g. `tfn.buyer.very_poor`.
    pub fn config_key(&self) -> &'static str {
        match self {
            LinguisticGrade::VeryPoor => "very_poor",
            LinguisticGrade::Poor => "poor",
            LinguisticGrade::Medium => "medium",
            LinguisticGrade::Good => "good",
            LinguisticGrade::VeryGood => "very_good",
        }
    }
}

impl fmt::Display for LinguisticGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinguisticGrade::VeryPoor => "very poor",
            LinguisticGrade::Poor => "poor",
            LinguisticGrade::Medium => "medium",
            LinguisticGrade::Good => "good",
            LinguisticGrade::VeryGood => "very good",
        })
    }
}

impl FromStr for LinguisticGrade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "very poor" => Ok(LinguisticGrade::VeryPoor),
            "poor" => Ok(LinguisticGrade::Poor),
            "medium" => Ok(LinguisticGrade::Medium),
            "good" => Ok(LinguisticGrade::Good),
            "very good" => Ok(LinguisticGrade::VeryGood),
            other => Err(Error::InvalidBid(format!("unknown linguistic grade {other:?}"))),
        }
    }
}

/// A concrete issue value: either a quantitative number or a linguistic
/// grade, tagged so the Evaluator and Concessor can dispatch on the pair
/// (kind, value) without runtime type inspection.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueValue {
    Number(f64),
    Linguistic(LinguisticGrade),
}

impl IssueValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            IssueValue::Number(v) => Some(*v),
            IssueValue::Linguistic(_) => None,
        }
    }

    pub fn as_linguistic(&self) -> Option<LinguisticGrade> {
        match self {
            IssueValue::Linguistic(grade) => Some(*grade),
            IssueValue::Number(_) => None,
        }
    }
}

/// One entry in a bid's issue list: the issue name and its value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IssueEntry {
    pub name: String,
    pub value: IssueValue,
}

/// The `[min, max]` range and kind of a quantitative issue for a given
/// (party, bundle) pair. Enforced at construction: `min <= max`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IssueParameters {
    pub min: f64,
    pub max: f64,
    pub kind: IssueKind,
}

impl IssueParameters {
    pub fn try_new(min: f64, max: f64, kind: IssueKind) -> Result<Self, Error> {
        if min > max {
            return Err(Error::InvalidBid(format!(
                "issue parameters require min <= max, got ({min}, {max})"
            )));
        }
        Ok(Self { min, max, kind })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Rescales this range using a bundle's synergy bounds, per the
    /// Evaluator's per-bundle derivation rule:
    /// `[min + sMin*range, min + sMax*range]`.
    pub fn rescale(&self, synergy: crate::bundle::SynergyBounds) -> Self {
        let range = self.range();
        Self {
            min: self.min + synergy.min() * range,
            max: self.min + synergy.max() * range,
            kind: self.kind,
        }
    }
}
