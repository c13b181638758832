//! The quantitative-issue normalisation curve: progress ratio toward
//! "best", then a risk-posture (β) transform, with a floor of `v_min = 0.1`.

use negotiation_model::issue::IssueKind;

pub const V_MIN: f64 = 0.1;
const RANGE_EPSILON: f64 = 1e-9;

/// Normalises a raw quantitative value into `[0, 1]` given the issue's
/// `[min, max]` range, kind, and the party's risk posture β.
pub fn normalize_quantitative(value: f64, min: f64, max: f64, kind: IssueKind, beta: f64) -> f64 {
    let range = max - min;
    let clamped = value.clamp(min, max);

    if range.abs() < RANGE_EPSILON {
        let best = match kind {
            IssueKind::Cost => min,
            IssueKind::Benefit | IssueKind::Qualitative => max,
        };
        return if (clamped - best).abs() < RANGE_EPSILON { 1.0 } else { V_MIN };
    }

    let r = match kind {
        IssueKind::Cost => (max - clamped) / range,
        IssueKind::Benefit | IssueKind::Qualitative => (clamped - min) / range,
    };

    risk_transform(r, beta)
}

/// Applies the β risk-posture transform to a progress ratio `r` in
/// `[0, 1]`, producing a utility contribution also in `[0, 1]`.
pub fn risk_transform(r: f64, beta: f64) -> f64 {
    if beta == 1.0 {
        V_MIN + (1.0 - V_MIN) * r
    } else if beta < 1.0 {
        V_MIN + (1.0 - V_MIN) * r.powf(1.0 / beta)
    } else {
        (V_MIN.ln() * (1.0 - r).powf(beta)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_risk_is_linear() {
        assert!((risk_transform(0.0, 1.0) - V_MIN).abs() < 1e-9);
        assert!((risk_transform(1.0, 1.0) - 1.0).abs() < 1e-9);
        assert!((risk_transform(0.5, 1.0) - (V_MIN + (1.0 - V_MIN) * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn risk_averse_reaches_bounds() {
        assert!((risk_transform(0.0, 2.0) - V_MIN).abs() < 1e-9);
        assert!((risk_transform(1.0, 2.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn risk_prone_reaches_bounds() {
        assert!((risk_transform(0.0, 0.5) - V_MIN).abs() < 1e-9);
        assert!((risk_transform(1.0, 0.5) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cost_issue_rewards_lower_values() {
        let low = normalize_quantitative(10.0, 0.0, 100.0, IssueKind::Cost, 1.0);
        let high = normalize_quantitative(90.0, 0.0, 100.0, IssueKind::Cost, 1.0);
        assert!(low > high);
    }

    #[test]
    fn benefit_issue_rewards_higher_values() {
        let low = normalize_quantitative(10.0, 0.0, 100.0, IssueKind::Benefit, 1.0);
        let high = normalize_quantitative(90.0, 0.0, 100.0, IssueKind::Benefit, 1.0);
        assert!(high > low);
    }

    #[test]
    fn degenerate_range_returns_one_at_best_side_else_floor() {
        let at_best = normalize_quantitative(5.0, 5.0, 5.0, IssueKind::Cost, 1.0);
        assert!((at_best - 1.0).abs() < 1e-9);
    }

    #[test]
    fn output_always_in_unit_interval() {
        for beta in [0.2, 0.5, 1.0, 1.5, 3.0] {
            for r in [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
                let u = risk_transform(r, beta);
                assert!((0.0..=1.0).contains(&u), "u={u} out of range for beta={beta}, r={r}");
            }
        }
    }
}
