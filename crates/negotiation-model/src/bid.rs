use std::sync::Arc;

use crate::{
    bundle::Bundle,
    issue::{recognized_issue_kind, IssueEntry, RECOGNIZED_ISSUES},
    Error,
};

/// A concrete offer for one bundle: the bundle itself, the negotiated issue
/// values, and the quantities of each bundle line item. Immutable after
/// creation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bid {
    bundle: Arc<Bundle>,
    issues: Vec<IssueEntry>,
    quantities: Vec<u32>,
}

impl Bid {
    pub fn new(bundle: Arc<Bundle>, issues: Vec<IssueEntry>, quantities: Vec<u32>) -> Result<Self, Error> {
        if quantities.len() != bundle.items().len() {
            return Err(Error::InvalidBid(format!(
                "bid for bundle {} has {} quantities but bundle has {} items",
                bundle.id(),
                quantities.len(),
                bundle.items().len()
            )));
        }
        if RECOGNIZED_ISSUES.len() != issues.len() {
            return Err(Error::InvalidBid(format!(
                "bid for bundle {} must carry exactly {} issues, got {}",
                bundle.id(),
                RECOGNIZED_ISSUES.len(),
                issues.len()
            )));
        }
        for (expected_name, _) in RECOGNIZED_ISSUES {
            if !issues.iter().any(|entry| entry.name.eq_ignore_ascii_case(expected_name)) {
                return Err(Error::InvalidBid(format!(
                    "bid for bundle {} is missing recognised issue {expected_name}",
                    bundle.id()
                )));
            }
        }
        for entry in &issues {
            if recognized_issue_kind(&entry.name).is_none() {
                return Err(Error::InvalidBid(format!(
                    "bid for bundle {} carries unrecognised issue {}",
                    bundle.id(),
                    entry.name
                )));
            }
        }
        Ok(Self {
            bundle,
            issues,
            quantities,
        })
    }

    pub fn bundle(&self) -> &Arc<Bundle> {
        &self.bundle
    }

    pub fn issues(&self) -> &[IssueEntry] {
        &self.issues
    }

    pub fn quantities(&self) -> &[u32] {
        &self.quantities
    }

    pub fn issue(&self, name: &str) -> Option<&IssueEntry> {
        self.issues.iter().find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Returns a copy of this bid with a single issue value replaced, used
    /// by the Concessor to build the next counter-bid from a reference bid.
    pub fn with_issue_value(&self, name: &str, value: crate::issue::IssueValue) -> Self {
        let mut issues = self.issues.clone();
        if let Some(entry) = issues.iter_mut().find(|e| e.name.eq_ignore_ascii_case(name)) {
            entry.value = value;
        }
        Self {
            bundle: self.bundle.clone(),
            issues,
            quantities: self.quantities.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_bundle, sample_issues};

    #[test]
    fn rejects_quantity_length_mismatch() {
        let bundle = Arc::new(sample_bundle("b1", &[("P1", 1), ("P2", 1)]));
        let err = Bid::new(bundle, sample_issues(), vec![1]).unwrap_err();
        assert!(matches!(err, Error::InvalidBid(_)));
    }

    #[test]
    fn rejects_missing_recognised_issue() {
        let bundle = Arc::new(sample_bundle("b1", &[("P1", 1)]));
        let mut issues = sample_issues();
        issues.pop();
        let err = Bid::new(bundle, issues, vec![1]).unwrap_err();
        assert!(matches!(err, Error::InvalidBid(_)));
    }

    #[test]
    fn with_issue_value_replaces_only_named_issue() {
        let bundle = Arc::new(sample_bundle("b1", &[("P1", 1)]));
        let bid = Bid::new(bundle, sample_issues(), vec![1]).unwrap();
        let updated = bid.with_issue_value("price", crate::issue::IssueValue::Number(42.0));
        assert_eq!(updated.issue("price").unwrap().value.as_number(), Some(42.0));
        assert_eq!(
            updated.issue("delivery").unwrap().value,
            bid.issue("delivery").unwrap().value
        );
    }
}
