//! Fixture builders shared by this crate's own tests and, via the
//! `test-util` feature, by downstream crates' tests.

use std::collections::HashMap;

use crate::{
    bundle::{Bundle, BundleId, BundleItem, SynergyBounds},
    issue::{IssueEntry, IssueValue, LinguisticGrade},
};

pub fn sample_bundle(id: &str, items: &[(&str, u32)]) -> Bundle {
    let items = items
        .iter()
        .map(|(product, quantity)| BundleItem {
            product: (*product).into(),
            quantity: *quantity,
        })
        .collect();
    Bundle::new(
        BundleId::new(id),
        items,
        SynergyBounds::default(),
        HashMap::new(),
        HashMap::new(),
    )
    .expect("valid sample bundle")
}

pub fn sample_issues() -> Vec<IssueEntry> {
    vec![
        IssueEntry {
            name: "price".into(),
            value: IssueValue::Number(50.0),
        },
        IssueEntry {
            name: "delivery".into(),
            value: IssueValue::Number(5.0),
        },
        IssueEntry {
            name: "quality".into(),
            value: IssueValue::Linguistic(LinguisticGrade::Medium),
        },
        IssueEntry {
            name: "service".into(),
            value: IssueValue::Linguistic(LinguisticGrade::Medium),
        },
    ]
}
