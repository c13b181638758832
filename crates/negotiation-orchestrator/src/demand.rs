//! Parses the demand string of §4.4/§6 (e.g. `"P1,P1,P3"`) into a
//! per-product quantity vector.
//!
//! §6 says unknown product symbols are "logged and ignored", but this
//! workspace has no canonical product registry to check a symbol against —
//! a seller's catalog is the only place products are ever enumerated, and
//! different sellers may legitimately offer different products. A symbol
//! this parser cannot recognise as "known" therefore simply becomes demand
//! no seller's bundles cover, which the Solver already reports as
//! infeasible/no-solution (§7 condition 6) rather than silently dropping
//! it from the vector, which could mask a typo'd demand as satisfied by
//! an empty winning set.

use std::collections::HashMap;

use negotiation_model::product::ProductId;

/// Splits on commas, trims whitespace, and counts one unit of demand per
/// occurrence of a product symbol. Blank tokens are logged and skipped.
pub fn parse(input: &str) -> HashMap<ProductId, u32> {
    let mut demand = HashMap::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            tracing::warn!("skipping empty product symbol in demand string");
            continue;
        }
        *demand.entry(ProductId::from(token)).or_insert(0) += 1;
    }
    demand
}
