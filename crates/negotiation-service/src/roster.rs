//! Loads the seller roster file (§6): which sellers exist, and which
//! bundles each is willing to offer into a negotiation.

use std::{collections::HashMap, fs, path::Path, sync::Arc};

use negotiation_model::{
    bundle::{Bundle, BundleId, BundleItem, SynergyBounds},
    party::SellerId,
    Error,
};
use negotiation_orchestrator::SellerCatalog;

#[derive(serde::Deserialize)]
struct RosterFile {
    #[serde(default)]
    seller: Vec<SellerEntry>,
}

#[derive(serde::Deserialize)]
struct SellerEntry {
    id: String,
    #[serde(default)]
    bundle: Vec<BundleEntry>,
}

#[derive(serde::Deserialize)]
struct BundleEntry {
    id: String,
    items: Vec<BundleItem>,
    #[serde(default)]
    synergy_min: Option<f64>,
    #[serde(default)]
    synergy_max: Option<f64>,
    #[serde(default)]
    weights: HashMap<String, f64>,
}

pub fn load(path: &Path) -> Result<SellerCatalog, Error> {
    let text = fs::read_to_string(path)
        .map_err(|err| Error::ConfigUnreadable(format!("reading roster {}: {err}", path.display())))?;
    parse(&text)
}

fn parse(text: &str) -> Result<SellerCatalog, Error> {
    let file: RosterFile = toml::from_str(text)
        .map_err(|err| Error::ConfigUnreadable(format!("parsing roster: {err}")))?;

    let mut catalog = SellerCatalog::new();
    for seller in file.seller {
        let seller_id = SellerId::new(seller.id);
        let mut bundles = Vec::with_capacity(seller.bundle.len());
        for bundle in seller.bundle {
            let synergy = match (bundle.synergy_min, bundle.synergy_max) {
                (Some(min), Some(max)) => SynergyBounds::try_new(min, max)?,
                (None, None) => SynergyBounds::default(),
                _ => {
                    return Err(Error::ConfigUnreadable(format!(
                        "bundle {} must set both synergy_min and synergy_max or neither",
                        bundle.id
                    )))
                }
            };
            bundles.push(Arc::new(Bundle::new(
                BundleId::new(bundle.id),
                bundle.items,
                synergy,
                bundle.weights,
                HashMap::new(),
            )?));
        }
        catalog.insert(seller_id, bundles);
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_roster_with_two_sellers() {
        let catalog = parse(
            r#"
            [[seller]]
            id = "s1"
            [[seller.bundle]]
            id = "b1"
            items = [{ product = "P1", quantity = 1 }]

            [[seller]]
            id = "s2"
            [[seller.bundle]]
            id = "b2"
            items = [{ product = "P1", quantity = 2 }, { product = "P2", quantity = 1 }]
            synergy_min = 0.1
            synergy_max = 0.9
            "#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let s1_bundles = &catalog[&SellerId::new("s1")];
        assert_eq!(s1_bundles.len(), 1);
        assert_eq!(s1_bundles[0].id().as_str(), "b1");
    }

    #[test]
    fn empty_roster_yields_empty_catalog() {
        let catalog = parse("").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn rejects_one_sided_synergy_bounds() {
        let result = parse(
            r#"
            [[seller]]
            id = "s1"
            [[seller.bundle]]
            id = "b1"
            items = [{ product = "P1", quantity = 1 }]
            synergy_min = 0.1
            "#,
        );
        assert!(result.is_err());
    }
}
