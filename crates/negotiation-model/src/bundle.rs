use std::collections::HashMap;

use derive_more::Display;

use crate::{product::ProductId, Error};

/// A bundle's stable identifier. Deliberately opaque: identity must never be
/// overloaded with semantic encoding (e.g. a product-inclusion bitstring),
/// per the spec's explicit warning about divergent bundle-id schemes found
/// in the source material.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Display, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BundleId(String);

impl BundleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BundleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One (product, quantity) line item within a bundle. Quantity is always
/// strictly positive; a zero-quantity line item is meaningless and rejected
/// at construction.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BundleItem {
    pub product: ProductId,
    pub quantity: u32,
}

/// Per-bundle synergy bounds used to contract a party's global `[min, max]`
/// issue range to a bundle-specific interval (see the Evaluator's
/// per-bundle synergy derivation).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SynergyBounds {
    min: f64,
    max: f64,
}

impl SynergyBounds {
    pub fn try_new(min: f64, max: f64) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(Error::InvalidBundle(format!(
                "synergy bounds must satisfy 0 <= min <= max <= 1, got ({min}, {max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Default for SynergyBounds {
    /// The neutral synergy window: no contraction of the party's global
    /// issue range.
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// A catalog-time, thereafter-immutable product bundle. Two bundles are
/// equal iff their identifiers are equal, regardless of their items.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Bundle {
    id: BundleId,
    items: Vec<BundleItem>,
    synergy: SynergyBounds,
    weights: HashMap<String, f64>,
    metadata: HashMap<String, String>,
}

impl Bundle {
    pub fn new(
        id: BundleId,
        items: Vec<BundleItem>,
        synergy: SynergyBounds,
        weights: HashMap<String, f64>,
        metadata: HashMap<String, String>,
    ) -> Result<Self, Error> {
        if items.is_empty() {
            return Err(Error::InvalidBundle(format!("bundle {id} has no items")));
        }
        if items.iter().any(|item| item.quantity == 0) {
            return Err(Error::InvalidBundle(format!(
                "bundle {id} has a zero-quantity item"
            )));
        }
        if weights.values().any(|w| *w < 0.0) {
            return Err(Error::InvalidBundle(format!(
                "bundle {id} has a negative issue weight"
            )));
        }
        Ok(Self {
            id,
            items,
            synergy,
            weights,
            metadata,
        })
    }

    pub fn id(&self) -> &BundleId {
        &self.id
    }

    pub fn items(&self) -> &[BundleItem] {
        &self.items
    }

    pub fn synergy(&self) -> SynergyBounds {
        self.synergy
    }

    pub fn weights(&self) -> &HashMap<String, f64> {
        &self.weights
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn quantity_of(&self, product: &ProductId) -> u32 {
        self.items
            .iter()
            .filter(|item| &item.product == product)
            .map(|item| item.quantity)
            .sum()
    }
}

impl PartialEq for Bundle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Bundle {}
