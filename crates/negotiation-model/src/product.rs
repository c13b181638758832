use derive_more::Display;

/// A product's stable short symbol, e.g. `P1`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Display, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
