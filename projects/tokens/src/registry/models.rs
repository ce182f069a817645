use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A token as served over HTTP and persisted to the store.
///
/// `id` is the 1-based position in the fetch batch that produced the record,
/// so the same upstream token can change id when the feed reorders. `name`
/// and `quantity` are opaque upstream values and keep their JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: u32,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default)]
    pub stars: u32,
    /// Upstream fields with no meaning here. Served, never persisted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRecord {
    pub fn new(
        id: u32,
        address: impl Into<String>,
        name: impl Into<Value>,
        quantity: Value,
        stars: u32,
    ) -> Self {
        Self {
            id,
            address: address.into(),
            name: name.into(),
            quantity,
            stars,
            extra: Map::new(),
        }
    }
}
