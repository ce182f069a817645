use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::models::TokenRecord;

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

#[derive(Debug, Serialize)]
#[serde(rename = "tokens")]
pub struct TokensDocument<'a> {
    #[serde(rename = "token")]
    pub tokens: Vec<TokenEntry<'a>>,
}

/// Strings that must survive byte for byte live in attributes: element text
/// is trimmed on read, attribute values are not. `name` and `quantity` hold
/// the JSON encoding of the opaque upstream value.
#[derive(Debug, Serialize)]
pub struct TokenEntry<'a> {
    #[serde(rename = "@address")]
    pub address: &'a str,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@quantity")]
    pub quantity: String,
    pub id: u32,
    pub stars: u32,
}

impl<'a> From<&'a TokenRecord> for TokenEntry<'a> {
    fn from(record: &'a TokenRecord) -> Self {
        Self {
            address: &record.address,
            name: encode_value(&record.name),
            quantity: encode_value(&record.quantity),
            id: record.id,
            stars: record.stars,
        }
    }
}

/// Read side of [`TokensDocument`]. Everything is optional so that a document
/// with an unexpected shape loads as "no usable data" instead of failing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawTokensDocument {
    #[serde(rename = "token")]
    pub tokens: Vec<RawTokenEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawTokenEntry {
    #[serde(rename = "@address")]
    pub address: Option<String>,
    #[serde(rename = "@name")]
    pub name: Option<String>,
    #[serde(rename = "@quantity")]
    pub quantity: Option<String>,
    pub id: Option<u32>,
    pub stars: Option<u32>,
}

impl RawTokenEntry {
    /// `None` when the entry lacks the fields the merge keys on.
    pub fn into_record(self) -> Option<TokenRecord> {
        Some(TokenRecord {
            id: self.id?,
            address: self.address.unwrap_or_default(),
            name: decode_value(self.name.as_deref()),
            quantity: decode_value(self.quantity.as_deref()),
            stars: self.stars?,
            extra: Map::new(),
        })
    }
}

pub fn encode_value(value: &Value) -> String {
    value.to_string()
}

/// Absent attributes load as `null`. Text that is not JSON, as in a
/// hand-edited store, is kept as a plain string.
pub fn decode_value(text: Option<&str>) -> Value {
    match text {
        None => Value::Null,
        Some(text) => {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        }
    }
}
