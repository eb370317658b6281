//! Domain DTOs exchanged with the recommendation engine.
//!
//! # Design
//! These types mirror the engine's JSON schema (camelCase on the wire) but
//! carry no behavior of their own: ids, values and expressions are forwarded
//! verbatim and the engine owns every consistency rule. The mock server
//! defines its own representation; integration tests catch schema drift.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Property values of an item or user, keyed by property name.
pub type Values = serde_json::Map<String, Value>;

/// Value type of an item or user property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Int,
    Double,
    String,
    Boolean,
    /// UTC timestamp.
    Timestamp,
    /// A set of strings, e.g. `["Electronics", "Televisions"]`.
    Set,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Int => "int",
            PropertyType::Double => "double",
            PropertyType::String => "string",
            PropertyType::Boolean => "boolean",
            PropertyType::Timestamp => "timestamp",
            PropertyType::Set => "set",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and type of a property, as returned by the property info and listing
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
}

/// Time of an interaction: UTC epoch seconds or an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(f64),
    Iso(String),
}

impl From<f64> for Timestamp {
    fn from(seconds: f64) -> Self {
        Timestamp::Epoch(seconds)
    }
}

impl From<i64> for Timestamp {
    fn from(seconds: i64) -> Self {
        Timestamp::Epoch(seconds as f64)
    }
}

impl From<&str> for Timestamp {
    fn from(iso: &str) -> Self {
        Timestamp::Iso(iso.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(iso: String) -> Self {
        Timestamp::Iso(iso)
    }
}

/// Result of the list and recommendation endpoints.
///
/// The engine answers with bare ids unless `returnProperties` was requested,
/// in which case each entry is a record holding the id and property values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing {
    Ids(Vec<String>),
    Records(Vec<Values>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Listing::Ids(ids) => ids.len(),
            Listing::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids in engine order. Records contribute their `itemId` or `userId`.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Listing::Ids(ids) => ids.iter().map(String::as_str).collect(),
            Listing::Records(records) => records
                .iter()
                .filter_map(|r| r.get("itemId").or_else(|| r.get("userId")))
                .filter_map(Value::as_str)
                .collect(),
        }
    }
}

/// A recorded detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub user_id: String,
    pub item_id: String,
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

/// A recorded purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub user_id: String,
    pub item_id: String,
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
}

/// One purchase in a batch submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub user_id: String,
    pub item_id: String,
    pub timestamp: Option<Timestamp>,
}

impl PurchaseRecord {
    pub fn new(user_id: &str, item_id: &str, timestamp: Option<Timestamp>) -> Self {
        Self {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            timestamp,
        }
    }
}

/// Outcome of one sub-request of a batch, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub code: u16,
    pub json: Value,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_uses_lowercase_names() {
        let info: PropertyInfo = serde_json::from_str(r#"{"name":"price","type":"double"}"#).unwrap();
        assert_eq!(info.property_type, PropertyType::Double);
        assert_eq!(PropertyType::Set.to_string(), "set");
    }

    #[test]
    fn timestamp_accepts_numbers_and_strings() {
        let epoch: Timestamp = serde_json::from_str("1500000000.5").unwrap();
        assert_eq!(epoch, Timestamp::Epoch(1_500_000_000.5));
        let iso: Timestamp = serde_json::from_str(r#""2013-10-29T09:38:41.341Z""#).unwrap();
        assert_eq!(iso, Timestamp::from("2013-10-29T09:38:41.341Z"));
    }

    #[test]
    fn listing_of_ids() {
        let listing: Listing = serde_json::from_str(r#"["item-865","item-460"]"#).unwrap();
        assert_eq!(listing.ids(), vec!["item-865", "item-460"]);
    }

    #[test]
    fn listing_of_records_exposes_ids() {
        let listing: Listing =
            serde_json::from_str(r#"[{"itemId":"tv-1","price":342},{"itemId":"tv-2","price":null}]"#).unwrap();
        assert!(matches!(listing, Listing::Records(_)));
        assert_eq!(listing.ids(), vec!["tv-1", "tv-2"]);
    }

    #[test]
    fn empty_listing() {
        let listing: Listing = serde_json::from_str("[]").unwrap();
        assert!(listing.is_empty());
    }

    #[test]
    fn purchase_reads_camel_case() {
        let p: Purchase =
            serde_json::from_str(r#"{"userId":"u","itemId":"i","timestamp":5.0,"amount":2}"#).unwrap();
        assert_eq!(p.user_id, "u");
        assert_eq!(p.amount, Some(2.0));
        assert!(p.price.is_none());
    }
}
