//! Item entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Item identifier, unique across the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog item. Owned by the catalog store; cached copies are disposable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Unit price in minor currency units
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            created_at: Utc::now(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_parse() {
        assert_eq!("42".parse::<ItemId>().unwrap(), ItemId::new(42));
        assert_eq!(" 7 ".parse::<ItemId>().unwrap(), ItemId::new(7));
        assert!("abc".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_item_serializes_id_as_number() {
        let item = Item::new(1, "shoe", 100);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "shoe");
        assert_eq!(json["price"], 100);
    }

    #[test]
    fn test_item_snapshot_round_trip_keeps_timestamp() {
        let created_at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let item = Item::new(2, "bag", 300).with_created_at(created_at);

        let json = serde_json::to_string(&item).unwrap();
        let restored: Item = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, item);
    }
}
