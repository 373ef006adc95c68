//! Cart, cart line and resolved entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::item::{Item, ItemId};
use crate::domain::DomainError;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

integer_id!(
    /// Cart identifier
    CartId
);
integer_id!(
    /// Cart line identifier
    CartLineId
);
integer_id!(
    /// Owning user/session identifier
    UserId
);

/// Lifecycle state of a cart. At most one open cart exists per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    #[default]
    Open,
    Closed,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl std::str::FromStr for CartStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(DomainError::validation(format!(
                "Unknown cart status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(id: impl Into<CartId>, user_id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            status: CartStatus::Open,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: CartStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == CartStatus::Open
    }
}

/// Association of an item with a cart, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub cart_id: CartId,
    pub item_id: ItemId,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CartLine {
    pub fn new(
        id: impl Into<CartLineId>,
        cart_id: impl Into<CartId>,
        item_id: impl Into<ItemId>,
        quantity: i64,
    ) -> Self {
        Self {
            id: id.into(),
            cart_id: cart_id.into(),
            item_id: item_id.into(),
            quantity,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn deleted(mut self) -> Self {
        self.deleted_at = Some(Utc::now());
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the line should appear in a rendered cart
    pub fn is_active(&self) -> bool {
        self.quantity > 0 && !self.is_deleted()
    }
}

/// A cart line joined with its item. Computed per read, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCartEntry {
    pub line_id: CartLineId,
    pub quantity: i64,
    /// Unit price times quantity; `None` when the item could not be resolved
    pub total_price: Option<i64>,
    pub item_name: Option<String>,
    pub item: Option<Item>,
    pub is_deleted: bool,
}

impl ResolvedCartEntry {
    /// Joins a line with its item. A missing item yields an entry without item data.
    pub fn from_line(line: &CartLine, item: Option<&Item>) -> Self {
        Self {
            line_id: line.id,
            quantity: line.quantity,
            total_price: item.map(|i| i.price.saturating_mul(line.quantity)),
            item_name: item.map(|i| i.name.clone()),
            item: item.cloned(),
            is_deleted: line.is_deleted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_status_parse() {
        assert_eq!("open".parse::<CartStatus>().unwrap(), CartStatus::Open);
        assert_eq!("closed".parse::<CartStatus>().unwrap(), CartStatus::Closed);
        assert!("pending".parse::<CartStatus>().is_err());
        assert_eq!(CartStatus::Closed.as_str(), "closed");
    }

    #[test]
    fn test_cart_line_activity() {
        assert!(CartLine::new(1, 1, 1, 2).is_active());
        assert!(!CartLine::new(2, 1, 1, 0).is_active());
        assert!(!CartLine::new(3, 1, 1, -1).is_active());
        assert!(!CartLine::new(4, 1, 1, 3).deleted().is_active());
    }

    #[test]
    fn test_resolved_entry_prices_line() {
        let line = CartLine::new(10, 1, 2, 3);
        let item = Item::new(2, "bag", 300);

        let entry = ResolvedCartEntry::from_line(&line, Some(&item));

        assert_eq!(entry.line_id, CartLineId::new(10));
        assert_eq!(entry.total_price, Some(900));
        assert_eq!(entry.item_name.as_deref(), Some("bag"));
        assert!(!entry.is_deleted);
    }

    #[test]
    fn test_resolved_entry_with_dangling_item() {
        let line = CartLine::new(11, 1, 99, 1);

        let entry = ResolvedCartEntry::from_line(&line, None);

        assert_eq!(entry.quantity, 1);
        assert!(entry.item.is_none());
        assert!(entry.item_name.is_none());
        assert!(entry.total_price.is_none());
    }
}
