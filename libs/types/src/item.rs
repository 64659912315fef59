//! Item reference data and inventory views

use crate::ids::{ItemId, PlayerId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An item definition.
///
/// Immutable reference data: only tradeable items may appear in offers or
/// trades, and only stackable items accumulate on deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub name: String,
    pub tradeable: bool,
    pub stackable: bool,
    pub base_value: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        tradeable: bool,
        stackable: bool,
        base_value: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            item_id: ItemId::new(),
            name: name.into(),
            tradeable,
            stackable,
            base_value,
            created_at,
        }
    }

    pub fn is_tradeable(&self) -> bool {
        self.tradeable
    }
}

/// A read-side view of one player's holding of one item.
///
/// Holdings with zero quantity are never materialized: the ledger removes
/// the row when a transfer drains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryHolding {
    pub player_id: PlayerId,
    pub item_id: ItemId,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_creation() {
        let item = Item::new("Rune scimitar", true, false, Decimal::from(15000), Utc::now());
        assert!(item.is_tradeable());
        assert!(!item.stackable);
    }

    #[test]
    fn test_item_serialization() {
        let item = Item::new("Feather", true, true, Decimal::from(2), Utc::now());
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
