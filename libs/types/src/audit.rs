//! Append-only audit trail entries
//!
//! Every mutating marketplace action appends exactly one entry. Entries are
//! never updated or deleted.

use crate::ids::{PlayerId, TradeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed vocabulary of audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A buy or sell offer was placed on the exchange
    GeOfferPlaced,
    /// An active offer was cancelled by its owner
    GeOfferCancelled,
    /// A direct trade session was opened
    TradeInitiated,
    /// An item was added to a pending trade
    ItemAddedToTrade,
    /// A pending trade was accepted and settled
    TradeAccepted,
    /// A pending trade was declined
    TradeDeclined,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::GeOfferPlaced => "ge_offer_placed",
            AuditAction::GeOfferCancelled => "ge_offer_cancelled",
            AuditAction::TradeInitiated => "trade_initiated",
            AuditAction::ItemAddedToTrade => "item_added_to_trade",
            AuditAction::TradeAccepted => "trade_accepted",
            AuditAction::TradeDeclined => "trade_declined",
        }
    }
}

/// One audit trail row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonic position in the log, starting at 1.
    pub sequence: u64,
    pub player_id: PlayerId,
    pub trade_id: Option<TradeId>,
    pub action: AuditAction,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags() {
        assert_eq!(AuditAction::GeOfferPlaced.as_str(), "ge_offer_placed");
        assert_eq!(AuditAction::ItemAddedToTrade.as_str(), "item_added_to_trade");
        assert_eq!(AuditAction::TradeDeclined.as_str(), "trade_declined");
    }

    #[test]
    fn test_entry_serialization() {
        let entry = AuditEntry {
            sequence: 1,
            player_id: PlayerId::new(),
            trade_id: Some(TradeId::new()),
            action: AuditAction::TradeAccepted,
            details: "Trade completed successfully".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("trade_accepted"));
        let back: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
