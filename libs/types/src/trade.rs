//! Direct trade session types
//!
//! A trade session is a two-party, multi-item barter negotiation that is
//! independent of the exchange book. Sessions start pending and end either
//! completed or declined; there is no expiration.

use crate::ids::{ItemId, PlayerId, TradeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    /// Open for item additions and acceptance
    Pending,
    /// Accepted by the receiver; items transferred (terminal)
    Completed,
    /// Declined by either participant (terminal)
    Declined,
}

impl TradeStatus {
    /// Check if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TradeStatus::Pending)
    }
}

/// A direct trade session between two players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub initiator_id: PlayerId,
    pub receiver_id: PlayerId,
    pub status: TradeStatus,
    pub initiated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Trade {
    /// Create a new pending trade.
    ///
    /// # Panics
    /// Panics if the initiator and receiver are the same player.
    pub fn new(
        initiator_id: PlayerId,
        receiver_id: PlayerId,
        notes: Option<String>,
        initiated_at: DateTime<Utc>,
    ) -> Self {
        assert_ne!(initiator_id, receiver_id, "Cannot trade with yourself");
        Self {
            trade_id: TradeId::new(),
            initiator_id,
            receiver_id,
            status: TradeStatus::Pending,
            initiated_at,
            completed_at: None,
            cancelled_at: None,
            notes,
        }
    }

    /// Check whether `player_id` is one of the two participants.
    pub fn involves(&self, player_id: PlayerId) -> bool {
        player_id == self.initiator_id || player_id == self.receiver_id
    }

    /// The other participant, or `None` if `player_id` is not in the trade.
    pub fn counterparty(&self, player_id: PlayerId) -> Option<PlayerId> {
        if player_id == self.initiator_id {
            Some(self.receiver_id)
        } else if player_id == self.receiver_id {
            Some(self.initiator_id)
        } else {
            None
        }
    }

    /// Check if the trade is still open.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, TradeStatus::Pending)
    }

    /// Mark the trade completed.
    ///
    /// # Panics
    /// Panics if the trade is not pending.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        assert!(self.is_pending(), "Cannot complete a settled trade");
        self.status = TradeStatus::Completed;
        self.completed_at = Some(now);
    }

    /// Mark the trade declined.
    ///
    /// # Panics
    /// Panics if the trade is not pending.
    pub fn decline(&mut self, now: DateTime<Utc>) {
        assert!(self.is_pending(), "Cannot decline a settled trade");
        self.status = TradeStatus::Declined;
        self.cancelled_at = Some(now);
    }
}

/// One line of a trade session: `quantity` of `item_id` promised by
/// `from_player_id` to `to_player_id`.
///
/// Both players must be participants of the owning trade, one on each end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeItem {
    pub trade_id: TradeId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub from_player_id: PlayerId,
    pub to_player_id: PlayerId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_trade() -> Trade {
        Trade::new(PlayerId::new(), PlayerId::new(), None, Utc::now())
    }

    #[test]
    fn test_new_trade_is_pending() {
        let trade = pending_trade();
        assert!(trade.is_pending());
        assert!(trade.completed_at.is_none());
        assert!(trade.cancelled_at.is_none());
    }

    #[test]
    #[should_panic(expected = "Cannot trade with yourself")]
    fn test_self_trade_panics() {
        let player = PlayerId::new();
        Trade::new(player, player, None, Utc::now());
    }

    #[test]
    fn test_participants_and_counterparty() {
        let trade = pending_trade();
        assert!(trade.involves(trade.initiator_id));
        assert!(trade.involves(trade.receiver_id));
        assert!(!trade.involves(PlayerId::new()));

        assert_eq!(trade.counterparty(trade.initiator_id), Some(trade.receiver_id));
        assert_eq!(trade.counterparty(trade.receiver_id), Some(trade.initiator_id));
        assert_eq!(trade.counterparty(PlayerId::new()), None);
    }

    #[test]
    fn test_complete_sets_timestamp() {
        let mut trade = pending_trade();
        trade.complete(Utc::now());
        assert_eq!(trade.status, TradeStatus::Completed);
        assert!(trade.completed_at.is_some());
        assert!(trade.cancelled_at.is_none());
    }

    #[test]
    fn test_decline_sets_timestamp() {
        let mut trade = pending_trade();
        trade.decline(Utc::now());
        assert_eq!(trade.status, TradeStatus::Declined);
        assert!(trade.cancelled_at.is_some());
        assert!(trade.completed_at.is_none());
    }

    #[test]
    #[should_panic(expected = "Cannot complete a settled trade")]
    fn test_complete_after_decline_panics() {
        let mut trade = pending_trade();
        trade.decline(Utc::now());
        trade.complete(Utc::now());
    }

    #[test]
    #[should_panic(expected = "Cannot decline a settled trade")]
    fn test_decline_after_complete_panics() {
        let mut trade = pending_trade();
        trade.complete(Utc::now());
        trade.decline(Utc::now());
    }
}
