//! Trade session operations
//!
//! An explicit service value over the injected ledger and clock. Each
//! operation runs in a single transaction; acceptance settles every
//! promised item through the ledger's transfer path or none at all.

use chrono::{DateTime, Utc};
use ledger::{Clock, Ledger, LedgerState};
use serde::{Deserialize, Serialize};
use types::prelude::*;

/// The direct-trading service.
#[derive(Debug, Clone)]
pub struct TradeDesk {
    ledger: Ledger,
    clock: Clock,
}

/// A participant as shown in trade views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub player_id: PlayerId,
    pub username: String,
}

/// One promised item line in a trade view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeItemDetails {
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: u32,
    pub from_player_id: PlayerId,
    pub to_player_id: PlayerId,
}

/// Full view of one trade session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDetails {
    pub trade_id: TradeId,
    pub status: TradeStatus,
    pub initiator: PlayerRef,
    pub receiver: PlayerRef,
    pub items: Vec<TradeItemDetails>,
    pub initiated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// One row of a player's trade listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub trade_id: TradeId,
    pub status: TradeStatus,
    pub other_player: PlayerRef,
    pub initiated_at: DateTime<Utc>,
    pub is_initiator: bool,
}

fn player_ref(state: &LedgerState, player_id: PlayerId) -> Result<PlayerRef, StorageError> {
    let player = state.require_player(player_id)?;
    Ok(PlayerRef {
        player_id: player.player_id,
        username: player.username.clone(),
    })
}

fn build_details(state: &LedgerState, trade: &Trade) -> Result<TradeDetails, MarketError> {
    let items = state
        .trade_items(trade.trade_id)
        .iter()
        .map(|line| {
            Ok(TradeItemDetails {
                item_id: line.item_id,
                item_name: state.require_item(line.item_id)?.name.clone(),
                quantity: line.quantity,
                from_player_id: line.from_player_id,
                to_player_id: line.to_player_id,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

    Ok(TradeDetails {
        trade_id: trade.trade_id,
        status: trade.status,
        initiator: player_ref(state, trade.initiator_id)?,
        receiver: player_ref(state, trade.receiver_id)?,
        items,
        initiated_at: trade.initiated_at,
        completed_at: trade.completed_at,
        cancelled_at: trade.cancelled_at,
        notes: trade.notes.clone(),
    })
}

fn missing_trade(trade_id: TradeId) -> StorageError {
    StorageError::MissingRecord {
        kind: "trade",
        id: trade_id.to_string(),
    }
}

impl TradeDesk {
    pub fn new(ledger: Ledger, clock: Clock) -> Self {
        Self { ledger, clock }
    }

    /// Open a pending trade between two players.
    ///
    /// At most one pending trade may exist between any pair of players,
    /// regardless of who initiated it.
    pub fn initiate_trade(
        &self,
        initiator_id: PlayerId,
        receiver_id: PlayerId,
        notes: Option<String>,
    ) -> Result<TradeDetails, MarketError> {
        if initiator_id == receiver_id {
            return Err(TradeError::SelfTrade.into());
        }

        let now = self.clock.now();
        let details = self.ledger.write(|state| {
            state
                .active_player(initiator_id)
                .ok_or(TradeError::InitiatorInactive)?;
            state
                .active_player(receiver_id)
                .ok_or(TradeError::ReceiverInactive)?;

            if state.pending_trade_between(initiator_id, receiver_id).is_some() {
                return Err(TradeError::PendingAlreadyExists.into());
            }

            let trade = Trade::new(initiator_id, receiver_id, notes.clone(), now);
            let trade_id = trade.trade_id;
            state.insert_trade(trade);

            state.append_audit(
                initiator_id,
                Some(trade_id),
                AuditAction::TradeInitiated,
                format!("Trade initiated with player {receiver_id}"),
                now,
            );

            let trade = state.trade(trade_id).ok_or_else(|| missing_trade(trade_id))?;
            build_details(state, trade)
        })?;

        tracing::info!(
            trade = %details.trade_id,
            initiator = %initiator_id,
            receiver = %receiver_id,
            "trade initiated"
        );
        Ok(details)
    }

    /// Promise `quantity` of an item to the other participant.
    ///
    /// Only valid while the trade is pending. The quantity is validated
    /// against current holdings but not reserved; acceptance re-validates.
    /// Each participant may add a given item at most once per trade.
    pub fn add_item_to_trade(
        &self,
        trade_id: TradeId,
        player_id: PlayerId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<TradeDetails, MarketError> {
        if quantity == 0 {
            return Err(TradeError::InvalidQuantity.into());
        }

        let now = self.clock.now();
        let details = self.ledger.write(|state| {
            let trade = match state.trade(trade_id) {
                Some(trade) if trade.is_pending() => trade,
                _ => return Err(MarketError::from(TradeError::NotPending)),
            };
            let recipient_id = trade
                .counterparty(player_id)
                .ok_or(TradeError::NotParticipant)?;

            let item_name = state
                .tradeable_item(item_id)
                .ok_or(TradeError::ItemNotTradeable)?
                .name
                .clone();

            let available = state.inventory_quantity(player_id, item_id);
            if available < quantity {
                return Err(InsufficientItems {
                    item: item_name,
                    needed: quantity,
                    available,
                }
                .into());
            }

            if state.has_trade_item(trade_id, item_id, player_id) {
                return Err(TradeError::DuplicateItem.into());
            }

            state.add_trade_item(TradeItem {
                trade_id,
                item_id,
                quantity,
                from_player_id: player_id,
                to_player_id: recipient_id,
            });

            state.append_audit(
                player_id,
                Some(trade_id),
                AuditAction::ItemAddedToTrade,
                format!("Added {quantity} {item_name} to trade"),
                now,
            );

            let trade = state.trade(trade_id).ok_or_else(|| missing_trade(trade_id))?;
            build_details(state, trade)
        })?;

        tracing::info!(trade = %trade_id, player = %player_id, quantity, "item added to trade");
        Ok(details)
    }

    /// Accept a pending trade and settle every promised item.
    ///
    /// Only the receiver may accept. Every line is re-validated against
    /// current holdings first; if any giver is short, nothing moves and the
    /// trade stays pending.
    pub fn accept_trade(
        &self,
        trade_id: TradeId,
        player_id: PlayerId,
    ) -> Result<TradeDetails, MarketError> {
        let now = self.clock.now();
        let details = self.ledger.write(|state| {
            let trade = match state.trade(trade_id) {
                Some(trade) if trade.is_pending() => trade,
                _ => return Err(MarketError::from(TradeError::NotPending)),
            };
            if player_id != trade.receiver_id {
                return Err(TradeError::NotReceiver.into());
            }

            let lines: Vec<TradeItem> = state.trade_items(trade_id).to_vec();
            if lines.is_empty() {
                return Err(TradeError::EmptyTrade.into());
            }

            for line in &lines {
                let available = state.inventory_quantity(line.from_player_id, line.item_id);
                if available < line.quantity {
                    let item = state.require_item(line.item_id)?.name.clone();
                    return Err(InsufficientItems {
                        item,
                        needed: line.quantity,
                        available,
                    }
                    .into());
                }
            }

            for line in &lines {
                state.transfer_items(
                    line.from_player_id,
                    line.to_player_id,
                    line.item_id,
                    line.quantity,
                )?;
            }

            state
                .trade_mut(trade_id)
                .ok_or_else(|| missing_trade(trade_id))?
                .complete(now);

            state.append_audit(
                player_id,
                Some(trade_id),
                AuditAction::TradeAccepted,
                "Trade completed successfully".to_string(),
                now,
            );

            let trade = state.trade(trade_id).ok_or_else(|| missing_trade(trade_id))?;
            build_details(state, trade)
        })?;

        tracing::info!(trade = %trade_id, "trade completed");
        Ok(details)
    }

    /// Decline a pending trade. Either participant may decline; no
    /// inventory moves.
    pub fn decline_trade(
        &self,
        trade_id: TradeId,
        player_id: PlayerId,
    ) -> Result<TradeDetails, MarketError> {
        let now = self.clock.now();
        let details = self.ledger.write(|state| {
            let trade = match state.trade(trade_id) {
                Some(trade) if trade.is_pending() => trade,
                _ => return Err(MarketError::from(TradeError::NotPending)),
            };
            if !trade.involves(player_id) {
                return Err(TradeError::NotParticipant.into());
            }

            state
                .trade_mut(trade_id)
                .ok_or_else(|| missing_trade(trade_id))?
                .decline(now);

            state.append_audit(
                player_id,
                Some(trade_id),
                AuditAction::TradeDeclined,
                "Trade declined".to_string(),
                now,
            );

            let trade = state.trade(trade_id).ok_or_else(|| missing_trade(trade_id))?;
            build_details(state, trade)
        })?;

        tracing::info!(trade = %trade_id, player = %player_id, "trade declined");
        Ok(details)
    }

    /// Full view of one trade.
    pub fn get_trade_details(&self, trade_id: TradeId) -> Result<TradeDetails, MarketError> {
        self.ledger.read(|state| {
            let trade = state.trade(trade_id).ok_or(TradeError::NotFound {
                trade_id: trade_id.to_string(),
            })?;
            build_details(state, trade)
        })
    }

    /// A player's trades, newest first, optionally filtered by status.
    pub fn get_player_trades(
        &self,
        player_id: PlayerId,
        status: Option<TradeStatus>,
    ) -> Result<Vec<TradeSummary>, MarketError> {
        self.ledger.read(|state| {
            state
                .trades_for_player(player_id, status)
                .into_iter()
                .map(|trade| {
                    let other_id = trade
                        .counterparty(player_id)
                        .ok_or_else(|| missing_trade(trade.trade_id))?;
                    Ok(TradeSummary {
                        trade_id: trade.trade_id,
                        status: trade.status,
                        other_player: player_ref(state, other_id)?,
                        initiated_at: trade.initiated_at,
                        is_initiator: trade.initiator_id == player_id,
                    })
                })
                .collect::<Result<Vec<_>, StorageError>>()
                .map_err(MarketError::from)
        })
    }
}
