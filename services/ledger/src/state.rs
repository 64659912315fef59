//! Ledger record set
//!
//! `BTreeMap`-backed tables so iteration order is deterministic. The
//! inventory table is private: [`LedgerState::transfer_items`] and
//! [`LedgerState::deposit`] are the only mutation paths, which is what keeps
//! the quantity-never-negative invariant checkable in one place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use types::prelude::*;

/// The full marketplace record set.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    players: BTreeMap<PlayerId, Player>,
    items: BTreeMap<ItemId, Item>,
    inventory: BTreeMap<(PlayerId, ItemId), u32>,
    offers: BTreeMap<OfferId, Offer>,
    transactions: Vec<Transaction>,
    trades: BTreeMap<TradeId, Trade>,
    trade_items: BTreeMap<TradeId, Vec<TradeItem>>,
    price_history: Vec<PricePoint>,
    audit_log: Vec<AuditEntry>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Players ─────────────────────────────────────────────────────

    /// Register a new active player. Usernames are unique.
    pub fn register_player(
        &mut self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<Player, StorageError> {
        if self.players.values().any(|p| p.username == username) {
            return Err(StorageError::Constraint(format!(
                "username already taken: {username}"
            )));
        }
        let player = Player::new(username, now);
        self.players.insert(player.player_id, player.clone());
        Ok(player)
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    /// Look up a player that exists and is active.
    pub fn active_player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id).filter(|p| p.is_active())
    }

    /// Look up a player, treating absence as a referential-integrity failure.
    pub fn require_player(&self, player_id: PlayerId) -> Result<&Player, StorageError> {
        self.players.get(&player_id).ok_or(StorageError::MissingRecord {
            kind: "player",
            id: player_id.to_string(),
        })
    }

    /// Deactivate a player, detaching them from future marketplace actions.
    pub fn deactivate_player(&mut self, player_id: PlayerId) -> Result<(), StorageError> {
        let player = self.players.get_mut(&player_id).ok_or(StorageError::MissingRecord {
            kind: "player",
            id: player_id.to_string(),
        })?;
        player.active = false;
        Ok(())
    }

    // ── Items ───────────────────────────────────────────────────────

    /// Register a new item definition.
    pub fn register_item(
        &mut self,
        name: &str,
        tradeable: bool,
        stackable: bool,
        base_value: Decimal,
        now: DateTime<Utc>,
    ) -> Item {
        let item = Item::new(name, tradeable, stackable, base_value, now);
        self.items.insert(item.item_id, item.clone());
        item
    }

    pub fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.get(&item_id)
    }

    /// Look up an item that exists and is tradeable.
    pub fn tradeable_item(&self, item_id: ItemId) -> Option<&Item> {
        self.items.get(&item_id).filter(|i| i.is_tradeable())
    }

    /// Look up an item, treating absence as a referential-integrity failure.
    pub fn require_item(&self, item_id: ItemId) -> Result<&Item, StorageError> {
        self.items.get(&item_id).ok_or(StorageError::MissingRecord {
            kind: "item",
            id: item_id.to_string(),
        })
    }

    // ── Inventory ───────────────────────────────────────────────────

    /// Grant `quantity` of an item to a player, returning the new holding.
    ///
    /// Depositing onto an existing holding of a non-stackable item is
    /// rejected; the transfer path is not subject to this rule.
    pub fn deposit(
        &mut self,
        player_id: PlayerId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<u32, StorageError> {
        assert!(quantity > 0, "Deposit quantity must be positive");
        self.require_player(player_id)?;
        let item = self.require_item(item_id)?;

        let key = (player_id, item_id);
        if let Some(held) = self.inventory.get(&key) {
            if !item.stackable {
                return Err(StorageError::Constraint(format!(
                    "player already holds non-stackable item {}",
                    item.name
                )));
            }
            let updated = held + quantity;
            self.inventory.insert(key, updated);
            Ok(updated)
        } else {
            self.inventory.insert(key, quantity);
            Ok(quantity)
        }
    }

    /// Quantity of `item_id` currently held by `player_id` (zero if none).
    pub fn inventory_quantity(&self, player_id: PlayerId, item_id: ItemId) -> u32 {
        self.inventory.get(&(player_id, item_id)).copied().unwrap_or(0)
    }

    /// All holdings of a player.
    pub fn inventory_of(&self, player_id: PlayerId) -> Vec<InventoryHolding> {
        self.inventory
            .iter()
            .filter(|((owner, _), _)| *owner == player_id)
            .map(|((owner, item), quantity)| InventoryHolding {
                player_id: *owner,
                item_id: *item,
                quantity: *quantity,
            })
            .collect()
    }

    /// Move `quantity` units of `item_id` from one player to another.
    ///
    /// The sole mutation path shared by matching and trade settlement.
    /// Callers validate sufficiency beforehand within the same transaction;
    /// an underflow here is a hard storage error that rolls the operation
    /// back. A holding drained to zero is removed.
    pub fn transfer_items(
        &mut self,
        from_player_id: PlayerId,
        to_player_id: PlayerId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), StorageError> {
        assert!(quantity > 0, "Transfer quantity must be positive");

        let from_key = (from_player_id, item_id);
        let available = self.inventory.get(&from_key).copied().unwrap_or(0);
        if available < quantity {
            return Err(StorageError::InventoryUnderflow {
                requested: quantity,
                available,
            });
        }

        if available == quantity {
            self.inventory.remove(&from_key);
        } else {
            self.inventory.insert(from_key, available - quantity);
        }

        let to_key = (to_player_id, item_id);
        let held = self.inventory.get(&to_key).copied().unwrap_or(0);
        self.inventory.insert(to_key, held + quantity);

        Ok(())
    }

    // ── Offers ──────────────────────────────────────────────────────

    pub fn insert_offer(&mut self, offer: Offer) {
        self.offers.insert(offer.offer_id, offer);
    }

    pub fn offer(&self, offer_id: OfferId) -> Option<&Offer> {
        self.offers.get(&offer_id)
    }

    pub fn offer_mut(&mut self, offer_id: OfferId) -> Option<&mut Offer> {
        self.offers.get_mut(&offer_id)
    }

    /// A player's offers, newest first, optionally filtered by status.
    pub fn offers_for_player(
        &self,
        player_id: PlayerId,
        status: Option<OfferStatus>,
    ) -> Vec<&Offer> {
        let mut offers: Vec<&Offer> = self
            .offers
            .values()
            .filter(|o| o.player_id == player_id)
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect();
        offers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        offers
    }

    /// Active offers on one side of the book for an item.
    pub fn active_offers_for_item(&self, item_id: ItemId, side: Side) -> Vec<&Offer> {
        self.offers
            .values()
            .filter(|o| o.item_id == item_id && o.side == side && o.is_active())
            .collect()
    }

    /// Ids of active offers whose lifetime has elapsed as of `now`.
    pub fn active_expired_ids(&self, now: DateTime<Utc>) -> Vec<OfferId> {
        self.offers
            .values()
            .filter(|o| o.is_active() && o.is_expired_at(now))
            .map(|o| o.offer_id)
            .collect()
    }

    // ── Transactions ────────────────────────────────────────────────

    pub fn record_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    // ── Trades ──────────────────────────────────────────────────────

    pub fn insert_trade(&mut self, trade: Trade) {
        self.trades.insert(trade.trade_id, trade);
    }

    pub fn trade(&self, trade_id: TradeId) -> Option<&Trade> {
        self.trades.get(&trade_id)
    }

    pub fn trade_mut(&mut self, trade_id: TradeId) -> Option<&mut Trade> {
        self.trades.get_mut(&trade_id)
    }

    /// Any pending trade between the two players, in either direction.
    pub fn pending_trade_between(&self, a: PlayerId, b: PlayerId) -> Option<&Trade> {
        self.trades.values().find(|t| {
            t.is_pending()
                && ((t.initiator_id == a && t.receiver_id == b)
                    || (t.initiator_id == b && t.receiver_id == a))
        })
    }

    /// Trades involving a player, newest first, optionally filtered by status.
    pub fn trades_for_player(
        &self,
        player_id: PlayerId,
        status: Option<TradeStatus>,
    ) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> = self
            .trades
            .values()
            .filter(|t| t.involves(player_id))
            .filter(|t| status.map_or(true, |s| t.status == s))
            .collect();
        trades.sort_by(|a, b| b.initiated_at.cmp(&a.initiated_at));
        trades
    }

    pub fn trade_items(&self, trade_id: TradeId) -> &[TradeItem] {
        self.trade_items.get(&trade_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check whether a player already contributed this item to a trade.
    pub fn has_trade_item(&self, trade_id: TradeId, item_id: ItemId, from: PlayerId) -> bool {
        self.trade_items(trade_id)
            .iter()
            .any(|ti| ti.item_id == item_id && ti.from_player_id == from)
    }

    pub fn add_trade_item(&mut self, trade_item: TradeItem) {
        self.trade_items
            .entry(trade_item.trade_id)
            .or_default()
            .push(trade_item);
    }

    // ── Price history ───────────────────────────────────────────────

    pub fn append_price_point(&mut self, point: PricePoint) {
        self.price_history.push(point);
    }

    /// Price points for an item recorded at or after `since`, ascending.
    pub fn price_points_for_item(
        &self,
        item_id: ItemId,
        since: DateTime<Utc>,
    ) -> Vec<&PricePoint> {
        let mut points: Vec<&PricePoint> = self
            .price_history
            .iter()
            .filter(|p| p.item_id == item_id && p.recorded_at >= since)
            .collect();
        points.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        points
    }

    // ── Audit log ───────────────────────────────────────────────────

    /// Append one audit row. Sequence numbers start at 1 and never repeat.
    pub fn append_audit(
        &mut self,
        player_id: PlayerId,
        trade_id: Option<TradeId>,
        action: AuditAction,
        details: String,
        now: DateTime<Utc>,
    ) {
        let sequence = self.audit_log.len() as u64 + 1;
        self.audit_log.push(AuditEntry {
            sequence,
            player_id,
            trade_id,
            action,
            details,
            created_at: now,
        });
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    pub fn audit_for_player(&self, player_id: PlayerId) -> Vec<&AuditEntry> {
        self.audit_log.iter().filter(|e| e.player_id == player_id).collect()
    }
}
