//! Snapshot-transaction store
//!
//! `Ledger` wraps the record set in a lock and exposes two entry points:
//! [`Ledger::read`] for queries and [`Ledger::write`] for mutations. A write
//! transaction clones the current state, runs the caller's closure against
//! the clone, and installs the clone only when the closure returns `Ok`;
//! an `Err` discards it, so every operation commits all-or-nothing.
//!
//! Writes are serialized by the lock. Serialization is the concurrency
//! answer for the matching engine: a sweep re-reads `quantity_remaining`
//! inside its own write scope, so two concurrently placed offers can never
//! both consume the same resting quantity.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use types::prelude::*;

use crate::state::LedgerState;

/// Shared handle to the transactional store.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    state: Arc<RwLock<LedgerState>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-only query against the committed state.
    pub fn read<T>(&self, f: impl FnOnce(&LedgerState) -> T) -> T {
        f(&self.read_guard())
    }

    /// Run a transaction: commit the mutated state on `Ok`, discard it on
    /// `Err`.
    pub fn write<T, E>(&self, f: impl FnOnce(&mut LedgerState) -> Result<T, E>) -> Result<T, E> {
        let mut guard = self.write_guard();
        let mut working = guard.clone();
        match f(&mut working) {
            Ok(value) => {
                *guard = working;
                Ok(value)
            }
            Err(err) => {
                tracing::debug!("transaction rolled back");
                Err(err)
            }
        }
    }

    // Committed state is only ever replaced wholesale under the write lock,
    // so a poisoned lock cannot expose a half-applied transaction; recover
    // the guard instead of propagating the panic.
    fn read_guard(&self) -> RwLockReadGuard<'_, LedgerState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, LedgerState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // ── Directory surface ───────────────────────────────────────────
    //
    // Bootstrap operations used by the hosting application and tests;
    // marketplace mutations go through the exchange and trading services.

    /// Register a new active player.
    pub fn register_player(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<Player, StorageError> {
        self.write(|state| state.register_player(username, now))
    }

    /// Register a new item definition.
    pub fn register_item(
        &self,
        name: &str,
        tradeable: bool,
        stackable: bool,
        base_value: Decimal,
        now: DateTime<Utc>,
    ) -> Item {
        // Item registration has no failure mode; the Err type is only for
        // the transaction plumbing.
        let result: Result<Item, std::convert::Infallible> =
            self.write(|state| Ok(state.register_item(name, tradeable, stackable, base_value, now)));
        result.unwrap_or_else(|never| match never {})
    }

    /// Grant items to a player.
    pub fn deposit(
        &self,
        player_id: PlayerId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<u32, StorageError> {
        self.write(|state| state.deposit(player_id, item_id, quantity))
    }

    /// Look up a player record.
    pub fn player(&self, player_id: PlayerId) -> Option<Player> {
        self.read(|state| state.player(player_id).cloned())
    }

    /// Look up an item definition.
    pub fn item(&self, item_id: ItemId) -> Option<Item> {
        self.read(|state| state.item(item_id).cloned())
    }

    /// A player's current holdings.
    pub fn inventory_of(&self, player_id: PlayerId) -> Vec<InventoryHolding> {
        self.read(|state| state.inventory_of(player_id))
    }

    /// Full audit trail, oldest first.
    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.read(|state| state.audit_log().to_vec())
    }
}
