//! Executed exchange transaction records

use crate::ids::{ItemId, OfferId, PlayerId, TransactionId};
use crate::money::Price;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An executed match between a buyer and a seller.
///
/// Immutable once created. `total_price` is computed from the execution
/// price and quantity at construction; `offer_id` references the buy-side
/// offer of the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub offer_id: OfferId,
    pub buyer_id: PlayerId,
    pub seller_id: PlayerId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub price_per_item: Price,
    pub total_price: Decimal,
    pub completed_at: DateTime<Utc>,
}

impl Transaction {
    /// Record a new transaction.
    ///
    /// # Panics
    /// Panics on a self-trade or a zero quantity.
    pub fn new(
        offer_id: OfferId,
        buyer_id: PlayerId,
        seller_id: PlayerId,
        item_id: ItemId,
        quantity: u32,
        price_per_item: Price,
        completed_at: DateTime<Utc>,
    ) -> Self {
        assert_ne!(buyer_id, seller_id, "Buyer and seller must differ");
        assert!(quantity > 0, "Transaction quantity must be positive");
        Self {
            transaction_id: TransactionId::new(),
            offer_id,
            buyer_id,
            seller_id,
            item_id,
            quantity,
            price_per_item,
            total_price: price_per_item.total(quantity),
            completed_at,
        }
    }
}
