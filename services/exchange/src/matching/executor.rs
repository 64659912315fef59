//! Single-match execution
//!
//! Executes one match between the incoming offer and a resting candidate:
//! items move from seller to buyer through the ledger's transfer path, a
//! transaction is recorded at the resting offer's price, both remainders
//! shrink, and a price-history point is appended.

use chrono::{DateTime, Utc};
use ledger::LedgerState;
use types::prelude::*;

/// What a single match attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchOutcome {
    /// The match executed for `quantity` units at `price`.
    Executed { quantity: u32, price: Price },
    /// The seller no longer holds the matched quantity; nothing moved.
    SellerShort {
        seller_id: PlayerId,
        required: u32,
        available: u32,
    },
}

fn missing_offer(offer_id: OfferId) -> StorageError {
    StorageError::MissingRecord {
        kind: "offer",
        id: offer_id.to_string(),
    }
}

/// Execute one match between two active offers of opposite sides.
///
/// The execution price is always the resting offer's price; price
/// improvement goes to whichever side arrived first. The transaction is
/// linked to the buy-side offer.
pub(crate) fn execute_match(
    state: &mut LedgerState,
    incoming_id: OfferId,
    resting_id: OfferId,
    now: DateTime<Utc>,
) -> Result<MatchOutcome, MarketError> {
    let incoming = state.offer(incoming_id).ok_or_else(|| missing_offer(incoming_id))?;
    let resting = state.offer(resting_id).ok_or_else(|| missing_offer(resting_id))?;

    debug_assert_eq!(incoming.item_id, resting.item_id);
    debug_assert_ne!(incoming.player_id, resting.player_id);
    debug_assert!(incoming.is_active() && resting.is_active());

    let quantity = incoming.quantity_remaining.min(resting.quantity_remaining);
    let price = resting.price_per_item;
    let item_id = incoming.item_id;

    let (buy_offer_id, buyer_id, seller_id) = match incoming.side {
        Side::Buy => (incoming_id, incoming.player_id, resting.player_id),
        Side::Sell => (resting_id, resting.player_id, incoming.player_id),
    };

    // Sell offers reserve nothing at placement, so the seller is
    // re-validated here, inside the serialized write scope.
    let available = state.inventory_quantity(seller_id, item_id);
    if available < quantity {
        return Ok(MatchOutcome::SellerShort {
            seller_id,
            required: quantity,
            available,
        });
    }

    state.transfer_items(seller_id, buyer_id, item_id, quantity)?;
    state.record_transaction(Transaction::new(
        buy_offer_id,
        buyer_id,
        seller_id,
        item_id,
        quantity,
        price,
        now,
    ));

    state
        .offer_mut(incoming_id)
        .ok_or_else(|| missing_offer(incoming_id))?
        .fill(quantity, now);
    state
        .offer_mut(resting_id)
        .ok_or_else(|| missing_offer(resting_id))?
        .fill(quantity, now);

    state.append_price_point(PricePoint {
        item_id,
        price,
        volume: quantity,
        recorded_at: now,
        source: PriceSource::Ge,
    });

    tracing::info!(
        item = %item_id,
        quantity,
        price = %price,
        buyer = %buyer_id,
        seller = %seller_id,
        "match executed"
    );

    Ok(MatchOutcome::Executed { quantity, price })
}
