//! Candidate selection and price-time ranking

use ledger::LedgerState;
use types::prelude::*;

/// Check whether a resting offer's price is compatible with an incoming
/// offer: a buyer pays at most their limit, a seller accepts at least theirs.
pub(crate) fn compatible(incoming_side: Side, incoming_price: Price, resting_price: Price) -> bool {
    match incoming_side {
        Side::Buy => resting_price <= incoming_price,
        Side::Sell => resting_price >= incoming_price,
    }
}

/// Compatible resting offers for `incoming`, ranked by price-time priority:
/// best price first (cheapest ask for a buyer, highest bid for a seller),
/// ties broken by earliest creation. Offers from the same player are never
/// candidates.
pub(crate) fn ranked_candidates(state: &LedgerState, incoming: &Offer) -> Vec<OfferId> {
    let mut candidates: Vec<&Offer> = state
        .active_offers_for_item(incoming.item_id, incoming.side.opposite())
        .into_iter()
        .filter(|o| o.player_id != incoming.player_id)
        .filter(|o| compatible(incoming.side, incoming.price_per_item, o.price_per_item))
        .collect();

    match incoming.side {
        Side::Buy => candidates.sort_by(|a, b| {
            a.price_per_item
                .cmp(&b.price_per_item)
                .then(a.created_at.cmp(&b.created_at))
        }),
        Side::Sell => candidates.sort_by(|a, b| {
            b.price_per_item
                .cmp(&a.price_per_item)
                .then(a.created_at.cmp(&b.created_at))
        }),
    }

    candidates.into_iter().map(|o| o.offer_id).collect()
}
