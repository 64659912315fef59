//! Read-side market data
//!
//! Aggregates the current book and recent execution history for an item.
//! Pure queries: nothing here mutates the ledger.

use chrono::Duration;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use types::money::MONEY_SCALE;
use types::prelude::*;

use crate::engine::GrandExchange;

/// One resting offer as shown in market depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub price: Price,
    pub quantity: u32,
}

/// Aggregated market view for a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMarketData {
    pub item_id: ItemId,
    pub item_name: String,
    /// Price of the most recent execution within the statistics window.
    pub latest_price: Option<Price>,
    /// Mean execution price over the sampled window, at money scale.
    pub average_price: Option<Decimal>,
    /// Total traded volume over the sampled window.
    pub total_volume: u64,
    pub highest_buy_offer: Option<Price>,
    pub lowest_sell_offer: Option<Price>,
    /// Best resting bids, highest price first.
    pub buy_offers: Vec<MarketQuote>,
    /// Best resting asks, lowest price first.
    pub sell_offers: Vec<MarketQuote>,
}

impl GrandExchange {
    /// Current market view for an item: best prices, depth, and recent
    /// price/volume statistics.
    pub fn get_item_market_data(&self, item_id: ItemId) -> Result<ItemMarketData, MarketError> {
        let config = *self.config();
        let since = self.clock().now() - config.stats_window;

        self.ledger().read(|state| {
            let item_name = state
                .item(item_id)
                .ok_or(OfferError::ItemNotFound {
                    item_id: item_id.to_string(),
                })?
                .name
                .clone();

            let mut bids = state.active_offers_for_item(item_id, Side::Buy);
            bids.sort_by(|a, b| {
                b.price_per_item
                    .cmp(&a.price_per_item)
                    .then(a.created_at.cmp(&b.created_at))
            });
            let mut asks = state.active_offers_for_item(item_id, Side::Sell);
            asks.sort_by(|a, b| {
                a.price_per_item
                    .cmp(&b.price_per_item)
                    .then(a.created_at.cmp(&b.created_at))
            });

            let quote = |offer: &&Offer| MarketQuote {
                price: offer.price_per_item,
                quantity: offer.quantity_remaining,
            };

            // Statistics run over the newest points within the window,
            // capped to keep the aggregation bounded on busy items.
            let points = state.price_points_for_item(item_id, since);
            let sample: Vec<&PricePoint> = points
                .iter()
                .rev()
                .take(config.stats_sample_cap)
                .cloned()
                .collect();

            let latest_price = sample.first().map(|p| p.price);
            let average_price = if sample.is_empty() {
                None
            } else {
                let sum: Decimal = sample.iter().map(|p| p.price.as_decimal()).sum();
                Some((sum / Decimal::from(sample.len() as u64)).round_dp_with_strategy(
                    MONEY_SCALE,
                    RoundingStrategy::MidpointAwayFromZero,
                ))
            };
            let total_volume: u64 = sample.iter().map(|p| u64::from(p.volume)).sum();

            Ok(ItemMarketData {
                item_id,
                item_name,
                latest_price,
                average_price,
                total_volume,
                highest_buy_offer: bids.first().map(|o| o.price_per_item),
                lowest_sell_offer: asks.first().map(|o| o.price_per_item),
                buy_offers: bids.iter().take(config.market_depth).map(quote).collect(),
                sell_offers: asks.iter().take(config.market_depth).map(quote).collect(),
            })
        })
    }

    /// Price history for an item over the last `days` days, oldest first.
    pub fn get_price_history(&self, item_id: ItemId, days: i64) -> Vec<PricePoint> {
        let since = self.clock().now() - Duration::days(days);
        self.ledger().read(|state| {
            state
                .price_points_for_item(item_id, since)
                .into_iter()
                .cloned()
                .collect()
        })
    }
}
