//! Price history points for market statistics

use crate::ids::ItemId;
use crate::money::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a price point was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Exchange match execution
    Ge,
    /// Direct player-to-player trade
    DirectTrade,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Ge => "ge",
            PriceSource::DirectTrade => "direct_trade",
        }
    }
}

/// One observed execution price with its traded volume. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub item_id: ItemId,
    pub price: Price,
    pub volume: u32,
    pub recorded_at: DateTime<Utc>,
    pub source: PriceSource,
}
