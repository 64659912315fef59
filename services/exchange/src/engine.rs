//! Grand Exchange service
//!
//! An explicit service value holding the injected ledger, clock, and
//! configuration. One public method per caller-facing operation; every
//! mutation runs in a single ledger transaction.

use chrono::{DateTime, Utc};
use ledger::{Clock, Ledger};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::prelude::*;

use crate::config::ExchangeConfig;
use crate::matching;

/// The automated marketplace service.
#[derive(Debug, Clone)]
pub struct GrandExchange {
    ledger: Ledger,
    clock: Clock,
    config: ExchangeConfig,
}

/// Caller-facing view of an offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferSummary {
    pub offer_id: OfferId,
    pub item_name: String,
    pub side: Side,
    pub status: OfferStatus,
    pub quantity: u32,
    pub quantity_remaining: u32,
    pub price_per_item: Price,
    pub total_value: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OfferSummary {
    fn new(offer: &Offer, item_name: String) -> Self {
        Self {
            offer_id: offer.offer_id,
            item_name,
            side: offer.side,
            status: offer.status,
            quantity: offer.quantity,
            quantity_remaining: offer.quantity_remaining,
            price_per_item: offer.price_per_item,
            total_value: offer.total_value(),
            created_at: offer.created_at,
            expires_at: offer.expires_at,
        }
    }
}

impl GrandExchange {
    /// Create the service with default configuration.
    pub fn new(ledger: Ledger, clock: Clock) -> Self {
        Self::with_config(ledger, clock, ExchangeConfig::default())
    }

    pub fn with_config(ledger: Ledger, clock: Clock, config: ExchangeConfig) -> Self {
        Self {
            ledger,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub(crate) fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub(crate) fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Place a buy offer: bid for `quantity` items at up to `price_per_item`.
    pub fn place_buy_offer(
        &self,
        player_id: PlayerId,
        item_id: ItemId,
        quantity: u32,
        price_per_item: Decimal,
    ) -> Result<OfferSummary, MarketError> {
        self.place_offer(player_id, item_id, quantity, price_per_item, Side::Buy)
    }

    /// Place a sell offer: ask at least `price_per_item` for `quantity`
    /// items currently held.
    pub fn place_sell_offer(
        &self,
        player_id: PlayerId,
        item_id: ItemId,
        quantity: u32,
        price_per_item: Decimal,
    ) -> Result<OfferSummary, MarketError> {
        self.place_offer(player_id, item_id, quantity, price_per_item, Side::Sell)
    }

    fn place_offer(
        &self,
        player_id: PlayerId,
        item_id: ItemId,
        quantity: u32,
        price_per_item: Decimal,
        side: Side,
    ) -> Result<OfferSummary, MarketError> {
        if quantity == 0 {
            return Err(OfferError::InvalidQuantity.into());
        }
        let price = Price::new(price_per_item).ok_or(OfferError::InvalidPrice)?;

        let now = self.clock.now();
        let expires_at = now + self.config.offer_ttl;

        let summary = self.ledger.write(|state| {
            state.active_player(player_id).ok_or(OfferError::PlayerInactive)?;
            let item_name = state
                .tradeable_item(item_id)
                .ok_or(OfferError::ItemNotTradeable)?
                .name
                .clone();

            if side == Side::Sell {
                let available = state.inventory_quantity(player_id, item_id);
                if available < quantity {
                    return Err(OfferError::InsufficientToSell {
                        item: item_name,
                        needed: quantity,
                        available,
                    }
                    .into());
                }
            }

            let offer = Offer::new(player_id, item_id, side, quantity, price, now, expires_at);
            let summary = OfferSummary::new(&offer, item_name.clone());
            state.insert_offer(offer);

            let side_tag = match side {
                Side::Buy => "buy",
                Side::Sell => "sell",
            };
            state.append_audit(
                player_id,
                None,
                AuditAction::GeOfferPlaced,
                format!("Placed {side_tag} offer for {quantity} {item_name} at {price} each"),
                now,
            );

            Ok::<_, MarketError>(summary)
        })?;

        tracing::info!(
            player = %player_id,
            offer = %summary.offer_id,
            side = ?side,
            quantity,
            price = %price,
            "offer placed"
        );

        // Best-effort inline sweep: the offer is already committed, so a
        // sweep failure leaves it resting for a later attempt and must not
        // fail the placement.
        self.run_matching(summary.offer_id);

        Ok(summary)
    }

    fn run_matching(&self, offer_id: OfferId) {
        let now = self.clock.now();
        match self
            .ledger
            .write(|state| matching::run_sweep(state, offer_id, now))
        {
            Ok(0) => {}
            Ok(matches) => {
                tracing::info!(offer = %offer_id, matches, "matching sweep executed")
            }
            Err(error) => {
                tracing::error!(offer = %offer_id, %error, "matching sweep failed; offer left resting")
            }
        }
    }

    /// Cancel an active offer for its remaining quantity.
    ///
    /// Only the owning player may cancel, and only while the offer is
    /// active. Previously executed transactions are not reversed.
    pub fn cancel_offer(
        &self,
        offer_id: OfferId,
        player_id: PlayerId,
    ) -> Result<OfferSummary, MarketError> {
        let now = self.clock.now();
        let summary = self.ledger.write(|state| {
            match state.offer(offer_id) {
                Some(offer) if offer.player_id == player_id && offer.is_active() => {}
                _ => return Err(MarketError::from(OfferError::NotCancellable)),
            }

            let offer = state.offer_mut(offer_id).ok_or_else(|| StorageError::MissingRecord {
                kind: "offer",
                id: offer_id.to_string(),
            })?;
            offer.cancel(now);
            let offer = offer.clone();

            let item_name = state.require_item(offer.item_id)?.name.clone();
            state.append_audit(
                player_id,
                None,
                AuditAction::GeOfferCancelled,
                format!("Cancelled offer {offer_id}"),
                now,
            );

            Ok(OfferSummary::new(&offer, item_name))
        })?;

        tracing::info!(player = %player_id, offer = %offer_id, "offer cancelled");
        Ok(summary)
    }

    /// Retire every active offer whose lifetime has elapsed.
    ///
    /// Invoked by an external scheduler; the service owns no timer.
    pub fn expire_old_offers(&self) -> Result<usize, MarketError> {
        let now = self.clock.now();
        let expired = self.ledger.write(|state| {
            let ids = state.active_expired_ids(now);
            for offer_id in &ids {
                state
                    .offer_mut(*offer_id)
                    .ok_or_else(|| StorageError::MissingRecord {
                        kind: "offer",
                        id: offer_id.to_string(),
                    })?
                    .expire(now);
                tracing::debug!(offer = %offer_id, "offer expired");
            }
            Ok::<_, MarketError>(ids.len())
        })?;

        if expired > 0 {
            tracing::info!(count = expired, "expired offers swept");
        }
        Ok(expired)
    }

    /// A player's offers, newest first, optionally filtered by status.
    pub fn get_player_offers(
        &self,
        player_id: PlayerId,
        status: Option<OfferStatus>,
    ) -> Result<Vec<OfferSummary>, MarketError> {
        let summaries = self.ledger.read(|state| {
            state
                .offers_for_player(player_id, status)
                .into_iter()
                .map(|offer| {
                    let item_name = state.require_item(offer.item_id)?.name.clone();
                    Ok(OfferSummary::new(offer, item_name))
                })
                .collect::<Result<Vec<_>, StorageError>>()
        })?;
        Ok(summaries)
    }
}
