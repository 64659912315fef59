//! Exchange offer lifecycle types

use crate::ids::{ItemId, OfferId, PlayerId};
use crate::money::Price;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Offer side (buyer or seller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy offer (bid)
    Buy,
    /// Sell offer (ask)
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Offer status.
///
/// `Active` is the only non-terminal state: an offer is active iff it still
/// has remaining quantity and has not been cancelled or expired. Once an
/// offer leaves `Active` it never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OfferStatus {
    /// Resting on the book, eligible for matching
    Active,
    /// Fully filled (terminal)
    Completed,
    /// Withdrawn by the owner (terminal)
    Cancelled,
    /// Lifetime elapsed before a full fill (terminal)
    Expired,
}

impl OfferStatus {
    /// Check if the status is terminal (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OfferStatus::Active)
    }
}

/// A standing buy or sell offer for a fixed item at a fixed price.
///
/// Offers are partially fillable: `quantity_remaining` counts down from
/// `quantity` as matches execute, and the offer completes when it reaches
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: OfferId,
    pub player_id: PlayerId,
    pub item_id: ItemId,
    pub side: Side,
    pub quantity: u32,
    pub quantity_remaining: u32,
    pub price_per_item: Price,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl Offer {
    /// Create a new active offer with full remaining quantity.
    ///
    /// # Panics
    /// Panics if `quantity` is zero.
    pub fn new(
        player_id: PlayerId,
        item_id: ItemId,
        side: Side,
        quantity: u32,
        price_per_item: Price,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        assert!(quantity > 0, "Offer quantity must be positive");
        Self {
            offer_id: OfferId::new(),
            player_id,
            item_id,
            side,
            quantity,
            quantity_remaining: quantity,
            price_per_item,
            status: OfferStatus::Active,
            created_at,
            completed_at: None,
            expires_at,
        }
    }

    /// Check if the offer is resting on the book.
    pub fn is_active(&self) -> bool {
        matches!(self.status, OfferStatus::Active)
    }

    /// Check whether the offer's lifetime has elapsed as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Total value of the offer at its original quantity.
    pub fn total_value(&self) -> Decimal {
        self.price_per_item.total(self.quantity)
    }

    /// Apply a fill of `quantity` units, completing the offer when the
    /// remainder reaches zero.
    ///
    /// # Panics
    /// Panics if the offer is not active or the fill exceeds the remainder.
    pub fn fill(&mut self, quantity: u32, now: DateTime<Utc>) {
        assert!(self.is_active(), "Cannot fill a non-active offer");
        assert!(
            quantity > 0 && quantity <= self.quantity_remaining,
            "Fill would exceed remaining quantity"
        );

        self.quantity_remaining -= quantity;
        if self.quantity_remaining == 0 {
            self.status = OfferStatus::Completed;
            self.completed_at = Some(now);
        }

        debug_assert!(self.check_invariant());
    }

    /// Cancel the offer for its remaining quantity.
    ///
    /// # Panics
    /// Panics if the offer is already terminal.
    pub fn cancel(&mut self, now: DateTime<Utc>) {
        assert!(self.is_active(), "Cannot cancel a terminal offer");
        self.status = OfferStatus::Cancelled;
        self.completed_at = Some(now);
    }

    /// Expire the offer.
    ///
    /// # Panics
    /// Panics if the offer is already terminal.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        assert!(self.is_active(), "Cannot expire a terminal offer");
        self.status = OfferStatus::Expired;
        self.completed_at = Some(now);
    }

    /// Check the remaining-quantity/status invariant.
    pub fn check_invariant(&self) -> bool {
        self.quantity_remaining <= self.quantity
            && match self.status {
                OfferStatus::Active => self.quantity_remaining > 0,
                OfferStatus::Completed => {
                    self.quantity_remaining == 0 && self.completed_at.is_some()
                }
                OfferStatus::Cancelled | OfferStatus::Expired => self.completed_at.is_some(),
            }
    }
}
