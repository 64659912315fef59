//! Error taxonomy for the marketplace engine
//!
//! Validation errors are raised before any state changes; `StorageError`
//! covers unexpected store failures that roll the in-flight operation back.

use thiserror::Error;

/// Top-level marketplace error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Invalid offer: {0}")]
    InvalidOffer(#[from] OfferError),

    #[error("Invalid trade: {0}")]
    InvalidTrade(#[from] TradeError),

    #[error(transparent)]
    InsufficientItems(#[from] InsufficientItems),

    /// Reserved for future funds checks; never raised by current behavior.
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Offer validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OfferError {
    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("price must be positive")]
    InvalidPrice,

    #[error("player not found or inactive")]
    PlayerInactive,

    #[error("item not found or not tradeable")]
    ItemNotTradeable,

    #[error("item not found: {item_id}")]
    ItemNotFound { item_id: String },

    #[error("insufficient {item} to sell (need {needed}, have {available})")]
    InsufficientToSell {
        item: String,
        needed: u32,
        available: u32,
    },

    #[error("offer not found or cannot be cancelled")]
    NotCancellable,
}

/// Trade session validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("cannot trade with yourself")]
    SelfTrade,

    #[error("initiator not found or inactive")]
    InitiatorInactive,

    #[error("receiver not found or inactive")]
    ReceiverInactive,

    #[error("pending trade already exists between these players")]
    PendingAlreadyExists,

    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("trade not found: {trade_id}")]
    NotFound { trade_id: String },

    #[error("trade not found or not pending")]
    NotPending,

    #[error("player not part of this trade")]
    NotParticipant,

    #[error("only the receiver can accept the trade")]
    NotReceiver,

    #[error("item not found or not tradeable")]
    ItemNotTradeable,

    #[error("item already added to trade")]
    DuplicateItem,

    #[error("no items in trade")]
    EmptyTrade,
}

/// Raised when a player no longer holds enough of an item for a trade.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("insufficient {item} (need {needed}, have {available})")]
pub struct InsufficientItems {
    pub item: String,
    pub needed: u32,
    pub available: u32,
}

/// Unexpected store failures.
///
/// These indicate referential-integrity problems or constraint violations
/// inside the ledger, not caller mistakes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("record not found: {kind} {id}")]
    MissingRecord { kind: &'static str, id: String },

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("inventory underflow: tried to remove {requested} with {available} held")]
    InventoryUnderflow { requested: u32, available: u32 },
}
