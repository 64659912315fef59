//! Direct trading service
//!
//! Two-party, multi-item barter sessions, independent of the exchange
//! book. A session starts pending, collects item promises from both
//! participants, and settles atomically when the receiver accepts. When
//! either side declines, the session ends without any inventory movement.
//!
//! Unlike exchange offers, pending trades never expire; they persist until
//! explicitly accepted or declined.

pub mod desk;

pub use desk::{PlayerRef, TradeDesk, TradeDetails, TradeItemDetails, TradeSummary};
