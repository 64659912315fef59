//! Unique identifier types for marketplace entities
//!
//! All IDs use UUID v7 so identifiers sort in creation order, which keeps
//! chronological queries and audit reconstruction cheap.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new identifier with the current timestamp embedded.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Create from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player.
    PlayerId
}

define_id! {
    /// Unique identifier for an item definition.
    ItemId
}

define_id! {
    /// Unique identifier for an exchange offer.
    OfferId
}

define_id! {
    /// Unique identifier for a direct trade session.
    TradeId
}

define_id! {
    /// Unique identifier for an executed exchange transaction.
    TransactionId
}
