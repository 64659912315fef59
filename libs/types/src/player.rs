//! Player records

use crate::ids::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered player.
///
/// Usernames are unique across the ledger. Inactive players cannot place
/// offers or participate in trades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub username: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Create a new active player.
    pub fn new(username: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            player_id: PlayerId::new(),
            username: username.into(),
            active: true,
            created_at,
        }
    }

    /// Check whether the player may act in the marketplace.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new("durial321", Utc::now());
        assert!(player.is_active());
        assert_eq!(player.username, "durial321");
    }

    #[test]
    fn test_player_serialization() {
        let player = Player::new("zezima", Utc::now());
        let json = serde_json::to_string(&player).unwrap();
        let back: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(player, back);
    }
}
