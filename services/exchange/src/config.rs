//! Exchange configuration

use chrono::Duration;

/// Tunable parameters for the exchange service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Lifetime of an offer before the expiration sweep retires it.
    pub offer_ttl: Duration,
    /// Resting offers reported per side in market data.
    pub market_depth: usize,
    /// Look-back window for price/volume statistics.
    pub stats_window: Duration,
    /// Newest price points within the window that feed the statistics.
    pub stats_sample_cap: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            offer_ttl: Duration::hours(48),
            market_depth: 5,
            stats_window: Duration::days(7),
            stats_sample_cap: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExchangeConfig::default();
        assert_eq!(config.offer_ttl, Duration::hours(48));
        assert_eq!(config.market_depth, 5);
        assert_eq!(config.stats_window, Duration::days(7));
        assert_eq!(config.stats_sample_cap, 100);
    }
}
