//! Matching sweep for newly placed offers
//!
//! Runs synchronously inside the placement call, in its own write
//! transaction: candidates are ranked by price-time priority and executed
//! one by one until the incoming offer is filled or the book is exhausted.

pub(crate) mod crossing;
pub(crate) mod executor;

use chrono::{DateTime, Utc};
use ledger::LedgerState;
use types::prelude::*;

use self::executor::MatchOutcome;

/// Match one newly placed offer against the opposite side of the book.
///
/// Returns the number of executed matches. A seller found short of
/// inventory is skipped when resting (their offer stays on the book for a
/// later attempt) and stops the sweep when it is the incoming offer's own
/// owner, since every remaining candidate would fail the same way.
pub fn run_sweep(
    state: &mut LedgerState,
    offer_id: OfferId,
    now: DateTime<Utc>,
) -> Result<u32, MarketError> {
    let Some(incoming) = state.offer(offer_id) else {
        return Ok(0);
    };
    if !incoming.is_active() {
        return Ok(0);
    }
    let incoming_side = incoming.side;
    let candidates = crossing::ranked_candidates(state, incoming);

    let mut matches = 0;
    for candidate_id in candidates {
        let remaining = state.offer(offer_id).map_or(0, |o| o.quantity_remaining);
        if remaining == 0 {
            break;
        }

        match executor::execute_match(state, offer_id, candidate_id, now)? {
            MatchOutcome::Executed { .. } => matches += 1,
            MatchOutcome::SellerShort {
                seller_id,
                required,
                available,
            } => {
                tracing::warn!(
                    offer = %candidate_id,
                    seller = %seller_id,
                    required,
                    available,
                    "seller short of inventory during sweep"
                );
                if incoming_side == Side::Sell {
                    break;
                }
            }
        }
    }

    Ok(matches)
}
