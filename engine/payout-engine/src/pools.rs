//! Pool Calculator - gross pools from tournament configuration and bids

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{PayoutError, Result};
use crate::money::{round_to_cents, scaled_cents};
use crate::types::{CalcuttaBid, Pools, TournamentConfig};

/// Compute the payout and calcutta pools for a tournament
///
/// Green fees are house revenue: they are reported but never enter the payout pool.
pub fn compute_pools(
    config: &TournamentConfig,
    participant_count: i64,
    calcutta_bids: &[CalcuttaBid],
) -> Result<Pools> {
    config.validate_fees()?;
    if participant_count < 0 {
        return Err(PayoutError::invalid_config(format!(
            "participant_count must not be negative, got {participant_count}"
        )));
    }

    let gross_entry_cents = scaled_cents(config.entry_fee, participant_count)?;
    let sponsor_add_cents = round_to_cents(config.sponsor_add)?;
    let green_fees_cents = scaled_cents(config.green_fee, participant_count)?;
    let payout_pool_cents = gross_entry_cents
        .checked_add(sponsor_add_cents)
        .ok_or(PayoutError::AmountOutOfRange(config.sponsor_add))?;

    let calcutta_pool_cents = if config.calcutta_enabled {
        calcutta_pool_cents(calcutta_bids)?
    } else {
        0
    };

    debug!(
        "Pools for {} entrants: payout {} cents (entry {}, sponsor {}), calcutta {} cents, green fees {} cents",
        participant_count,
        payout_pool_cents,
        gross_entry_cents,
        sponsor_add_cents,
        calcutta_pool_cents,
        green_fees_cents
    );

    Ok(Pools {
        payout_pool_cents,
        calcutta_pool_cents,
        gross_entry_cents,
        sponsor_add_cents,
        green_fees_cents,
    })
}

/// Sum of accepted bids in cents, each bid rounded at the boundary
pub fn calcutta_pool_cents(bids: &[CalcuttaBid]) -> Result<i64> {
    let mut total: i64 = 0;
    for bid in bids {
        if bid.amount < Decimal::ZERO {
            return Err(PayoutError::invalid_config(format!(
                "bid by {} on {} is negative: {}",
                bid.bidder_id, bid.player_participant_id, bid.amount
            )));
        }
        total = total
            .checked_add(round_to_cents(bid.amount)?)
            .ok_or(PayoutError::AmountOutOfRange(bid.amount))?;
    }
    Ok(total)
}
