//! Calcutta Settlement - pays bidders according to how their players finished

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::distribution::distribute_to;
use crate::error::{PayoutError, Result};
use crate::money::{cents_to_amount, round_to_cents};
use crate::pools::calcutta_pool_cents;
use crate::template::PayoutTemplate;
use crate::types::{CalcuttaBid, CalcuttaSettlement, PayoutResult, PayoutSource, Standing, TournamentConfig};

/// Settle the calcutta and return the bidder payouts
pub fn settle_calcutta(
    config: &TournamentConfig,
    template: &PayoutTemplate,
    bids: &[CalcuttaBid],
    standings: &[Standing],
) -> Result<PayoutResult> {
    calcutta_settlement(config, template, bids, standings).map(|settlement| settlement.payouts)
}

/// Settle the calcutta, reporting gross pool, house vig and net pool alongside the payouts
///
/// Template places refer to the player's finish; the money goes to the bidder
/// owning that player. A finisher without an accepted bid forfeits its share,
/// which is redistributed across the owned finishers.
pub fn calcutta_settlement(
    config: &TournamentConfig,
    template: &PayoutTemplate,
    bids: &[CalcuttaBid],
    standings: &[Standing],
) -> Result<CalcuttaSettlement> {
    if !config.calcutta_enabled {
        return Ok(CalcuttaSettlement::default());
    }
    config.validate_calcutta()?;

    let owners = owners_by_player(bids)?;
    let gross_pool_cents = calcutta_pool_cents(bids)?;
    let house_vig_cents =
        round_to_cents(cents_to_amount(gross_pool_cents) * config.calcutta_house_vig_pct)?;
    let net_pool_cents = gross_pool_cents - house_vig_cents;

    for standing in standings {
        if !owners.contains_key(standing.participant_id.as_str()) {
            warn!(
                "No accepted calcutta bid for {} (rank {}), share goes back to the pool",
                standing.participant_id, standing.rank
            );
        }
    }

    let payouts = distribute_to(
        net_pool_cents,
        template,
        standings,
        PayoutSource::CalcuttaPayout,
        |standing| owners.get(standing.participant_id.as_str()).map(|bidder| bidder.to_string()),
    )?;

    debug!(
        "Calcutta settled: gross {} cents, vig {} cents, net {} cents to {} bidders",
        gross_pool_cents,
        house_vig_cents,
        net_pool_cents,
        payouts.totals_by_recipient().len()
    );

    Ok(CalcuttaSettlement { gross_pool_cents, house_vig_cents, net_pool_cents, payouts })
}

/// Owner of record for each player. At most one accepted bid per player.
fn owners_by_player(bids: &[CalcuttaBid]) -> Result<BTreeMap<&str, &str>> {
    let mut owners = BTreeMap::new();
    for bid in bids {
        if bid.bidder_id.trim().is_empty() || bid.player_participant_id.trim().is_empty() {
            return Err(PayoutError::InvalidBids {
                message: "bid is missing a bidder or player id".to_string(),
            });
        }
        if owners.insert(bid.player_participant_id.as_str(), bid.bidder_id.as_str()).is_some() {
            return Err(PayoutError::InvalidBids {
                message: format!("more than one accepted bid on {}", bid.player_participant_id),
            });
        }
    }
    Ok(owners)
}
