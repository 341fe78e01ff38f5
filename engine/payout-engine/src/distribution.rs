//! Distribution Engine - splits a pool across finishers by template
//!
//! Amounts are computed with largest-remainder allocation so the payouts always
//! sum to the pool exactly. Ties merge the places the tied finishers occupy and
//! split the merged amount equally; places nobody occupies are dropped and their
//! share flows proportionally to the occupied ones.

use std::collections::BTreeSet;

use rust_decimal::{prelude::ToPrimitive, Decimal};
use tracing::debug;

use crate::error::{PayoutError, Result};
use crate::template::PayoutTemplate;
use crate::types::{PayoutEntry, PayoutResult, PayoutSource, Standing};

/// Finishers sharing one rank
#[derive(Debug)]
struct PlaceGroup<'a> {
    rank: u32,
    /// Places `first_place..first_place + members.len()` belong to the group
    first_place: usize,
    members: Vec<&'a Standing>,
}

impl PlaceGroup<'_> {
    fn merged_share(&self, place_shares: &[Decimal]) -> Decimal {
        place_shares
            .iter()
            .skip(self.first_place - 1)
            .take(self.members.len())
            .copied()
            .sum()
    }
}

/// Validate standings and group them by rank, best first.
///
/// Sorting is stable, so tied finishers keep their input order.
fn group_standings(standings: &[Standing]) -> Result<Vec<PlaceGroup<'_>>> {
    let mut seen = BTreeSet::new();
    for standing in standings {
        if standing.participant_id.trim().is_empty() {
            return Err(PayoutError::InvalidStandings {
                message: "participant id is empty".to_string(),
            });
        }
        if standing.rank == 0 {
            return Err(PayoutError::InvalidStandings {
                message: format!("{} has rank 0, ranks start at 1", standing.participant_id),
            });
        }
        if !seen.insert(standing.participant_id.as_str()) {
            return Err(PayoutError::InvalidStandings {
                message: format!("{} appears more than once", standing.participant_id),
            });
        }
    }

    let mut ordered: Vec<&Standing> = standings.iter().collect();
    ordered.sort_by_key(|s| s.rank);

    let mut groups: Vec<PlaceGroup<'_>> = Vec::new();
    for (idx, standing) in ordered.into_iter().enumerate() {
        let same_rank = groups.last().is_some_and(|g| g.rank == standing.rank);
        match groups.last_mut() {
            Some(group) if same_rank => group.members.push(standing),
            _ => groups.push(PlaceGroup {
                rank: standing.rank,
                first_place: idx + 1,
                members: vec![standing],
            }),
        }
    }
    Ok(groups)
}

/// Split `total` cents proportionally to `weights`.
///
/// Every positive weight gets the floor of its exact share; the leftover cents
/// go one at a time by descending remainder, lower index first on equal
/// remainders. Non-positive weights receive nothing.
pub(crate) fn allocate(total: i64, weights: &[Decimal]) -> Vec<i64> {
    let mut allocations = vec![0i64; weights.len()];
    let weight_sum: Decimal = weights.iter().copied().filter(|w| *w > Decimal::ZERO).sum();
    if total <= 0 || weight_sum.is_zero() {
        return allocations;
    }

    let total_dec = Decimal::from(total);
    let mut distributed = 0i64;
    let mut remainders: Vec<(usize, Decimal)> = Vec::with_capacity(weights.len());
    for (idx, weight) in weights.iter().copied().enumerate() {
        if weight <= Decimal::ZERO {
            continue;
        }
        let numerator = total_dec * weight;
        let mut base = (numerator / weight_sum).floor();
        if base * weight_sum > numerator {
            base -= Decimal::ONE;
        }
        let cents = base.to_i64().unwrap_or(0);
        allocations[idx] = cents;
        distributed += cents;
        remainders.push((idx, numerator - base * weight_sum));
    }

    let leftover = usize::try_from(total - distributed).unwrap_or(0);
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (idx, _) in remainders.iter().cycle().take(leftover) {
        allocations[*idx] += 1;
    }
    allocations
}

/// Split `total` cents evenly across `count` members, the odd cents going to
/// the earliest members.
pub(crate) fn allocate_equal(total: i64, count: usize) -> Vec<i64> {
    let Ok(divisor) = i64::try_from(count) else {
        return vec![0; count];
    };
    if total <= 0 || divisor == 0 {
        return vec![0; count];
    }
    let base = total / divisor;
    let extra = total % divisor;
    (0..divisor).map(|idx| base + i64::from(idx < extra)).collect()
}

/// Distribute a pool to finishers according to a template
pub fn distribute(
    pool_cents: i64,
    template: &PayoutTemplate,
    standings: &[Standing],
) -> Result<PayoutResult> {
    distribute_to(pool_cents, template, standings, PayoutSource::StandingsPayout, |standing| {
        Some(standing.participant_id.clone())
    })
}

/// Distribute a pool to whoever `payee` names for each finisher.
///
/// Finishers without a payee forfeit their part of the template; it is
/// redistributed across the eligible places like an unoccupied place.
/// The template is validated first, so a hand-built one fails with
/// `MalformedTemplate` instead of settling.
pub(crate) fn distribute_to<F>(
    pool_cents: i64,
    template: &PayoutTemplate,
    standings: &[Standing],
    source: PayoutSource,
    payee: F,
) -> Result<PayoutResult>
where
    F: Fn(&Standing) -> Option<String>,
{
    if pool_cents < 0 {
        return Err(PayoutError::invalid_config(format!(
            "pool must not be negative, got {pool_cents} cents"
        )));
    }
    template.validate()?;
    if standings.is_empty() {
        if pool_cents > 0 {
            return Err(PayoutError::EmptyStandings { pool_cents });
        }
        return Ok(PayoutResult::default());
    }

    let groups = group_standings(standings)?;
    let place_shares = template.place_shares();

    let mut payees: Vec<Vec<(&Standing, String)>> = Vec::with_capacity(groups.len());
    let mut weights: Vec<Decimal> = Vec::with_capacity(groups.len());
    for group in &groups {
        let eligible: Vec<(&Standing, String)> = group
            .members
            .iter()
            .filter_map(|&member| payee(member).map(|recipient| (member, recipient)))
            .collect();
        let weight = if eligible.is_empty() {
            Decimal::ZERO
        } else {
            group.merged_share(&place_shares) * Decimal::from(eligible.len())
                / Decimal::from(group.members.len())
        };
        weights.push(weight);
        payees.push(eligible);
    }

    if weights.iter().all(|w| w.is_zero()) {
        if pool_cents > 0 {
            return Err(PayoutError::NoEligibleSlots { key: template.key.clone() });
        }
        return Ok(PayoutResult::default());
    }

    let group_amounts = allocate(pool_cents, &weights);

    let mut entries = Vec::new();
    for (idx, group) in groups.iter().enumerate() {
        if weights[idx].is_zero() {
            continue;
        }
        let eligible = &payees[idx];
        let split = allocate_equal(group_amounts[idx], eligible.len());
        for ((member, recipient), amount_cents) in eligible.iter().zip(split) {
            entries.push(PayoutEntry {
                recipient_id: recipient.clone(),
                participant_id: member.participant_id.clone(),
                rank: group.rank,
                amount_cents,
                source,
            });
        }
    }

    debug!(
        "Distributed {} cents with template {} across {} finishers ({} paid)",
        pool_cents,
        template.key,
        standings.len(),
        entries.len()
    );

    Ok(PayoutResult { entries })
}
