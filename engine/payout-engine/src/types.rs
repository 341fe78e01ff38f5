//! Type definitions for tournament payouts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayoutError, Result};

/// Tournament configuration as persisted by the service layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    pub id: Option<i64>,
    pub tenant_id: String,
    pub venue_id: String,
    pub name: String,
    pub game: String,
    pub entry_fee: Decimal,
    /// House revenue per entrant, never paid out
    pub green_fee: Decimal,
    pub sponsor_add: Decimal,
    pub payout_template_key: String,
    pub calcutta_enabled: bool,
    /// Fraction in [0, 1), only read when the calcutta is enabled
    pub calcutta_house_vig_pct: Decimal,
    pub calcutta_template_key: String,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            id: None,
            tenant_id: String::new(),
            venue_id: String::new(),
            name: String::new(),
            game: "8-ball".to_string(),
            entry_fee: Decimal::new(2000, 2), // $20.00
            green_fee: Decimal::new(500, 2),  // $5.00
            sponsor_add: Decimal::ZERO,
            payout_template_key: "top4".to_string(),
            calcutta_enabled: false,
            calcutta_house_vig_pct: Decimal::ZERO,
            calcutta_template_key: "top3".to_string(),
        }
    }
}

impl TournamentConfig {
    /// Reject negative fees and sponsor money
    pub fn validate_fees(&self) -> Result<()> {
        for (field, value) in [
            ("entry_fee", self.entry_fee),
            ("green_fee", self.green_fee),
            ("sponsor_add", self.sponsor_add),
        ] {
            if value < Decimal::ZERO {
                return Err(PayoutError::invalid_config(format!(
                    "{field} must not be negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Reject a house vig outside [0, 1). Callers skip this when the calcutta is disabled.
    pub fn validate_calcutta(&self) -> Result<()> {
        let vig = self.calcutta_house_vig_pct;
        if vig < Decimal::ZERO || vig >= Decimal::ONE {
            return Err(PayoutError::invalid_config(format!(
                "calcutta_house_vig_pct must be in [0, 1), got {vig}"
            )));
        }
        Ok(())
    }
}

/// Final placement of one participant; rank 1 is best, equal ranks are ties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub participant_id: String,
    pub rank: u32,
}

impl Standing {
    pub fn new(participant_id: impl Into<String>, rank: u32) -> Self {
        Self { participant_id: participant_id.into(), rank }
    }
}

/// Accepted calcutta bid: the bidder owns the player's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcuttaBid {
    pub bidder_id: String,
    pub player_participant_id: String,
    pub amount: Decimal,
}

impl CalcuttaBid {
    pub fn new(
        bidder_id: impl Into<String>,
        player_participant_id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            bidder_id: bidder_id.into(),
            player_participant_id: player_participant_id.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutSource {
    StandingsPayout,
    CalcuttaPayout,
}

/// A single money movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutEntry {
    /// Who gets paid: the finisher, or the bidder owning the finisher
    pub recipient_id: String,
    /// Finisher whose placement earned the amount
    pub participant_id: String,
    pub rank: u32,
    pub amount_cents: i64,
    pub source: PayoutSource,
}

/// Ordered payouts of one calculation, best place first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutResult {
    pub entries: Vec<PayoutEntry>,
}

impl PayoutResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PayoutEntry> {
        self.entries.iter()
    }

    /// Sum of all payouts in cents
    pub fn total_cents(&self) -> i64 {
        self.entries.iter().map(|e| e.amount_cents).sum()
    }

    /// Amount paid to a recipient across all entries
    pub fn amount_for(&self, recipient_id: &str) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.recipient_id == recipient_id)
            .map(|e| e.amount_cents)
            .sum()
    }

    /// Per-recipient totals in order of first appearance
    pub fn totals_by_recipient(&self) -> Vec<(String, i64)> {
        let mut totals: Vec<(String, i64)> = Vec::new();
        for entry in &self.entries {
            match totals.iter_mut().find(|(id, _)| *id == entry.recipient_id) {
                Some((_, amount)) => *amount += entry.amount_cents,
                None => totals.push((entry.recipient_id.clone(), entry.amount_cents)),
            }
        }
        totals
    }
}

/// Money collected for a tournament, in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pools {
    /// Entry fees plus sponsor add, paid to finishers
    pub payout_pool_cents: i64,
    /// Sum of accepted calcutta bids before vig
    pub calcutta_pool_cents: i64,
    pub gross_entry_cents: i64,
    pub sponsor_add_cents: i64,
    /// House revenue, not part of any pool
    pub green_fees_cents: i64,
}

/// Calcutta pot breakdown together with the bidder payouts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcuttaSettlement {
    pub gross_pool_cents: i64,
    pub house_vig_cents: i64,
    pub net_pool_cents: i64,
    pub payouts: PayoutResult,
}

/// Everything needed to settle one tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub tournament: TournamentConfig,
    /// Paid entrants; defaults to the number of standings
    #[serde(default)]
    pub participant_count: Option<i64>,
    pub standings: Vec<Standing>,
    #[serde(default)]
    pub bids: Vec<CalcuttaBid>,
}

/// Complete money distribution for one tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSettlement {
    pub pools: Pools,
    pub payouts: PayoutResult,
    pub calcutta: CalcuttaSettlement,
}
