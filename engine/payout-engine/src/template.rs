//! Payout templates: how a pool splits by finishing place

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayoutError, Result};

/// Upper bound on the places a single template may pay
pub const MAX_PAID_PLACES: u32 = 1024;

/// Allowed deviation of a template's share total from 1
pub fn share_tolerance() -> Decimal {
    Decimal::new(1, 6)
}

/// One template slot. `through` turns the slot into the inclusive range
/// `place..=through`, whose share is split equally across its places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSlot {
    pub place: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<u32>,
    pub share: Decimal,
}

impl TemplateSlot {
    pub fn single(place: u32, share: Decimal) -> Self {
        Self { place, through: None, share }
    }

    pub fn range(place: u32, through: u32, share: Decimal) -> Self {
        Self { place, through: Some(through), share }
    }

    pub fn last_place(&self) -> u32 {
        self.through.unwrap_or(self.place)
    }
}

/// A named, ordered list of slots whose shares sum to 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutTemplate {
    pub key: String,
    pub slots: Vec<TemplateSlot>,
}

impl PayoutTemplate {
    pub fn new(key: impl Into<String>, slots: Vec<TemplateSlot>) -> Self {
        Self { key: key.into(), slots }
    }

    /// Check slot shape, overlaps and the share total
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(PayoutError::malformed(&self.key, "template key is empty"));
        }
        if self.slots.is_empty() {
            return Err(PayoutError::malformed(&self.key, "template has no slots"));
        }

        let mut covered: Vec<(u32, u32)> = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let last = slot.last_place();
            if slot.place == 0 {
                return Err(PayoutError::malformed(&self.key, "places start at 1"));
            }
            if last < slot.place {
                return Err(PayoutError::malformed(
                    &self.key,
                    format!("slot {}..={} is an empty range", slot.place, last),
                ));
            }
            if last > MAX_PAID_PLACES {
                return Err(PayoutError::malformed(
                    &self.key,
                    format!("slot ends at place {last}, limit is {MAX_PAID_PLACES}"),
                ));
            }
            if slot.share < Decimal::ZERO {
                return Err(PayoutError::malformed(
                    &self.key,
                    format!("slot {} has negative share {}", slot.place, slot.share),
                ));
            }
            if slot.share > Decimal::ONE + share_tolerance() {
                return Err(PayoutError::malformed(
                    &self.key,
                    format!("slot {} share {} exceeds 1", slot.place, slot.share),
                ));
            }
            if let Some((first, end)) =
                covered.iter().find(|(first, end)| slot.place <= *end && *first <= last)
            {
                return Err(PayoutError::malformed(
                    &self.key,
                    format!("slot {}..={} overlaps slot {}..={}", slot.place, last, first, end),
                ));
            }
            covered.push((slot.place, last));
        }

        let total = self
            .share_total()
            .ok_or_else(|| PayoutError::malformed(&self.key, "share total overflows"))?;
        if (total - Decimal::ONE).abs() > share_tolerance() {
            return Err(PayoutError::malformed(
                &self.key,
                format!("shares sum to {total}, expected 1"),
            ));
        }
        Ok(())
    }

    /// Sum of all slot shares, `None` on overflow
    pub fn share_total(&self) -> Option<Decimal> {
        self.slots.iter().try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.share))
    }

    /// Highest place that can receive money
    pub fn paid_places(&self) -> u32 {
        self.slots.iter().map(TemplateSlot::last_place).max().unwrap_or(0).min(MAX_PAID_PLACES)
    }

    /// Share of each place, index 0 is first place. Gaps are zero.
    ///
    /// Slots outside `1..=MAX_PAID_PLACES` are ignored; `validate` rejects them.
    pub fn place_shares(&self) -> Vec<Decimal> {
        let mut shares = vec![Decimal::ZERO; self.paid_places() as usize];
        for slot in &self.slots {
            let last = slot.last_place();
            if slot.place == 0 || last < slot.place || last > MAX_PAID_PLACES {
                continue;
            }
            let width = Decimal::from(last - slot.place + 1);
            let per_place = slot.share / width;
            for place in slot.place..=last {
                shares[(place - 1) as usize] = per_place;
            }
        }
        shares
    }
}
