//! Payout Engine - tournament payout and calcutta settlement
//!
//! Turns a tournament configuration, final standings and accepted calcutta bids
//! into an exact, cent-level list of money movements. All amounts are integer
//! cents internally; payouts always sum to the pool they were drawn from.
//!
//! The engine is pure and synchronous. The only shared state is the
//! [`TemplateRegistry`], which is built once at startup and never mutated.

pub mod calculator;
pub mod calcutta;
pub mod distribution;
pub mod error;
pub mod money;
pub mod pools;
pub mod registry;
pub mod template;
pub mod types;

#[cfg(test)]
mod tests;

pub use calculator::PayoutCalculator;
pub use calcutta::{calcutta_settlement, settle_calcutta};
pub use distribution::distribute;
pub use error::{PayoutError, Result};
pub use money::{cents_to_amount, format_cents, round_to_cents};
pub use pools::compute_pools;
pub use registry::{builtin_templates, TemplateRegistry, TemplateRegistryBuilder};
pub use template::{PayoutTemplate, TemplateSlot};
pub use types::{
    CalcuttaBid, CalcuttaSettlement, PayoutEntry, PayoutResult, PayoutSource, Pools,
    SettlementRequest, Standing, TournamentConfig, TournamentSettlement,
};

/// Re-export so callers can build amounts without naming the crate
pub use rust_decimal::Decimal;
