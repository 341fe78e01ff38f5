use std::sync::Arc;

use tracing::info;

use crate::calcutta::calcutta_settlement;
use crate::distribution::distribute;
use crate::error::Result;
use crate::pools::compute_pools;
use crate::registry::TemplateRegistry;
use crate::types::{CalcuttaSettlement, SettlementRequest, TournamentSettlement};

/// Payout calculator bound to a frozen template registry
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct PayoutCalculator {
    registry: Arc<TemplateRegistry>,
}

impl PayoutCalculator {
    /// Create a new payout calculator
    pub fn new(registry: Arc<TemplateRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Compute pools, finisher payouts and the calcutta for one tournament
    pub fn settle(&self, request: &SettlementRequest) -> Result<TournamentSettlement> {
        let tournament = &request.tournament;
        let participant_count =
            request.participant_count.unwrap_or(request.standings.len() as i64);

        let pools = compute_pools(tournament, participant_count, &request.bids)?;

        let template = self.registry.resolve(&tournament.payout_template_key)?;
        let payouts = distribute(pools.payout_pool_cents, template, &request.standings)?;

        let calcutta = if tournament.calcutta_enabled {
            let template = self.registry.resolve(&tournament.calcutta_template_key)?;
            calcutta_settlement(tournament, template, &request.bids, &request.standings)?
        } else {
            CalcuttaSettlement::default()
        };

        info!(
            "Settled tournament {} for tenant {}: {} cents to {} finishers, {} cents calcutta net",
            tournament.id.map_or_else(|| tournament.name.clone(), |id| id.to_string()),
            tournament.tenant_id,
            payouts.total_cents(),
            payouts.len(),
            calcutta.net_pool_cents
        );

        Ok(TournamentSettlement { pools, payouts, calcutta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PayoutError;
    use crate::types::{CalcuttaBid, Standing, TournamentConfig};
    use rust_decimal::Decimal;

    fn calculator() -> PayoutCalculator {
        PayoutCalculator::new(Arc::new(TemplateRegistry::builtin().unwrap()))
    }

    fn request(tournament: TournamentConfig) -> SettlementRequest {
        SettlementRequest {
            tournament,
            participant_count: None,
            standings: vec![
                Standing::new("alice", 1),
                Standing::new("bob", 2),
                Standing::new("charlie", 3),
                Standing::new("dora", 4),
            ],
            bids: vec![
                CalcuttaBid::new("chris", "alice", Decimal::new(120, 0)),
                CalcuttaBid::new("dana", "bob", Decimal::new(80, 0)),
            ],
        }
    }

    #[test]
    fn test_settle_without_calcutta() {
        let settlement = calculator().settle(&request(TournamentConfig::default())).unwrap();

        // 4 x $20.00, green fees stay with the house
        assert_eq!(settlement.pools.payout_pool_cents, 8000);
        assert_eq!(settlement.pools.green_fees_cents, 2000);
        assert_eq!(settlement.payouts.total_cents(), 8000);
        assert_eq!(settlement.payouts.amount_for("alice"), 4000);
        assert_eq!(settlement.calcutta, CalcuttaSettlement::default());
    }

    #[test]
    fn test_settle_with_calcutta() {
        let tournament = TournamentConfig {
            calcutta_enabled: true,
            calcutta_house_vig_pct: Decimal::new(10, 2),
            ..TournamentConfig::default()
        };
        let settlement = calculator().settle(&request(tournament)).unwrap();

        assert_eq!(settlement.calcutta.gross_pool_cents, 20000);
        assert_eq!(settlement.calcutta.net_pool_cents, 18000);
        // top3 with charlie unowned: 0.6 and 0.3 renormalized
        assert_eq!(settlement.calcutta.payouts.amount_for("chris"), 12000);
        assert_eq!(settlement.calcutta.payouts.amount_for("dana"), 6000);
    }

    #[test]
    fn test_explicit_participant_count() {
        let mut req = request(TournamentConfig::default());
        req.participant_count = Some(16);

        let settlement = calculator().settle(&req).unwrap();
        assert_eq!(settlement.pools.payout_pool_cents, 32000);
        assert_eq!(settlement.payouts.total_cents(), 32000);
    }

    #[test]
    fn test_unknown_template_key() {
        let tournament = TournamentConfig {
            payout_template_key: "top99".to_string(),
            ..TournamentConfig::default()
        };
        assert_eq!(
            calculator().settle(&request(tournament)).unwrap_err(),
            PayoutError::UnknownTemplate { key: "top99".to_string() }
        );
    }

    #[test]
    fn test_unknown_calcutta_template_only_checked_when_enabled() {
        let tournament = TournamentConfig {
            calcutta_template_key: "missing".to_string(),
            ..TournamentConfig::default()
        };
        assert!(calculator().settle(&request(tournament.clone())).is_ok());

        let enabled = TournamentConfig { calcutta_enabled: true, ..tournament };
        assert!(matches!(
            calculator().settle(&request(enabled)),
            Err(PayoutError::UnknownTemplate { .. })
        ));
    }
}
