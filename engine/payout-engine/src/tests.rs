//! End-to-end scenarios and property checks across the engine

use rust_decimal::Decimal;

use crate::{
    calcutta_settlement, compute_pools, distribute, CalcuttaBid, PayoutTemplate, Standing,
    TemplateRegistry, TemplateSlot, TournamentConfig,
};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn registry() -> TemplateRegistry {
    TemplateRegistry::builtin().unwrap()
}

fn field(size: usize) -> Vec<Standing> {
    (1..=size).map(|i| Standing::new(format!("p{i}"), i as u32)).collect()
}

/// Deterministic tie patterns: every `tie_every`-th finisher ties with the one before
fn tied_field(size: usize, tie_every: usize) -> Vec<Standing> {
    let mut standings = Vec::with_capacity(size);
    let mut rank = 1u32;
    for i in 1..=size {
        if i > 1 && (tie_every == 0 || i % tie_every != 0) {
            rank = i as u32;
        }
        standings.push(Standing::new(format!("p{i}"), rank));
    }
    standings
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_full_top4_field() {
        let template = registry().resolve("top4").unwrap().clone();
        let result = distribute(10000, &template, &field(4)).unwrap();

        let amounts: Vec<i64> = result.iter().map(|e| e.amount_cents).collect();
        assert_eq!(amounts, vec![5000, 3000, 1250, 750]);
        assert_eq!(result.total_cents(), 10000);
    }

    #[test]
    fn test_two_finishers_on_top4() {
        let template = registry().resolve("top4").unwrap().clone();
        let result = distribute(10000, &template, &field(2)).unwrap();

        let amounts: Vec<i64> = result.iter().map(|e| e.amount_cents).collect();
        assert_eq!(amounts, vec![6250, 3750]);
    }

    #[test]
    fn test_calcutta_net_pool_conserved() {
        let registry = registry();
        let template = registry.resolve("top3").unwrap();
        let config = TournamentConfig {
            calcutta_enabled: true,
            calcutta_house_vig_pct: dec("0.10"),
            ..TournamentConfig::default()
        };
        let bids: Vec<CalcuttaBid> = (1..=5)
            .map(|i| CalcuttaBid::new(format!("owner{i}"), format!("p{i}"), dec("100")))
            .collect();

        let settlement = calcutta_settlement(&config, template, &bids, &field(5)).unwrap();

        assert_eq!(settlement.gross_pool_cents, 50000);
        assert_eq!(settlement.net_pool_cents, 45000);
        assert_eq!(settlement.payouts.total_cents(), 45000);
    }

    #[test]
    fn test_pool_excludes_green_fee() {
        let config = TournamentConfig {
            entry_fee: dec("20.00"),
            green_fee: dec("5.00"),
            sponsor_add: dec("100.00"),
            ..TournamentConfig::default()
        };
        let pools = compute_pools(&config, 10, &[]).unwrap();
        assert_eq!(pools.payout_pool_cents, 30000);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    const POOLS: [i64; 9] = [0, 1, 2, 3, 7, 99, 1001, 12345, 9_999_999];

    fn templates() -> Vec<PayoutTemplate> {
        let mut templates: Vec<PayoutTemplate> = registry().templates().cloned().collect();
        let third = Decimal::ONE / Decimal::from(3);
        templates.push(PayoutTemplate::new(
            "thirds",
            vec![
                TemplateSlot::single(1, third),
                TemplateSlot::single(2, third),
                TemplateSlot::single(3, third),
            ],
        ));
        templates.push(PayoutTemplate::new(
            "wide",
            vec![TemplateSlot::single(1, dec("0.4")), TemplateSlot::range(2, 11, dec("0.6"))],
        ));
        templates
    }

    #[test]
    fn test_conservation_and_non_negativity() {
        for template in templates() {
            template.validate().unwrap();
            for &pool in &POOLS {
                for size in 1..=12 {
                    for tie_every in [0, 2, 3] {
                        let standings = tied_field(size, tie_every);
                        let result = distribute(pool, &template, &standings).unwrap();

                        assert_eq!(
                            result.total_cents(),
                            pool,
                            "template {} pool {} size {} ties {}",
                            template.key,
                            pool,
                            size,
                            tie_every
                        );
                        assert!(result.iter().all(|e| e.amount_cents >= 0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_determinism() {
        for template in templates() {
            for &pool in &POOLS {
                let standings = tied_field(9, 3);
                let first = distribute(pool, &template, &standings).unwrap();
                let second = distribute(pool, &template, &standings).unwrap();
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_tie_symmetry() {
        for template in templates() {
            for &pool in &POOLS {
                let standings = tied_field(8, 2);
                let result = distribute(pool, &template, &standings).unwrap();

                for rank in result.iter().map(|e| e.rank) {
                    let amounts: Vec<i64> = result
                        .iter()
                        .filter(|e| e.rank == rank)
                        .map(|e| e.amount_cents)
                        .collect();
                    let max = amounts.iter().max().copied().unwrap_or(0);
                    let min = amounts.iter().min().copied().unwrap_or(0);
                    assert!(max - min <= 1, "rank {rank} shares differ by more than a cent: {amounts:?}");
                }
            }
        }
    }

    #[test]
    fn test_builtin_templates_sum_to_one() {
        for template in registry().templates() {
            let total = template.share_total().unwrap();
            assert!((total - Decimal::ONE).abs() <= crate::template::share_tolerance());
        }
    }

    #[test]
    fn test_calcutta_conservation_with_partial_ownership() {
        let registry = registry();
        let config = TournamentConfig {
            calcutta_enabled: true,
            calcutta_house_vig_pct: dec("0.07"),
            ..TournamentConfig::default()
        };

        for key in ["top3", "top4", "top8"] {
            let template = registry.resolve(key).unwrap();
            for size in 1..=10 {
                let standings = tied_field(size, 3);
                // every other finisher sold, always including the winner
                let bids: Vec<CalcuttaBid> = standings
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| i % 2 == 0)
                    .map(|(i, s)| {
                        CalcuttaBid::new(format!("owner{}", i % 3), s.participant_id.clone(), dec("33.37"))
                    })
                    .collect();

                let settlement = calcutta_settlement(&config, template, &bids, &standings).unwrap();
                assert_eq!(settlement.payouts.total_cents(), settlement.net_pool_cents);
                assert_eq!(
                    settlement.gross_pool_cents,
                    settlement.net_pool_cents + settlement.house_vig_cents
                );
            }
        }
    }
}
