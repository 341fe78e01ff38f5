//! Service state and request settlement

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use payout_engine::{
    format_cents, PayoutCalculator, PayoutTemplate, SettlementRequest, TemplateRegistry,
    TournamentSettlement,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ServiceConfig;
use crate::templates::load_custom_templates;

/// Settlement result as handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementEnvelope {
    pub service_version: String,
    pub calculated_at: DateTime<Utc>,
    pub tenant_id: String,
    pub venue_id: String,
    pub settlement: TournamentSettlement,
}

/// Service state shared by all requests
pub struct ServiceState {
    config: ServiceConfig,
    calculator: PayoutCalculator,
}

impl ServiceState {
    /// Build the template registry and the calculator.
    ///
    /// A malformed template fails here, before any request can be settled.
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        let custom = match &config.templates.custom_file {
            Some(path) => load_custom_templates(path).await?,
            None => Vec::new(),
        };

        let registry = TemplateRegistry::builder()
            .with_builtins()
            .with_custom(custom)
            .build()
            .context("Template registry failed validation")?;
        info!("Registered templates: {}", registry.keys().collect::<Vec<_>>().join(", "));

        Ok(Self { config, calculator: PayoutCalculator::new(Arc::new(registry)) })
    }

    /// Registered templates in key order
    pub fn templates(&self) -> Vec<&PayoutTemplate> {
        self.calculator.registry().templates().collect()
    }

    /// Settle one request
    pub fn settle(&self, request: &SettlementRequest) -> Result<SettlementEnvelope> {
        let settlement = self.calculator.settle(request).with_context(|| {
            format!("Failed to settle tournament for tenant {}", request.tournament.tenant_id)
        })?;

        Ok(SettlementEnvelope {
            service_version: crate_version().to_string(),
            calculated_at: Utc::now(),
            tenant_id: request.tournament.tenant_id.clone(),
            venue_id: request.tournament.venue_id.clone(),
            settlement,
        })
    }

    /// Settle a request file, writing the envelope to `output` or stdout
    pub async fn settle_file(
        &self,
        request_path: &Path,
        output: Option<&Path>,
    ) -> Result<SettlementEnvelope> {
        let content = tokio::fs::read_to_string(request_path)
            .await
            .with_context(|| format!("Failed to read request file {:?}", request_path))?;
        let request: SettlementRequest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse request file {:?}", request_path))?;

        let envelope = self.settle(&request)?;
        log_summary(&envelope);

        let json = if self.config.output.pretty {
            serde_json::to_string_pretty(&envelope)?
        } else {
            serde_json::to_string(&envelope)?
        };

        match output {
            Some(path) => {
                tokio::fs::write(path, json)
                    .await
                    .with_context(|| format!("Failed to write result file {:?}", path))?;
                info!("Wrote settlement to {:?}", path);
            }
            None => println!("{json}"),
        }

        Ok(envelope)
    }
}

fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Human-readable summary of a settlement
fn log_summary(envelope: &SettlementEnvelope) {
    let settlement = &envelope.settlement;
    let pools = &settlement.pools;
    info!(
        "Payout pool {} (entries {}, sponsor {}), green fees {}",
        format_cents(pools.payout_pool_cents),
        format_cents(pools.gross_entry_cents),
        format_cents(pools.sponsor_add_cents),
        format_cents(pools.green_fees_cents)
    );
    for entry in settlement.payouts.iter() {
        info!("  #{} {}: {}", entry.rank, entry.recipient_id, format_cents(entry.amount_cents));
    }

    let calcutta = &settlement.calcutta;
    if calcutta.gross_pool_cents > 0 {
        info!(
            "Calcutta pot {}, vig {}, distributable {}",
            format_cents(calcutta.gross_pool_cents),
            format_cents(calcutta.house_vig_cents),
            format_cents(calcutta.net_pool_cents)
        );
        for (owner, amount) in calcutta.payouts.totals_by_recipient() {
            info!("  {}: {}", owner, format_cents(amount));
        }
    }
}
