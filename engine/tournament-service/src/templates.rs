//! Tenant-supplied payout templates

use std::path::Path;

use anyhow::{Context, Result};
use payout_engine::PayoutTemplate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Custom template file layout
///
/// ```json
/// { "templates": [ { "key": "league", "slots": [ { "place": 1, "share": "1.0" } ] } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomTemplateFile {
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub templates: Vec<PayoutTemplate>,
}

/// Read custom templates from a JSON file. Validation happens when the registry is built.
pub async fn load_custom_templates<P: AsRef<Path>>(file_path: P) -> Result<Vec<PayoutTemplate>> {
    let path = file_path.as_ref();
    info!("Loading custom templates from: {:?}", path);

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read template file {:?}", path))?;
    let file: CustomTemplateFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse template file {:?}", path))?;

    info!(
        "Loaded {} custom templates{}",
        file.templates.len(),
        file.tenant_id.map(|t| format!(" for tenant {t}")).unwrap_or_default()
    );
    Ok(file.templates)
}
