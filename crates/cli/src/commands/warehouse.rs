use anyhow::Result;
use clap::Args;
use common::OperationTimer;
use domain::{ConstraintBundle, OccpConfig, WarehouseMappingService, WarehouseRows};
use infrastructure::{JsonReferenceRepository, SequenceRunIdAllocator};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::{read_document, write_output};

#[derive(Debug, Args)]
pub struct WarehouseCommand {
    /// Constraint bundle (JSON, or TOML by extension)
    #[arg(short, long)]
    pub bundle: PathBuf,

    /// Directory with the ds_*.json reference tables
    #[arg(short, long)]
    pub reference_dir: PathBuf,

    /// Highest run id already stored, e.g. C_0000041
    #[arg(long)]
    pub max_id: Option<String>,

    /// Rows of the previous submission, to emit their superseded copies
    #[arg(long)]
    pub prior: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl WarehouseCommand {
    pub async fn execute(&self, config: &OccpConfig) -> Result<()> {
        let bundle: ConstraintBundle = read_document(&self.bundle).await?;
        let prior: Option<WarehouseRows> = match &self.prior {
            Some(path) => Some(read_document(path).await?),
            None => None,
        };

        let service = WarehouseMappingService::new(
            Arc::new(JsonReferenceRepository::new(&self.reference_dir)),
            Arc::new(SequenceRunIdAllocator::from_stored_max(self.max_id.as_deref())?),
            config.warehouse.clone(),
        );

        let loaded_at = chrono::Local::now().naive_local();
        let mut timer = OperationTimer::new("warehouse");
        let result = service.map_submission(&bundle, loaded_at).await;
        if let Ok(submission) = &result {
            timer.add_field("run_id", submission.run_id.to_string());
            timer.add_field("items_count", submission.rows.len());
        }
        timer.finish_with_result(result.as_ref());
        let submission = result?;

        let superseded = prior.map(|prior| submission.rows.supersede(&prior, loaded_at));
        if let Some(rows) = &superseded {
            info!(rows = rows.len(), "Prior rows superseded");
        }

        let output = json!({
            "run_id": submission.run_id,
            "rows": submission.rows,
            "superseded": superseded,
        });
        write_output(&output, self.out.as_deref()).await
    }
}
