use anyhow::Result;
use clap::Args;
use common::OperationTimer;
use domain::{ConstraintBundle, OccpConfig, PayloadAssembler, SubmissionEnvelope};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use super::{read_document, write_output};

#[derive(Debug, Args)]
pub struct CompileCommand {
    /// Constraint bundle (JSON, or TOML by extension)
    #[arg(short, long)]
    pub bundle: PathBuf,

    /// Base optimizer configuration to merge the payload into
    #[arg(long, conflicts_with = "envelope")]
    pub base: Option<PathBuf>,

    /// Emit the submission envelope instead of the bare payload
    #[arg(long)]
    pub envelope: bool,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl CompileCommand {
    pub async fn execute(&self, config: &OccpConfig) -> Result<()> {
        let bundle: ConstraintBundle = read_document(&self.bundle).await?;

        let mut timer = OperationTimer::new("compile");
        timer.add_field("bundle", self.bundle.display().to_string());
        let result = PayloadAssembler::new(config.compiler.default_features.clone()).assemble(&bundle);
        if let Ok(payload) = &result {
            timer.add_field("items_count", payload.interaction_channels.len());
        }
        timer.finish_with_result(result.as_ref());
        let payload = result?;

        info!(
            digest = %payload.digest()?,
            interactions = payload.interaction_channels.len(),
            "Compiled payload"
        );

        if self.envelope {
            let envelope = SubmissionEnvelope::from_payload(&payload, &bundle.market.brands, config)?;
            return write_output(&envelope, self.out.as_deref()).await;
        }

        match &self.base {
            Some(base_path) => {
                let base: Value = read_document(base_path).await?;
                let merged =
                    payload.merged_into(&base, &config.merge.remap, config.merge.options())?;
                write_output(&merged, self.out.as_deref()).await
            }
            None => write_output(&payload, self.out.as_deref()).await,
        }
    }
}
