use anyhow::Result;
use clap::Args;
use common::OperationTimer;
use domain::{DeepMerger, OccpConfig};
use serde_json::Value;
use std::path::PathBuf;

use super::{read_document, write_output};

#[derive(Debug, Args)]
pub struct MergeCommand {
    /// Base document
    pub base: PathBuf,

    /// Document merged on top of the base
    pub incoming: PathBuf,

    /// Match keys case-insensitively regardless of the configuration
    #[arg(long)]
    pub case_insensitive: bool,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl MergeCommand {
    pub async fn execute(&self, config: &OccpConfig) -> Result<()> {
        let base: Value = read_document(&self.base).await?;
        let incoming: Value = read_document(&self.incoming).await?;

        let mut options = config.merge.options();
        options.case_insensitive |= self.case_insensitive;

        let timer = OperationTimer::new("merge");
        let merged = DeepMerger::new(options).merge(&base, &incoming, &config.merge.remap);
        timer.finish();

        write_output(&merged, self.out.as_deref()).await
    }
}
