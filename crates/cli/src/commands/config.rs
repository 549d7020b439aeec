use anyhow::{bail, Result};
use clap::Args;
use infrastructure::ConfigLoader;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct InitConfigCommand {
    /// Write to this file instead of printing
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl InitConfigCommand {
    pub async fn execute(&self) -> Result<()> {
        let content = ConfigLoader::generate_default_config()?;

        let Some(output) = &self.output else {
            print!("{content}");
            return Ok(());
        };

        if output.exists() && !self.force {
            bail!(
                "Configuration file already exists at {}; use --force to overwrite",
                output.display()
            );
        }

        tokio::fs::write(output, content).await?;
        info!("Configuration file generated at: {}", output.display());
        Ok(())
    }
}
