pub mod compile;
pub mod config;
pub mod merge;
pub mod warehouse;

pub use compile::CompileCommand;
pub use config::InitConfigCommand;
pub use merge::MergeCommand;
pub use warehouse::WarehouseCommand;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Parse a JSON document, or TOML when the file ends in `.toml`
pub async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
        }
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display())),
    }
}

/// Pretty JSON to `out`, or to stdout when no path is given
pub async fn write_output<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;

    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            fs::write(path, format!("{rendered}\n"))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Output written to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
