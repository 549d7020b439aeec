use anyhow::{bail, Result};
use domain::config::{
    CompilerConfig, LoggingConfig, MergeConfig, OccpConfig, WarehouseConfig,
};
use std::collections::HashSet;
use tracing::warn;

const VALID_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, config: &OccpConfig) -> Result<()> {
        self.validate_logging_config(&config.logging)?;
        self.validate_compiler_config(&config.compiler)?;
        self.validate_warehouse_config(&config.warehouse)?;
        self.validate_merge_config(&config.merge)?;
        self.validate_brand_codes(config)?;
        Ok(())
    }

    fn validate_logging_config(&self, config: &LoggingConfig) -> Result<()> {
        let level = config.level.trim().to_lowercase();
        if !VALID_LEVELS.contains(&level.as_str()) {
            bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                config.level,
                VALID_LEVELS
            );
        }

        if config.json_output && config.color_output {
            warn!("color_output has no effect with json_output enabled");
        }

        Ok(())
    }

    fn validate_compiler_config(&self, config: &CompilerConfig) -> Result<()> {
        if config.default_features.is_empty() {
            bail!("compiler.default_features must not be empty");
        }
        if let Some(blank) = config
            .default_features
            .iter()
            .position(|feature| feature.trim().is_empty())
        {
            bail!("compiler.default_features[{blank}] is blank");
        }
        if config.gbu.trim().is_empty() {
            bail!("compiler.gbu must not be empty");
        }
        if config.subtype.trim().is_empty() {
            bail!("compiler.subtype must not be empty");
        }
        Ok(())
    }

    fn validate_warehouse_config(&self, config: &WarehouseConfig) -> Result<()> {
        if config.marker_brand.trim().is_empty() {
            bail!("warehouse.marker_brand must not be empty");
        }
        if config.etl_load_prefix.is_empty() {
            warn!("warehouse.etl_load_prefix is empty, ETL_LOAD_ID will be the bare date");
        }
        Ok(())
    }

    fn validate_merge_config(&self, config: &MergeConfig) -> Result<()> {
        let mut destinations = HashSet::new();

        for (index, entry) in config.remap.entries().iter().enumerate() {
            for (side, path) in [("dest", &entry.dest), ("source", &entry.source)] {
                if path.split('.').any(|segment| segment.trim().is_empty()) {
                    bail!(
                        "merge.remap[{index}].{side} '{path}' has an empty path segment"
                    );
                }
            }

            if !destinations.insert(entry.dest.as_str()) {
                warn!(
                    "merge.remap destination '{}' appears more than once, the last entry wins",
                    entry.dest
                );
            }
        }

        Ok(())
    }

    fn validate_brand_codes(&self, config: &OccpConfig) -> Result<()> {
        let mut names = HashSet::new();
        for (code, name) in &config.brand_codes {
            if code.trim().is_empty() {
                bail!("brand_codes contains an empty code for '{name}'");
            }
            if !names.insert(name.as_str()) {
                warn!("brand '{}' is mapped by more than one code", name);
            }
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
