use anyhow::{Context, Result};
use domain::config::{DeepMerger, MergeOptions, OccpConfig, Profile, RemapTable};
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info, warn};

const DEFAULT_ENV_PREFIX: &str = "OCCP_";

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Profile(PathBuf),
    Environment(String),
    Default,
}

pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    profile_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_paths: Self::default_config_paths(),
            profile_dir: PathBuf::from("configs"),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Search `path` before the default locations
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.config_paths.insert(0, path);
        self
    }

    /// Replace the whole search list
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config_paths = paths;
        self
    }

    /// Directory holding `<profile>.toml` / `<profile>.json` overlays
    pub fn with_profile_dir(mut self, dir: PathBuf) -> Self {
        self.profile_dir = dir;
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("occp.toml"),
            PathBuf::from("occp.json"),
            PathBuf::from(".occprc"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("occp").join("config.toml"));
        }

        paths
    }

    pub async fn load(&self) -> Result<OccpConfig> {
        Ok(self.load_with_sources().await?.0)
    }

    /// Load the configuration and report every layer that contributed
    pub async fn load_with_sources(&self) -> Result<(OccpConfig, Vec<ConfigSource>)> {
        let profile = self.detect_profile();
        debug!("Detected profile: {}", profile.name());

        let mut sources = vec![ConfigSource::Default];
        let mut tree = serde_json::to_value(OccpConfig::for_profile(profile.clone()))
            .context("Failed to serialize default configuration")?;

        // First file found wins
        for path in &self.config_paths {
            if !path.exists() {
                continue;
            }
            match self.load_tree(path).await {
                Ok(file_tree) => {
                    info!("Loaded base configuration from: {}", path.display());
                    tree = Self::overlay(&tree, &file_tree);
                    sources.push(ConfigSource::File(path.clone()));
                    break;
                }
                Err(e) => {
                    warn!("Failed to load base config from {}: {:#}", path.display(), e);
                }
            }
        }

        for path in self.profile_config_paths(&profile) {
            if !path.exists() {
                continue;
            }
            let profile_tree = self
                .load_tree(&path)
                .await
                .with_context(|| format!("Failed to load profile config {}", path.display()))?;
            info!("Loaded profile configuration from: {}", path.display());
            tree = Self::overlay(&tree, &profile_tree);
            sources.push(ConfigSource::Profile(path));
            break;
        }

        let mut config: OccpConfig =
            serde_json::from_value(tree).context("Configuration does not match the schema")?;
        config.profile = profile;

        sources.extend(self.apply_env_overrides(&mut config)?);
        Ok((config, sources))
    }

    /// Active profile from `<prefix>ENV`, `dev` when unset
    pub fn detect_profile(&self) -> Profile {
        env::var(format!("{}ENV", self.env_prefix))
            .map(|env_val| Profile::from_str(&env_val).unwrap_or_default())
            .unwrap_or_default()
    }

    fn profile_config_paths(&self, profile: &Profile) -> Vec<PathBuf> {
        let name = profile.name();
        vec![
            self.profile_dir.join(format!("{name}.toml")),
            self.profile_dir.join(format!("{name}.json")),
        ]
    }

    /// Overlay a partial document; a file may set a single nested key
    fn overlay(base: &Value, overlay: &Value) -> Value {
        DeepMerger::new(MergeOptions::default()).merge(base, overlay, &RemapTable::default())
    }

    async fn load_tree(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => Self::parse_toml(&content).context("Failed to parse TOML config"),
            "json" => serde_json::from_str(&content).context("Failed to parse JSON config"),
            _ => {
                // Try TOML first, then JSON
                Self::parse_toml(&content)
                    .or_else(|_| serde_json::from_str(&content).map_err(anyhow::Error::from))
                    .context("Failed to parse config file")
            }
        }
    }

    fn parse_toml(content: &str) -> Result<Value> {
        let value: toml::Value = toml::from_str(content)?;
        Ok(serde_json::to_value(value)?)
    }

    fn apply_env_overrides(&self, config: &mut OccpConfig) -> Result<Vec<ConfigSource>> {
        let mut applied = Vec::new();
        let var = |name: &str| {
            let key = format!("{}{}", self.env_prefix, name);
            env::var(&key).ok().map(|value| (key, value))
        };

        if let Some((key, level)) = var("LOG_LEVEL") {
            config.logging.level = level;
            applied.push(ConfigSource::Environment(key));
        }

        if let Some((key, json)) = var("LOG_JSON") {
            config.logging.json_output = parse_flag(&json)
                .with_context(|| format!("{key} must be a boolean, got '{json}'"))?;
            applied.push(ConfigSource::Environment(key));
        }

        if let Some((key, brand)) = var("MARKER_BRAND") {
            config.warehouse.marker_brand = brand.trim().to_uppercase();
            applied.push(ConfigSource::Environment(key));
        }

        if let Some((key, flag)) = var("MERGE_CASE_INSENSITIVE") {
            config.merge.case_insensitive = parse_flag(&flag)
                .with_context(|| format!("{key} must be a boolean, got '{flag}'"))?;
            applied.push(ConfigSource::Environment(key));
        }

        Ok(applied)
    }

    /// Default configuration as commented TOML, for `occp init-config`
    pub fn generate_default_config() -> Result<String> {
        let body = toml::to_string_pretty(&OccpConfig::default())
            .context("Failed to render default configuration")?;

        let header = [
            "# OCCP compiler configuration",
            "#",
            "# Searched as ./occp.toml, ./occp.json, ./.occprc and then",
            "# $XDG_CONFIG_HOME/occp/config.toml. A profile overlay in",
            "# configs/<profile>.toml may override single nested keys.",
            "#",
            "# Environment overrides: OCCP_ENV, OCCP_LOG_LEVEL, OCCP_LOG_JSON,",
            "# OCCP_MARKER_BRAND, OCCP_MERGE_CASE_INSENSITIVE.",
            "#",
            "# [merge] remap entries copy a value from the incoming payload",
            "# into the merged configuration:",
            "#   [[merge.remap]]",
            "#   dest = \"model.months\"",
            "#   source = \"occp_length\"",
            "#",
            "# [brand_codes] maps a submission code to a brand display name:",
            "#   TJO = \"TOUJEO\"",
            "",
        ]
        .join("\n");

        Ok(format!("{header}\n{body}"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("not a boolean: {other}")),
    }
}
