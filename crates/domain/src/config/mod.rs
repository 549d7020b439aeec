//! Compiler configuration
//!
//! Plain serde types. Loading, layering and validation live in the
//! infrastructure crate.

mod deep_merge;

pub use deep_merge::{DeepMerger, MergeOptions, RemapEntry, RemapTable};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Deployment profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Local runs, verbose logging
    #[default]
    Dev,
    /// Acceptance environment
    Uat,
    /// Production submissions
    Prod,
    /// Custom profile with user-defined name
    Custom(String),
}

impl Profile {
    pub fn name(&self) -> &str {
        match self {
            Profile::Dev => "dev",
            Profile::Uat => "uat",
            Profile::Prod => "prod",
            Profile::Custom(name) => name,
        }
    }
}

impl FromStr for Profile {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Profile::Dev,
            "uat" | "test" => Profile::Uat,
            "prod" | "production" => Profile::Prod,
            custom => Profile::Custom(custom.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OccpConfig {
    #[serde(default)]
    pub profile: Profile,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub warehouse: WarehouseConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    /// Brand code -> brand display name
    #[serde(default)]
    pub brand_codes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_output: bool,

    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Features appended after the interaction keys in `feature_list`
    #[serde(default = "default_features")]
    pub default_features: Vec<String>,

    #[serde(default = "default_subtype")]
    pub subtype: String,

    #[serde(default = "default_gbu")]
    pub gbu: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Brand whose reference rows are split by indication
    #[serde(default = "default_marker_brand")]
    pub marker_brand: String,

    #[serde(default = "default_etl_load_prefix")]
    pub etl_load_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MergeConfig {
    #[serde(default)]
    pub case_insensitive: bool,

    #[serde(default)]
    pub remap: RemapTable,
}

impl MergeConfig {
    pub fn options(&self) -> MergeOptions {
        MergeOptions {
            case_insensitive: self.case_insensitive,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_output: false,
            color_output: default_color_output(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_features: default_features(),
            subtype: default_subtype(),
            gbu: default_gbu(),
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            marker_brand: default_marker_brand(),
            etl_load_prefix: default_etl_load_prefix(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_color_output() -> bool {
    true
}

fn default_features() -> Vec<String> {
    (1..=11)
        .map(|month| format!("MONTH_{month}"))
        .chain(std::iter::once("BRICK_SALES_AMOUNT_MA_3".to_string()))
        .collect()
}

fn default_subtype() -> String {
    "BRICK".to_string()
}

fn default_gbu() -> String {
    "gen".to_string()
}

fn default_marker_brand() -> String {
    "DUPIXENT".to_string()
}

fn default_etl_load_prefix() -> String {
    "LOAD_".to_string()
}

impl OccpConfig {
    /// Profile defaults applied before file overlays
    pub fn for_profile(profile: Profile) -> Self {
        let mut config = Self {
            profile,
            ..Self::default()
        };
        if config.profile == Profile::Prod {
            config.logging.level = "warn".to_string();
            config.logging.json_output = true;
            config.logging.color_output = false;
        }
        config
    }

    /// Code for a brand display name; unmapped names pass through
    pub fn brand_code_for(&self, brand: &str) -> String {
        self.brand_codes
            .iter()
            .find(|(_, name)| name.as_str() == brand)
            .map(|(code, _)| code.clone())
            .unwrap_or_else(|| brand.to_string())
    }
}
