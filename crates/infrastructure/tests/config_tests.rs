use domain::config::*;
use infrastructure::config::{ConfigLoader, ConfigSource, ConfigValidator};
use pretty_assertions::assert_eq;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::fs;

/// Loader isolated from the developer's real config files and env
fn isolated_loader(dir: &TempDir, prefix: &str) -> ConfigLoader {
    ConfigLoader::new()
        .with_search_paths(vec![
            dir.path().join("occp.toml"),
            dir.path().join("occp.json"),
            dir.path().join(".occprc"),
        ])
        .with_profile_dir(dir.path().join("configs"))
        .with_env_prefix(prefix)
}

#[tokio::test]
async fn test_defaults_without_files() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let (config, sources) = isolated_loader(&temp_dir, "OCCP_T_DEFAULTS_")
        .load_with_sources()
        .await?;

    assert_eq!(config, OccpConfig::default());
    assert_eq!(sources, vec![ConfigSource::Default]);
    Ok(())
}

#[tokio::test]
async fn test_config_loader_from_toml() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let toml_content = r#"
[logging]
level = "debug"

[warehouse]
marker_brand = "DUPIXENT"
etl_load_prefix = "IT_"

[brand_codes]
TJO = "TOUJEO"

[[merge.remap]]
dest = "model.months"
source = "occp_length"
"#;
    fs::write(temp_dir.path().join("occp.toml"), toml_content).await?;

    let config = isolated_loader(&temp_dir, "OCCP_T_TOML_").load().await?;

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.warehouse.etl_load_prefix, "IT_");
    assert_eq!(config.brand_code_for("TOUJEO"), "TJO");
    assert_eq!(
        config.merge.remap,
        [RemapEntry::new("model.months", "occp_length")]
            .into_iter()
            .collect::<RemapTable>()
    );
    // untouched sections keep their defaults
    assert_eq!(config.compiler, CompilerConfig::default());
    Ok(())
}

#[tokio::test]
async fn test_config_loader_from_json() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let json_content = r#"{
  "compiler": { "gbu": "specialty" },
  "merge": { "case_insensitive": true }
}"#;
    fs::write(temp_dir.path().join("occp.json"), json_content).await?;

    let config = isolated_loader(&temp_dir, "OCCP_T_JSON_").load().await?;

    assert_eq!(config.compiler.gbu, "specialty");
    assert_eq!(config.compiler.subtype, "BRICK");
    assert!(config.merge.options().case_insensitive);
    Ok(())
}

#[tokio::test]
async fn test_extensionless_rc_accepts_json() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(
        temp_dir.path().join(".occprc"),
        r#"{"logging": {"json_output": true}}"#,
    )
    .await?;

    let config = isolated_loader(&temp_dir, "OCCP_T_RC_").load().await?;
    assert!(config.logging.json_output);
    Ok(())
}

#[tokio::test]
async fn test_first_file_wins() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(
        temp_dir.path().join("occp.toml"),
        "[logging]\nlevel = \"trace\"\n",
    )
    .await?;
    fs::write(
        temp_dir.path().join("occp.json"),
        r#"{"logging": {"level": "error"}}"#,
    )
    .await?;

    let (config, sources) = isolated_loader(&temp_dir, "OCCP_T_FIRST_")
        .load_with_sources()
        .await?;
    assert_eq!(config.logging.level, "trace");
    assert_eq!(
        sources,
        vec![
            ConfigSource::Default,
            ConfigSource::File(temp_dir.path().join("occp.toml")),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_profile_overlay_sets_single_nested_key() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(
        temp_dir.path().join("occp.toml"),
        "[warehouse]\nmarker_brand = \"DUPIXENT\"\netl_load_prefix = \"IT_\"\n",
    )
    .await?;
    fs::create_dir_all(temp_dir.path().join("configs")).await?;
    fs::write(
        temp_dir.path().join("configs").join("uat.toml"),
        "[warehouse]\netl_load_prefix = \"UAT_\"\n",
    )
    .await?;

    env::set_var("OCCP_T_OVERLAY_ENV", "uat");
    let result = isolated_loader(&temp_dir, "OCCP_T_OVERLAY_")
        .load_with_sources()
        .await;
    env::remove_var("OCCP_T_OVERLAY_ENV");
    let (config, sources) = result?;

    assert_eq!(config.profile, Profile::Uat);
    assert_eq!(config.warehouse.etl_load_prefix, "UAT_");
    assert_eq!(config.warehouse.marker_brand, "DUPIXENT");
    assert_eq!(
        sources.last(),
        Some(&ConfigSource::Profile(
            temp_dir.path().join("configs").join("uat.toml")
        ))
    );
    Ok(())
}

#[tokio::test]
async fn test_prod_profile_defaults() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;

    env::set_var("OCCP_T_PROD_ENV", "production");
    let result = isolated_loader(&temp_dir, "OCCP_T_PROD_").load().await;
    env::remove_var("OCCP_T_PROD_ENV");
    let config = result?;

    assert_eq!(config.profile, Profile::Prod);
    assert_eq!(config.logging.level, "warn");
    assert!(config.logging.json_output);
    assert!(!config.logging.color_output);
    Ok(())
}

#[tokio::test]
async fn test_env_overrides() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;

    env::set_var("OCCP_T_ENV_LOG_LEVEL", "debug");
    env::set_var("OCCP_T_ENV_LOG_JSON", "true");
    env::set_var("OCCP_T_ENV_MARKER_BRAND", " dupixent ");
    env::set_var("OCCP_T_ENV_MERGE_CASE_INSENSITIVE", "1");
    let result = isolated_loader(&temp_dir, "OCCP_T_ENV_")
        .load_with_sources()
        .await;
    for name in [
        "LOG_LEVEL",
        "LOG_JSON",
        "MARKER_BRAND",
        "MERGE_CASE_INSENSITIVE",
    ] {
        env::remove_var(format!("OCCP_T_ENV_{name}"));
    }
    let (config, sources) = result?;

    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json_output);
    assert_eq!(config.warehouse.marker_brand, "DUPIXENT");
    assert!(config.merge.case_insensitive);
    assert_eq!(sources.len(), 5);
    assert!(sources.contains(&ConfigSource::Environment(
        "OCCP_T_ENV_MARKER_BRAND".to_string()
    )));
    Ok(())
}

#[tokio::test]
async fn test_invalid_boolean_override_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;

    env::set_var("OCCP_T_BOOL_LOG_JSON", "sometimes");
    let result = isolated_loader(&temp_dir, "OCCP_T_BOOL_").load().await;
    env::remove_var("OCCP_T_BOOL_LOG_JSON");

    let error = result.unwrap_err();
    assert!(format!("{error:#}").contains("OCCP_T_BOOL_LOG_JSON"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_profile_file_fails() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    fs::create_dir_all(temp_dir.path().join("configs")).await?;
    fs::write(temp_dir.path().join("configs").join("dev.json"), "{ nope").await?;

    let result = isolated_loader(&temp_dir, "OCCP_T_BADPROFILE_").load().await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_rendered_config_reloads() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = OccpConfig::default();
    config.compiler.gbu = "vaccines".to_string();
    config
        .brand_codes
        .insert("SLQ".to_string(), "SOLIQUA".to_string());

    let path: PathBuf = temp_dir.path().join("occp.toml");
    fs::write(&path, toml::to_string_pretty(&config)?).await?;

    let reloaded = isolated_loader(&temp_dir, "OCCP_T_SAVE_").load().await?;
    assert_eq!(reloaded, config);
    Ok(())
}

#[test]
fn test_validator_rejects_bad_values() {
    let validator = ConfigValidator::new();

    let mut config = OccpConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(validator.validate(&config).is_err());

    let mut config = OccpConfig::default();
    config.compiler.default_features.clear();
    assert!(validator.validate(&config).is_err());

    let mut config = OccpConfig::default();
    config.warehouse.marker_brand = "  ".to_string();
    assert!(validator.validate(&config).is_err());

    let mut config = OccpConfig::default();
    config.merge.remap = [RemapEntry::new("model.months", ".occp_length")]
        .into_iter()
        .collect();
    assert!(validator.validate(&config).is_err());

    assert!(validator.validate(&OccpConfig::for_profile(Profile::Prod)).is_ok());
}
