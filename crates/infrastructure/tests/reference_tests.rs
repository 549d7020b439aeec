use chrono::NaiveDate;
use domain::config::WarehouseConfig;
use domain::entities::{
    Brand, ChannelCapacity, ConstraintBundle, CycleWindow, EnvelopeMatrix, HistoricalEnvelope,
    Market, OccpMode, PlanningCycle,
};
use domain::repositories::ReferenceDataRepository;
use domain::value_objects::{EnvelopeRule, ReferenceBucket};
use domain::{DomainError, ErrorCategory, WarehouseMappingService};
use infrastructure::reference::{
    BRANDS_FILE, CHANNELS_FILE, FACTS_FILE, SALES_LINES_FILE, TIME_DIMENSION_FILE,
};
use infrastructure::{JsonReferenceRepository, SequenceRunIdAllocator};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

async fn write_reference_dir(dir: &TempDir) -> anyhow::Result<()> {
    let tables = [
        (
            BRANDS_FILE,
            r#"[
                {"BRAND_ID": 1, "GLOBAL_BRAND": "TOUJEO"},
                {"BRAND_ID": 9, "GLOBAL_BRAND": "DUPIXENT", "INDICATION_NAME": "Asthma"}
            ]"#,
        ),
        (
            CHANNELS_FILE,
            r#"[
                {"CHANNEL_ID": 10, "CHANNEL": "FACE TO FACE"},
                {"CHANNEL_ID": 11, "CHANNEL": "RTE WITH CONSENT"}
            ]"#,
        ),
        (
            SALES_LINES_FILE,
            r#"[{"ID": 100, "BRAND_ID": 1, "SALES_TEAM": "IT_Diab_PM", "OCCP_TYPE": "MONOBRAND"}]"#,
        ),
        (
            FACTS_FILE,
            r#"[
                {"M_ID": 5000, "SALES_TABLE_ID": 100, "CHANNEL_ID": 10},
                {"M_ID": 5001, "SALES_TABLE_ID": 100, "CHANNEL_ID": 11}
            ]"#,
        ),
        (
            TIME_DIMENSION_FILE,
            r#"[
                {"CYCLE_ID": 202501, "CYCLE_START_DATE": "01/01/2025", "CYCLE_END_DATE": "03/31/2025"},
                {"CYCLE_ID": 202601, "CYCLE_START_DATE": "01/01/2026", "CYCLE_END_DATE": "03/31/2026"}
            ]"#,
        ),
    ];

    for (file, content) in tables {
        fs::write(dir.path().join(file), content).await?;
    }
    Ok(())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monobrand_bundle() -> ConstraintBundle {
    ConstraintBundle {
        market: Market {
            country: "Italy".to_string(),
            sales_line: "IT_Diab_PM".to_string(),
            brands: vec![Brand::named("Toujeo")],
            mode: OccpMode::Monobrand,
            specialties: BTreeMap::new(),
            distribution: None,
            veeva_align_format: false,
        },
        cycle: PlanningCycle {
            name: "C1 2026".to_string(),
            window: CycleWindow {
                start: date(2026, 1, 1),
                end: date(2026, 3, 31),
                months: 3,
                working_days: 60,
            },
        },
        reference: CycleWindow {
            start: date(2025, 1, 1),
            end: date(2025, 3, 31),
            months: 3,
            working_days: 61,
        },
        capacity: ChannelCapacity {
            channels: vec!["F2F".to_string(), "RTE-Open".to_string()],
            multibrand_channels: Vec::new(),
            daily_capacity: BTreeMap::from([("F2F".to_string(), 4.5)]),
            non_prescriber_included: false,
            non_prescriber_priority: None,
            e_consent_rte: true,
        },
        envelopes: EnvelopeMatrix::Historical(vec![HistoricalEnvelope {
            channel: "RTE-Open".to_string(),
            reference_cycle_actual: ReferenceBucket::new(0),
            rule: EnvelopeRule::new(0, 2).unwrap(),
        }]),
        non_prescriber: Vec::new(),
    }
}

#[tokio::test]
async fn test_unreadable_time_dimension_rows_are_skipped() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::write(
        dir.path().join(TIME_DIMENSION_FILE),
        r#"[
            {"CYCLE_ID": 202501, "CYCLE_START_DATE": "2025-01-01", "CYCLE_END_DATE": "03/31/2025"},
            {"CYCLE_ID": 202502, "CYCLE_START_DATE": "04/01/2025"},
            {"CYCLE_ID": 202601, "CYCLE_START_DATE": "01/01/2026", "CYCLE_END_DATE": "03/31/2026"}
        ]"#,
    )
    .await?;

    let rows = JsonReferenceRepository::new(dir.path()).time_dimension().await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cycle_id.as_str(), "202601");
    assert_eq!(rows[0].cycle_start_date, date(2026, 1, 1));
    Ok(())
}

#[tokio::test]
async fn test_snapshot_reads_every_table() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_reference_dir(&dir).await?;

    let repo = JsonReferenceRepository::new(dir.path());
    let tables = repo.snapshot().await?;

    assert_eq!(tables.brands.len(), 2);
    assert_eq!(tables.brands[1].indication_name.as_deref(), Some("Asthma"));
    assert_eq!(tables.channels[0].channel_id.as_str(), "10");
    assert_eq!(tables.sales_lines[0].occp_type, "MONOBRAND");
    assert_eq!(tables.facts.len(), 2);
    assert_eq!(tables.time_dimension[1].cycle_start_date, date(2026, 1, 1));
    Ok(())
}

#[tokio::test]
async fn test_missing_table_is_reference_data_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_reference_dir(&dir).await?;
    fs::remove_file(dir.path().join(FACTS_FILE)).await?;

    let repo = JsonReferenceRepository::new(dir.path());
    let error = repo.snapshot().await.unwrap_err();

    assert!(matches!(error, DomainError::ReferenceDataUnavailable(_)));
    assert_eq!(error.category(), ErrorCategory::Configuration);
    assert!(error.to_string().contains(FACTS_FILE));
    Ok(())
}

#[tokio::test]
async fn test_malformed_table_is_reference_data_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_reference_dir(&dir).await?;
    fs::write(dir.path().join(CHANNELS_FILE), r#"{"CHANNEL": "F2F"}"#).await?;

    let error = JsonReferenceRepository::new(dir.path())
        .channels()
        .await
        .unwrap_err();
    assert!(error.to_string().contains(CHANNELS_FILE));
    Ok(())
}

#[tokio::test]
async fn test_mapping_end_to_end() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_reference_dir(&dir).await?;

    let service = WarehouseMappingService::new(
        Arc::new(JsonReferenceRepository::new(dir.path())),
        Arc::new(SequenceRunIdAllocator::from_stored_max(Some("C_0000009"))?),
        WarehouseConfig::default(),
    );

    let loaded_at = date(2026, 1, 20).and_hms_opt(9, 30, 0).unwrap();
    let submission = service.map_submission(&monobrand_bundle(), loaded_at).await?;

    assert_eq!(submission.run_id.to_string(), "C_0000010");
    let rows = &submission.rows;
    assert_eq!(
        rows.business_constraints
            .iter()
            .map(|row| (row.fact_id.as_str(), row.avg_rep_capacity))
            .collect::<Vec<_>>(),
        vec![("5000", 4.5), ("5001", 0.0)]
    );
    assert!(rows.brand_specific.is_empty());
    assert_eq!(rows.hcp_constraints.len(), 1);
    assert_eq!(rows.hcp_constraints[0].fact_id.as_str(), "5001");
    assert_eq!(rows.hcp_constraints[0].upcoming_time_id.as_str(), "202601");
    assert_eq!(rows.hcp_constraints[0].reference_time_id.as_str(), "202501");

    let json = serde_json::to_value(rows)?;
    assert_eq!(json["business_constraints"][0]["ID"], "C_0000010");
    assert_eq!(json["business_constraints"][0]["MOST_RECENT_FLAG"], "Y");
    assert_eq!(json["business_constraints"][0]["ETL_LOAD_ID"], "LOAD_20260120");
    Ok(())
}
