//! Scoring flows over the shipped model directory.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use churnlens::adapters::csv_io::{read_table, read_table_from_path, write_table_to_path};
use churnlens::adapters::LoadOptions;
use churnlens::application::batch::{read_scores, PROBABILITY_COLUMN, TIER_COLUMN};
use churnlens::application::{score_table, ChurnModelContext, ChurnScoringService, ScoringService};
use churnlens::domain::customer::{AddOn, Contract};
use churnlens::domain::sample::{example_csv, example_records};
use churnlens::RiskTier;

fn model_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models")
}

fn service() -> ChurnScoringService {
    let context = ChurnModelContext::load(&model_dir(), &LoadOptions::default()).expect("shipped models load");
    ScoringService::new(Arc::new(context))
}

#[test]
fn test_short_tenure_month_to_month_is_not_low_risk() {
    let service = service();
    let records = example_records().expect("samples parse");
    let report = service.score_record(&records[0]).expect("scores");

    assert_ne!(report.tier, RiskTier::Bajo);
    assert!(report.churn_probability() > 0.6);
}

#[test]
fn test_long_tenure_two_year_profile_is_low_or_medium() {
    let service = service();
    let mut record = example_records().expect("samples parse").remove(4);
    record.tenure = 60.0;
    record.contract = Contract::TwoYear;
    record.online_security = AddOn::Yes;
    record.online_backup = AddOn::Yes;
    record.device_protection = AddOn::Yes;
    record.tech_support = AddOn::Yes;
    record.streaming_tv = AddOn::Yes;
    record.streaming_movies = AddOn::Yes;
    record.refresh_derived();

    let report = service.score_record(&record).expect("scores");
    assert!(matches!(report.tier, RiskTier::Bajo | RiskTier::Medio));
}

#[test]
fn test_missing_contract_column_names_it_and_writes_nothing() {
    let service = service();
    let mut table = read_table(Cursor::new(example_csv())).expect("example csv reads");
    table.drop_column("Contract");

    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("out.csv");

    let err = score_table(&service, &table).expect_err("missing column rejected");
    assert_eq!(err.missing_fields(), Some(&["Contract".to_string()][..]));
    assert!(err.is_user_error());
    assert!(!output.exists());
}

#[test]
fn test_exported_scores_reload_unchanged() {
    let service = service();
    let table = read_table(Cursor::new(example_csv())).expect("example csv reads");
    let scored = score_table(&service, &table).expect("example scores");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("predicciones.csv");
    write_table_to_path(&path, &scored.table).expect("export");

    let reloaded = read_table_from_path(&path).expect("reimport");
    assert_eq!(reloaded.headers, scored.table.headers);
    assert_eq!(reloaded.headers[reloaded.headers.len() - 2], PROBABILITY_COLUMN);
    assert_eq!(reloaded.headers[reloaded.headers.len() - 1], TIER_COLUMN);

    let scores = read_scores(&reloaded).expect("scores parse");
    assert_eq!(scores.len(), scored.predictions.len());
    for ((p, tier), prediction) in scores.iter().zip(&scored.predictions) {
        assert_eq!(*p, prediction.churn_probability());
        assert_eq!(*tier, prediction.risk_tier());
    }

    // Scoring the exported file again replaces the columns instead of stacking them.
    let rescored = score_table(&service, &reloaded).expect("rescore");
    assert_eq!(rescored.table.headers, scored.table.headers);
}

#[test]
fn test_batch_matches_sequential_scoring() {
    let service = service();
    let records = example_records().expect("samples parse");
    let batch = service.score_records(&records).expect("batch scores");

    assert_eq!(batch.len(), records.len());
    for (record, from_batch) in records.iter().zip(&batch) {
        let single = service.score_record(record).expect("single scores");
        assert!((single.churn_probability() - from_batch.churn_probability()).abs() < 1e-12);
        assert_eq!(single.tier, from_batch.risk_tier());
    }
}
