//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use finsight_core::{
    test_utils::{fast_config, synthetic_csv, synthetic_dataset},
    CsvDatasetSource, FinancialAnalyzer, MemoryStore, NoDataset, PredictorStatus, ProfileStore,
    TrainedPredictor, UserFinancialProfile,
};

use crate::cli::{Cli, Commands, ProfileAction, ProfileArgs};
use crate::commands::{self, format_amount, read_profile_file, resolve_profile};

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn sample_json_file() -> tempfile::NamedTempFile {
    let json = serde_json::to_string(&UserFinancialProfile::sample()).unwrap();
    write_temp(".json", &json)
}

fn file_args(path: PathBuf) -> ProfileArgs {
    ProfileArgs {
        file: Some(path),
        user: None,
        json: false,
    }
}

fn user_args(user: &str) -> ProfileArgs {
    ProfileArgs {
        file: None,
        user: Some(user.to_string()),
        json: false,
    }
}

fn store_with_sample(user: &str) -> MemoryStore {
    let store = MemoryStore::new();
    store
        .save_profile(user, &UserFinancialProfile::sample().normalized())
        .unwrap();
    store
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_score_with_file() {
    let cli = Cli::try_parse_from(["finsight", "score", "--file", "p.json"]).unwrap();
    match cli.command {
        Commands::Score(args) => {
            assert_eq!(args.file, Some(PathBuf::from("p.json")));
            assert!(!args.json);
        }
        _ => panic!("expected score"),
    }
}

#[test]
fn test_parse_requires_file_or_user() {
    assert!(Cli::try_parse_from(["finsight", "report"]).is_err());
    assert!(
        Cli::try_parse_from(["finsight", "report", "-f", "a.json", "-u", "alice"]).is_err()
    );
}

#[test]
fn test_parse_global_flags_after_command() {
    let cli = Cli::try_parse_from([
        "finsight", "profile", "list", "--memory", "--db", "x.db", "-v",
    ])
    .unwrap();
    assert!(cli.memory);
    assert!(cli.verbose);
    assert_eq!(cli.db, Some(PathBuf::from("x.db")));
    assert!(matches!(
        cli.command,
        Commands::Profile {
            action: ProfileAction::List
        }
    ));
}

#[test]
fn test_parse_context_question() {
    let cli = Cli::try_parse_from([
        "finsight", "context", "-u", "alice", "-q", "Can I afford a vacation?",
    ])
    .unwrap();
    match cli.command {
        Commands::Context { profile, question } => {
            assert_eq!(profile.user.as_deref(), Some("alice"));
            assert_eq!(question.as_deref(), Some("Can I afford a vacation?"));
        }
        _ => panic!("expected context"),
    }
}

// ========== Profile Input Tests ==========

#[test]
fn test_read_profile_json() {
    let file = sample_json_file();
    let profile = read_profile_file(file.path()).unwrap();
    assert_eq!(profile.net_monthly_income, UserFinancialProfile::sample().net_monthly_income);
}

#[test]
fn test_read_profile_csv() {
    let file = write_temp(
        ".csv",
        "age,net_monthly_income,savings_total,class,owns_home,rent_mortgage\n\
         41,52000,150000,middle,yes,\n",
    );
    let profile = read_profile_file(file.path()).unwrap();

    assert_eq!(profile.age, 41);
    assert_eq!(profile.net_monthly_income, 52_000.0);
    assert_eq!(profile.savings_total, 150_000.0);
    assert!(profile.owns_home.is_yes());
    // Empty cells fall back to defaults
    assert_eq!(profile.rent_mortgage, 0.0);
}

#[test]
fn test_read_profile_csv_without_rows_fails() {
    let file = write_temp(".csv", "age,net_monthly_income\n");
    assert!(read_profile_file(file.path()).is_err());
}

#[test]
fn test_read_profile_invalid_json_fails() {
    let file = write_temp(".json", "{not json");
    let err = read_profile_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid profile JSON"));
}

#[test]
fn test_resolve_profile_from_store() {
    let store = store_with_sample("alice");
    let profile = resolve_profile(&store, None, Some("alice")).unwrap();
    assert_eq!(profile.age, UserFinancialProfile::sample().age);

    let err = resolve_profile(&store, None, Some("bob")).unwrap_err();
    assert!(err.to_string().contains("bob"));
}

#[test]
fn test_format_amount() {
    assert_eq!(format_amount(0.0), "0");
    assert_eq!(format_amount(999.4), "999");
    assert_eq!(format_amount(1234567.0), "1,234,567");
    assert_eq!(format_amount(-45000.0), "-45,000");
}

// ========== Analysis Command Tests ==========

#[test]
fn test_cmd_ratios_score_risk_from_file() {
    let store = MemoryStore::new();
    let file = sample_json_file();
    let args = file_args(file.path().to_path_buf());

    assert!(commands::cmd_ratios(&store, &args).is_ok());
    assert!(commands::cmd_score(&store, &args).is_ok());
    assert!(commands::cmd_risk(&store, &args).is_ok());
}

#[test]
fn test_cmd_score_json_output() {
    let store = store_with_sample("alice");
    let args = ProfileArgs {
        json: true,
        ..user_args("alice")
    };
    assert!(commands::cmd_score(&store, &args).is_ok());
}

#[test]
fn test_cmd_predict_saves_for_stored_user() {
    let store = store_with_sample("alice");
    let predictor = TrainedPredictor::new(fast_config(), synthetic_dataset(60));

    commands::cmd_predict(&store, &predictor, &user_args("alice")).unwrap();

    assert_eq!(predictor.status(), PredictorStatus::Ready);
    assert!(store.load_predictions("alice").unwrap().is_some());
}

#[test]
fn test_cmd_predict_from_file_does_not_save() {
    let store = MemoryStore::new();
    let predictor = TrainedPredictor::new(fast_config(), NoDataset);
    let file = sample_json_file();

    commands::cmd_predict(&store, &predictor, &file_args(file.path().to_path_buf())).unwrap();

    assert_eq!(predictor.status(), PredictorStatus::Degraded);
    assert!(store.list_users().unwrap().is_empty());
}

#[test]
fn test_cmd_report_and_context() {
    let store = store_with_sample("alice");
    let analyzer = FinancialAnalyzer::new(Arc::new(TrainedPredictor::new(
        fast_config(),
        synthetic_dataset(40),
    )));

    assert!(commands::cmd_report(&store, &analyzer, &user_args("alice")).is_ok());
    assert!(commands::cmd_context(
        &store,
        &analyzer,
        &user_args("alice"),
        Some("How big should my emergency fund be?")
    )
    .is_ok());
}

#[test]
fn test_cmd_report_unknown_user_fails() {
    let store = MemoryStore::new();
    let analyzer = FinancialAnalyzer::new(Arc::new(TrainedPredictor::new(
        fast_config(),
        NoDataset,
    )));
    assert!(commands::cmd_report(&store, &analyzer, &user_args("nobody")).is_err());
}

// ========== Profile Command Tests ==========

#[test]
fn test_cmd_profile_save_normalizes() {
    let store = MemoryStore::new();
    let file = write_temp(
        ".json",
        r#"{"net_monthly_income": 40000, "rent_mortgage": 12000, "groceries": 5000,
            "assets_total": 900000, "debts_total": 100000}"#,
    );

    commands::cmd_profile_save(&store, "carol", file.path()).unwrap();

    let saved = store.load_profile("carol").unwrap().unwrap();
    assert_eq!(saved.fixed_costs_total, 17_000.0);
    assert_eq!(saved.total_net_worth, 800_000.0);
}

#[test]
fn test_cmd_profile_save_rejects_invalid() {
    let store = MemoryStore::new();
    let file = write_temp(".json", r#"{"net_monthly_income": -5}"#);

    assert!(commands::cmd_profile_save(&store, "dave", file.path()).is_err());
    assert!(store.load_profile("dave").unwrap().is_none());
}

#[test]
fn test_cmd_profile_show_delete_list() {
    let store = store_with_sample("alice");

    assert!(commands::cmd_profile_list(&store).is_ok());
    assert!(commands::cmd_profile_show(&store, "alice").is_ok());
    assert!(commands::cmd_profile_delete(&store, "alice").is_ok());
    assert!(commands::cmd_profile_show(&store, "alice").is_err());
    // Deleting again is not an error
    assert!(commands::cmd_profile_delete(&store, "alice").is_ok());
}

#[test]
fn test_cmd_profile_sample_stores_for_user() {
    let store = MemoryStore::new();
    commands::cmd_profile_sample(&store, Some("demo")).unwrap();
    assert_eq!(store.list_users().unwrap(), vec!["demo".to_string()]);

    assert!(commands::cmd_profile_sample(&store, None).is_ok());
}

// ========== Training Command Tests ==========

#[test]
fn test_cmd_train_with_csv() {
    let file = write_temp(".csv", &synthetic_csv(50));
    let predictor = TrainedPredictor::new(fast_config(), CsvDatasetSource::new(file.path()));

    commands::cmd_train(&predictor, true).unwrap();
    assert_eq!(predictor.status(), PredictorStatus::Ready);
}

#[test]
fn test_cmd_train_without_dataset_reports_failure() {
    let predictor = TrainedPredictor::new(fast_config(), NoDataset);

    // Degrading is reported, not returned as an error
    assert!(commands::cmd_train(&predictor, false).is_ok());
    assert_eq!(predictor.status(), PredictorStatus::Degraded);
}

#[test]
fn test_cmd_dataset_summary() {
    let file = write_temp(".csv", &synthetic_csv(25));
    assert!(commands::cmd_dataset(file.path(), false).is_ok());
    assert!(commands::cmd_dataset(file.path(), true).is_ok());

    let dir = tempfile::tempdir().unwrap();
    assert!(commands::cmd_dataset(&dir.path().join("missing.csv"), false).is_err());
}
