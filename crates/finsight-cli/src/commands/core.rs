//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve configuration with CLI overrides
//! - `open_profile_store` - Open the configured profile store
//! - `build_predictor` - Predictor backed by the configured dataset
//! - `read_profile_file` / `resolve_profile` - Profile input

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use finsight_core::{
    open_store, CsvDatasetSource, FinsightConfig, MemoryStore, ProfileStore, StorageBackend,
    TrainedPredictor, UserFinancialProfile,
};
use serde_json::{Map, Value};

/// Configuration with `--db`, `--dataset` and `--memory` applied
pub fn load_config(
    db: Option<&Path>,
    dataset: Option<&Path>,
    memory: bool,
) -> Result<FinsightConfig> {
    let mut config = FinsightConfig::load().context("Failed to load configuration")?;

    if let Some(path) = db {
        config.storage.db_path = path.to_path_buf();
        config.storage.backend = StorageBackend::Sqlite;
    }
    if let Some(path) = dataset {
        config.dataset_path = path.to_path_buf();
    }
    if memory {
        config.storage.backend = StorageBackend::Memory;
    }

    Ok(config)
}

pub fn open_profile_store(config: &FinsightConfig) -> Arc<dyn ProfileStore> {
    open_store(&config.storage)
}

/// Store for commands that never touch saved profiles
pub fn scratch_store() -> Arc<dyn ProfileStore> {
    Arc::new(MemoryStore::new())
}

pub fn build_predictor(config: &FinsightConfig) -> Arc<TrainedPredictor> {
    Arc::new(TrainedPredictor::new(
        config.predictor,
        CsvDatasetSource::new(config.dataset_path.clone()),
    ))
}

/// Read a profile from a JSON document or a one-row CSV export
pub fn read_profile_file(path: &Path) -> Result<UserFinancialProfile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile file: {}", path.display()))?;

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let profile: UserFinancialProfile = if is_csv {
        serde_json::from_value(csv_profile_document(&content)?)
            .with_context(|| format!("Invalid profile in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid profile JSON in {}", path.display()))?
    };

    Ok(profile)
}

/// First data row of a CSV export as a JSON object; empty cells are skipped
fn csv_profile_document(content: &str) -> Result<Value> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let Some(record) = reader.records().next() else {
        bail!("Profile CSV has no data row");
    };
    let record = record.context("Failed to read CSV row")?;

    let mut doc = Map::new();
    for (key, cell) in headers.iter().zip(record.iter()) {
        if cell.is_empty() {
            continue;
        }
        doc.insert(key.to_string(), csv_cell(cell));
    }

    Ok(Value::Object(doc))
}

fn csv_cell(cell: &str) -> Value {
    if let Ok(n) = cell.parse::<u64>() {
        return Value::from(n);
    }
    match cell.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::from(n),
        _ => Value::from(cell),
    }
}

/// Profile from `--file` or the store entry for `--user`
pub fn resolve_profile(
    store: &dyn ProfileStore,
    file: Option<&PathBuf>,
    user: Option<&str>,
) -> Result<UserFinancialProfile> {
    match (file, user) {
        (Some(path), _) => read_profile_file(path),
        (None, Some(user)) => store
            .load_profile(user)
            .context("Failed to load profile")?
            .with_context(|| format!("No stored profile for user '{}'", user)),
        (None, None) => bail!("Provide --file or --user"),
    }
}

/// Format an amount with thousands separators
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    if rounded < 0.0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
