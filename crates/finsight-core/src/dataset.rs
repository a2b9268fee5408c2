//! Reference dataset used to train the predictor
//!
//! Records come from a CSV export with the same field names as the profile
//! form plus observed targets. Every column is optional: blank or
//! unparseable numbers load as missing, and unknown columns are ignored.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::ml::CategoricalColumn;

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().replace(',', "").parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}

fn lenient_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// One historical household from the reference dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceRecord {
    #[serde(deserialize_with = "lenient_number")]
    pub household_size: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub number_of_kids: Option<f64>,
    #[serde(deserialize_with = "lenient_label")]
    pub income_type: Option<String>,
    #[serde(deserialize_with = "lenient_label")]
    pub class: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub gross_monthly_income: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub net_monthly_income: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub assets_total: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub investments_total: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub savings_total: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub debts_total: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub fixed_costs_total: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub insurance: Option<f64>,
    #[serde(deserialize_with = "lenient_label")]
    pub financial_stress: Option<String>,
    #[serde(deserialize_with = "lenient_label")]
    pub owns_home: Option<String>,
    #[serde(deserialize_with = "lenient_label")]
    pub user_goals: Option<String>,
}

/// Numeric columns of a reference record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    HouseholdSize,
    NumberOfKids,
    GrossMonthlyIncome,
    NetMonthlyIncome,
    AssetsTotal,
    InvestmentsTotal,
    SavingsTotal,
    DebtsTotal,
    FixedCostsTotal,
    Insurance,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 10] = [
        Self::HouseholdSize,
        Self::NumberOfKids,
        Self::GrossMonthlyIncome,
        Self::NetMonthlyIncome,
        Self::AssetsTotal,
        Self::InvestmentsTotal,
        Self::SavingsTotal,
        Self::DebtsTotal,
        Self::FixedCostsTotal,
        Self::Insurance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HouseholdSize => "household_size",
            Self::NumberOfKids => "number_of_kids",
            Self::GrossMonthlyIncome => "gross_monthly_income",
            Self::NetMonthlyIncome => "net_monthly_income",
            Self::AssetsTotal => "assets_total",
            Self::InvestmentsTotal => "investments_total",
            Self::SavingsTotal => "savings_total",
            Self::DebtsTotal => "debts_total",
            Self::FixedCostsTotal => "fixed_costs_total",
            Self::Insurance => "insurance",
        }
    }
}

impl ReferenceRecord {
    pub fn numeric(&self, column: NumericColumn) -> Option<f64> {
        *self.slot(column)
    }

    fn slot(&self, column: NumericColumn) -> &Option<f64> {
        match column {
            NumericColumn::HouseholdSize => &self.household_size,
            NumericColumn::NumberOfKids => &self.number_of_kids,
            NumericColumn::GrossMonthlyIncome => &self.gross_monthly_income,
            NumericColumn::NetMonthlyIncome => &self.net_monthly_income,
            NumericColumn::AssetsTotal => &self.assets_total,
            NumericColumn::InvestmentsTotal => &self.investments_total,
            NumericColumn::SavingsTotal => &self.savings_total,
            NumericColumn::DebtsTotal => &self.debts_total,
            NumericColumn::FixedCostsTotal => &self.fixed_costs_total,
            NumericColumn::Insurance => &self.insurance,
        }
    }

    fn slot_mut(&mut self, column: NumericColumn) -> &mut Option<f64> {
        match column {
            NumericColumn::HouseholdSize => &mut self.household_size,
            NumericColumn::NumberOfKids => &mut self.number_of_kids,
            NumericColumn::GrossMonthlyIncome => &mut self.gross_monthly_income,
            NumericColumn::NetMonthlyIncome => &mut self.net_monthly_income,
            NumericColumn::AssetsTotal => &mut self.assets_total,
            NumericColumn::InvestmentsTotal => &mut self.investments_total,
            NumericColumn::SavingsTotal => &mut self.savings_total,
            NumericColumn::DebtsTotal => &mut self.debts_total,
            NumericColumn::FixedCostsTotal => &mut self.fixed_costs_total,
            NumericColumn::Insurance => &mut self.insurance,
        }
    }

    /// Raw label of a categorical column
    pub fn label(&self, column: CategoricalColumn) -> Option<&str> {
        match column {
            CategoricalColumn::IncomeType => self.income_type.as_deref(),
            CategoricalColumn::Class => self.class.as_deref(),
            CategoricalColumn::FinancialStress => self.financial_stress.as_deref(),
            CategoricalColumn::OwnsHome => self.owns_home.as_deref(),
            CategoricalColumn::UserGoals => self.user_goals.as_deref(),
        }
    }

    fn label_mut(&mut self, column: CategoricalColumn) -> &mut Option<String> {
        match column {
            CategoricalColumn::IncomeType => &mut self.income_type,
            CategoricalColumn::Class => &mut self.class,
            CategoricalColumn::FinancialStress => &mut self.financial_stress,
            CategoricalColumn::OwnsHome => &mut self.owns_home,
            CategoricalColumn::UserGoals => &mut self.user_goals,
        }
    }

    /// Whether the household reported financial stress
    pub fn is_stressed(&self) -> bool {
        self.financial_stress
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("yes"))
    }
}

/// Descriptive statistics for one numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Non-missing values
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (0 for a single value)
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDataset {
    records: Vec<ReferenceRecord>,
}

impl ReferenceDataset {
    pub fn from_records(records: Vec<ReferenceRecord>) -> Self {
        Self { records }
    }

    /// Parse a headed CSV stream
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize() {
            let record: ReferenceRecord = row?;
            records.push(record);
        }

        debug!(rows = records.len(), "Parsed reference dataset");
        Ok(Self { records })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn present(&self, column: NumericColumn) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.numeric(column)).collect()
    }

    /// Mean, median, spread and range of every numeric column with data
    pub fn summary(&self) -> BTreeMap<&'static str, ColumnSummary> {
        let mut summary = BTreeMap::new();

        for column in NumericColumn::ALL {
            let mut values = self.present(column);
            if values.is_empty() {
                continue;
            }
            values.sort_by(f64::total_cmp);

            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = if values.len() > 1 {
                let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
                (ss / (n - 1.0)).sqrt()
            } else {
                0.0
            };

            summary.insert(
                column.as_str(),
                ColumnSummary {
                    count: values.len(),
                    mean,
                    median: quantile(&values, 0.5),
                    std,
                    min: values[0],
                    max: values[values.len() - 1],
                },
            );
        }

        summary
    }

    /// Fill gaps and cap outliers.
    ///
    /// Missing numbers take the column median and missing labels the most
    /// frequent label. Numbers are then clipped to 1.5 IQR beyond the
    /// quartiles.
    pub fn cleaned(&self) -> Self {
        let mut records = self.records.clone();

        for column in NumericColumn::ALL {
            let mut values = self.present(column);
            if values.is_empty() {
                continue;
            }
            values.sort_by(f64::total_cmp);

            let median = quantile(&values, 0.5);
            let q1 = quantile(&values, 0.25);
            let q3 = quantile(&values, 0.75);
            let iqr = q3 - q1;
            let (lower, upper) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

            for record in &mut records {
                let slot = record.slot_mut(column);
                let value = slot.unwrap_or(median);
                *slot = Some(value.clamp(lower, upper));
            }
        }

        for column in CategoricalColumn::ALL {
            let mode = {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for label in records.iter().filter_map(|r| r.label(column)) {
                    *counts.entry(label).or_default() += 1;
                }
                // Ties go to the alphabetically first label
                counts
                    .into_iter()
                    .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
                    .map(|(label, _)| label.to_string())
            };
            let Some(mode) = mode else {
                continue;
            };

            for record in &mut records {
                record.label_mut(column).get_or_insert_with(|| mode.clone());
            }
        }

        Self { records }
    }
}

/// Linear-interpolation quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Supplies the reference dataset to the predictor
pub trait DatasetSource: Send + Sync {
    fn load(&self) -> Result<ReferenceDataset>;

    /// Human readable origin, for logs
    fn describe(&self) -> String;
}

/// Dataset read from a CSV file on each load
#[derive(Debug, Clone)]
pub struct CsvDatasetSource {
    path: PathBuf,
}

impl CsvDatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for CsvDatasetSource {
    fn load(&self) -> Result<ReferenceDataset> {
        if !self.path.exists() {
            return Err(Error::TrainingDataUnavailable(format!(
                "{} does not exist",
                self.path.display()
            )));
        }

        let dataset = ReferenceDataset::from_path(&self.path).map_err(|e| {
            Error::TrainingDataUnavailable(format!("{}: {}", self.path.display(), e))
        })?;

        info!(path = %self.path.display(), rows = dataset.len(), "Loaded reference dataset");
        Ok(dataset)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl DatasetSource for ReferenceDataset {
    fn load(&self) -> Result<ReferenceDataset> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory dataset ({} rows)", self.len())
    }
}

/// Source used when no dataset is configured; training always degrades
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDataset;

impl DatasetSource for NoDataset {
    fn load(&self) -> Result<ReferenceDataset> {
        Err(Error::TrainingDataUnavailable(
            "no reference dataset configured".to_string(),
        ))
    }

    fn describe(&self) -> String {
        "none".to_string()
    }
}
