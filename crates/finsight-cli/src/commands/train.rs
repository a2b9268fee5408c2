//! Model training and reference dataset commands

use std::path::Path;

use anyhow::{Context, Result};
use finsight_core::{ReferenceDataset, TrainedPredictor};

/// Train the models and print the evaluation report
pub fn cmd_train(predictor: &TrainedPredictor, importance: bool) -> Result<()> {
    println!("🧠 Training models...");
    println!("   Dataset: {}", predictor.source_description());
    println!("   Trees:   {}", predictor.config().forest.n_trees);
    println!();

    if predictor.retrain().is_none() {
        let reason = predictor
            .degraded_reason()
            .unwrap_or_else(|| "unknown error".to_string());
        println!("⚠️  Training failed: {}", reason);
        println!("   Predictions will use neutral defaults until training succeeds.");
        return Ok(());
    }

    let Some(report) = predictor.training_report() else {
        return Ok(());
    };

    println!("✅ Training complete in {} ms", report.duration_ms);
    println!("   ─────────────────────────────────────");
    println!(
        "   Rows:              {} ({} train / {} test)",
        report.rows, report.train_rows, report.test_rows
    );
    println!("   Stressed share:    {:.1}%", report.stressed_share * 100.0);
    println!("   Expense RMSE:      {:.2}", report.expense_rmse);
    println!("   Investment RMSE:   {:.2}", report.investment_rmse);
    println!("   Insurance RMSE:    {:.2}", report.insurance_rmse);
    println!("   Risk accuracy:     {:.1}%", report.risk_accuracy * 100.0);

    if importance {
        if let Some(importances) = predictor.feature_importance() {
            for (model, features) in importances {
                let mut ranked: Vec<_> = features.into_iter().collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

                println!();
                println!("   {} model", model);
                for (feature, weight) in ranked {
                    println!("     {:<22} {:>6.3}", feature, weight);
                }
            }
        }
    }

    Ok(())
}

/// Summarize the numeric columns of the reference dataset
pub fn cmd_dataset(path: &Path, cleaned: bool) -> Result<()> {
    let dataset = ReferenceDataset::from_path(path)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))?;
    let dataset = if cleaned { dataset.cleaned() } else { dataset };

    println!("🗂️  Reference dataset: {}", path.display());
    println!("   Rows: {}{}", dataset.len(), if cleaned { " (cleaned)" } else { "" });
    println!("   ─────────────────────────────────────────────────────────────────");
    println!(
        "   {:<22} {:>6} {:>12} {:>12} {:>12} {:>12}",
        "Column", "Count", "Mean", "Median", "Min", "Max"
    );

    for (column, s) in dataset.summary() {
        println!(
            "   {:<22} {:>6} {:>12.1} {:>12.1} {:>12.1} {:>12.1}",
            column, s.count, s.mean, s.median, s.min, s.max
        );
    }

    Ok(())
}
