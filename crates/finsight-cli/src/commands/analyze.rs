//! Profile analysis commands (ratios, score, risk, predict, report, context)

use anyhow::{Context, Result};
use chrono::Utc;
use finsight_core::{
    compute_ratios, compute_risk_factors, generate_predictions, health_status_label,
    risk::{assess, mitigation_suggestions},
    scoring::score_breakdown,
    AdvisorContext, FinancialAnalyzer, FinancialReport, PredictionSet, ProfileStore,
    StoredPredictions, TrainedPredictor,
};

use super::{format_amount, print_json, resolve_profile};
use crate::cli::ProfileArgs;

pub fn cmd_ratios(store: &dyn ProfileStore, args: &ProfileArgs) -> Result<()> {
    let profile = resolve_profile(store, args.file.as_ref(), args.user.as_deref())?;
    let ratios = compute_ratios(&profile);

    if args.json {
        return print_json(&ratios);
    }

    println!("📐 Financial Ratios");
    println!("   ─────────────────────────────────────");
    let map = ratios.to_map();
    if map.is_empty() {
        println!("   No ratios available (income and assets are zero)");
        return Ok(());
    }
    for (name, value) in map {
        println!("   {:<24} {:>10.2}", name, value);
    }
    Ok(())
}

pub fn cmd_score(store: &dyn ProfileStore, args: &ProfileArgs) -> Result<()> {
    let profile = resolve_profile(store, args.file.as_ref(), args.user.as_deref())?;
    let breakdown = score_breakdown(&profile);
    let score = breakdown.total();
    let status = health_status_label(score);

    if args.json {
        return print_json(&serde_json::json!({
            "health_score": score,
            "health_status": status,
            "breakdown": breakdown,
        }));
    }

    println!("💯 Financial Health Score: {:.1} / 100 ({})", score, status);
    println!("   ─────────────────────────────────────");
    println!("   Income          {:>6.1} / 20", breakdown.income);
    println!("   Savings         {:>6.1} / 25", breakdown.savings);
    println!("   Debt            {:>6.1} / 20", breakdown.debt);
    println!("   Emergency fund  {:>6.1} / 15", breakdown.emergency_fund);
    println!("   Investment      {:>6.1} / 20", breakdown.investment);
    Ok(())
}

pub fn cmd_risk(store: &dyn ProfileStore, args: &ProfileArgs) -> Result<()> {
    let profile = resolve_profile(store, args.file.as_ref(), args.user.as_deref())?;
    let factors = compute_risk_factors(&profile);

    if args.json {
        return print_json(&factors);
    }

    println!("⚠️  Risk Factors (0 = safe, 10 = severe)");
    println!("   ─────────────────────────────────────");
    for risk in assess(&factors) {
        println!(
            "   {:<20} {:>5.1}  {}",
            risk.category.as_str(), risk.score, risk.severity
        );
    }

    let mitigation = mitigation_suggestions(&factors);
    if !mitigation.is_empty() {
        println!();
        println!("🛡️  Mitigation");
        for m in mitigation {
            println!("   • {}: {}", m.category, m.suggestion);
        }
    }
    Ok(())
}

pub fn cmd_predict(
    store: &dyn ProfileStore,
    predictor: &TrainedPredictor,
    args: &ProfileArgs,
) -> Result<()> {
    let profile = resolve_profile(store, args.file.as_ref(), args.user.as_deref())?;
    let predictions = generate_predictions(&profile, predictor);

    // Only profiles loaded from the store get their predictions saved
    if let (None, Some(user)) = (&args.file, args.user.as_deref()) {
        store
            .save_predictions(
                user,
                &StoredPredictions {
                    predictions,
                    generated_at: Utc::now(),
                },
            )
            .context("Failed to save predictions")?;
    }

    if args.json {
        return print_json(&predictions);
    }

    if let Some(reason) = predictor.degraded_reason() {
        println!("⚠️  Using neutral defaults: {}", reason);
        println!();
    }
    print_projections(&predictions);
    Ok(())
}

pub fn cmd_report(
    store: &dyn ProfileStore,
    analyzer: &FinancialAnalyzer,
    args: &ProfileArgs,
) -> Result<()> {
    let profile = resolve_profile(store, args.file.as_ref(), args.user.as_deref())?;
    let report = analyzer.analyze(&profile);

    if args.json {
        return print_json(&report);
    }

    print_report(&report);
    Ok(())
}

pub fn cmd_context(
    store: &dyn ProfileStore,
    analyzer: &FinancialAnalyzer,
    args: &ProfileArgs,
    question: Option<&str>,
) -> Result<()> {
    let profile = resolve_profile(store, args.file.as_ref(), args.user.as_deref())?;
    let report = analyzer.analyze(&profile);

    let mut context = AdvisorContext::assemble(&profile, &report);
    if let Some(q) = question {
        context = context.for_question(q);
    }

    if args.json {
        return print_json(&context);
    }

    println!("🧭 Advisor Context");
    println!("   ─────────────────────────────────────");
    let mut vars: Vec<_> = context.to_template_vars().into_iter().collect();
    vars.sort_by_key(|(k, _)| *k);
    for (key, value) in vars {
        let mut lines = value.lines();
        println!("   {:<18} {}", key, lines.next().unwrap_or(""));
        for line in lines {
            println!("   {:<18} {}", "", line);
        }
    }
    if !context.model_backed {
        println!();
        println!("   ⚠️  Projections use neutral defaults (no trained model)");
    }
    Ok(())
}

fn print_projections(predictions: &PredictionSet) {
    println!("📈 Projections");
    println!("   ─────────────────────────────────────────────────────");
    println!(
        "   {:<10} {:>14} {:>14} {:>6}  Status",
        "Horizon", "Savings", "Investments", "Risk"
    );
    for (horizon, p) in predictions.iter() {
        println!(
            "   {:<10} {:>14} {:>14} {:>6.1}  {}",
            horizon.to_string(),
            format_amount(p.savings_growth),
            format_amount(p.investment_returns),
            p.risk_score,
            p.health_status
        );
    }
}

fn print_report(report: &FinancialReport) {
    println!("📊 Financial Report");
    println!("   ─────────────────────────────────────");
    println!(
        "   Health score: {:.1} / 100 ({})",
        report.health_score, report.health_status
    );

    let budget = &report.budget;
    println!();
    println!("💰 Budget");
    println!("   Income:     {}", format_amount(budget.income));
    println!(
        "   Expenses:   {} ({:.1}%)",
        format_amount(budget.expenses),
        budget.expenses_pct
    );
    println!(
        "   Remaining:  {} ({:.1}%)",
        format_amount(budget.remaining),
        budget.remaining_pct
    );
    println!("   {}", budget.verdict.message());

    if report.expense_groups.total() > 0.0 {
        println!();
        println!("🧾 Expenses by group");
        for (group, amount) in report.expense_groups.entries() {
            if amount > 0.0 {
                println!("   {:<16} {:>12}", group, format_amount(amount));
            }
        }
    }

    println!();
    println!("⚠️  Risks");
    for risk in &report.risks {
        println!(
            "   {:<20} {:>5.1}  {}",
            risk.category.as_str(), risk.score, risk.severity
        );
    }

    if !report.action_items.is_empty() {
        println!();
        println!("✅ Action items");
        for item in &report.action_items {
            println!("   • {}", item.message());
        }
    }

    let allocation = &report.allocation;
    println!();
    println!(
        "🥧 Suggested allocation: {}% equity / {}% debt ({} risk appetite)",
        allocation.equity_pct, allocation.debt_pct, allocation.risk_appetite
    );

    println!();
    print_projections(&report.predictions);
    if report.baseline.is_neutral() {
        println!("   (neutral defaults, no trained model)");
    }
}
