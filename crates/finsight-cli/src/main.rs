//! Finsight CLI - Financial health scoring and projections
//!
//! Usage:
//!   finsight score --file profile.json     Health score for a profile file
//!   finsight profile save alice -f p.json  Store a profile
//!   finsight report --user alice           Full dashboard report
//!   finsight train --importance            Train models on the reference dataset
//!   finsight serve --port 3030             Start the API server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use finsight_core::FinancialAnalyzer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.db.as_deref(), cli.dataset.as_deref(), cli.memory)?;

    match cli.command {
        Commands::Ratios(args) => {
            let store = profile_store(&config, &args);
            commands::cmd_ratios(store.as_ref(), &args)
        }
        Commands::Score(args) => {
            let store = profile_store(&config, &args);
            commands::cmd_score(store.as_ref(), &args)
        }
        Commands::Risk(args) => {
            let store = profile_store(&config, &args);
            commands::cmd_risk(store.as_ref(), &args)
        }
        Commands::Predict(args) => {
            let store = profile_store(&config, &args);
            let predictor = commands::build_predictor(&config);
            commands::cmd_predict(store.as_ref(), &predictor, &args)
        }
        Commands::Report(args) => {
            let store = profile_store(&config, &args);
            let analyzer = FinancialAnalyzer::new(commands::build_predictor(&config));
            commands::cmd_report(store.as_ref(), &analyzer, &args)
        }
        Commands::Context { profile, question } => {
            let store = profile_store(&config, &profile);
            let analyzer = FinancialAnalyzer::new(commands::build_predictor(&config));
            commands::cmd_context(store.as_ref(), &analyzer, &profile, question.as_deref())
        }
        Commands::Train { importance } => {
            let predictor = commands::build_predictor(&config);
            commands::cmd_train(&predictor, importance)
        }
        Commands::Dataset { cleaned } => commands::cmd_dataset(&config.dataset_path, cleaned),
        Commands::Profile { action } => {
            let store = commands::open_profile_store(&config);
            match action {
                ProfileAction::Save { user, file } => {
                    commands::cmd_profile_save(store.as_ref(), &user, &file)
                }
                ProfileAction::Show { user } => commands::cmd_profile_show(store.as_ref(), &user),
                ProfileAction::Delete { user } => {
                    commands::cmd_profile_delete(store.as_ref(), &user)
                }
                ProfileAction::List => commands::cmd_profile_list(store.as_ref()),
                ProfileAction::Sample { user } => {
                    commands::cmd_profile_sample(store.as_ref(), user.as_deref())
                }
            }
        }
        Commands::Serve { port, host } => {
            let store = commands::open_profile_store(&config);
            let predictor = commands::build_predictor(&config);
            commands::cmd_serve(config.server, store, predictor, host, port).await
        }
    }
}

/// Profile files never touch the database
fn profile_store(
    config: &finsight_core::FinsightConfig,
    args: &ProfileArgs,
) -> std::sync::Arc<dyn finsight_core::ProfileStore> {
    if args.file.is_some() {
        commands::scratch_store()
    } else {
        commands::open_profile_store(config)
    }
}
