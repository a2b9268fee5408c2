//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Finsight - Financial health scoring and projections
#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Personal finance health score, risk factors and growth projections", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (overrides config and FINSIGHT_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Reference dataset CSV used for training (overrides config and FINSIGHT_DATASET)
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Keep profiles in memory only (nothing is written to disk)
    #[arg(long, global = true)]
    pub memory: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to read the profile from
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Profile file (.json, or .csv with a header row)
    #[arg(short, long, conflicts_with = "user", required_unless_present = "user")]
    pub file: Option<PathBuf>,

    /// Stored profile user id
    #[arg(short, long)]
    pub user: Option<String>,

    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show financial ratios
    Ratios(ProfileArgs),

    /// Show the 0-100 financial health score
    Score(ProfileArgs),

    /// Show the five risk factors and mitigation suggestions
    Risk(ProfileArgs),

    /// Project savings and investments over 1, 3 and 10 years
    ///
    /// Trains the models from the reference dataset first. Without a dataset
    /// the projections use neutral defaults. Predictions for a stored user
    /// are saved alongside the profile.
    Predict(ProfileArgs),

    /// Full dashboard report (score, risks, insights, projections)
    Report(ProfileArgs),

    /// Structured context for an external advisor
    Context {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Question being asked, used to tag the topic
        #[arg(short, long)]
        question: Option<String>,
    },

    /// Train the models and show the training report
    Train {
        /// Also print per-model feature importances
        #[arg(long)]
        importance: bool,
    },

    /// Summarize the reference dataset
    Dataset {
        /// Summarize after filling gaps and capping outliers
        #[arg(long)]
        cleaned: bool,
    },

    /// Manage stored profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Start the API server
    Serve {
        /// Port to listen on (defaults to config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config)
        #[arg(long)]
        host: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Validate and store a profile from a file
    Save {
        /// User id to store under
        user: String,

        /// Profile file (.json, or .csv with a header row)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print a stored profile as JSON
    Show {
        /// User id
        user: String,
    },

    /// Delete a stored profile and its predictions
    Delete {
        /// User id
        user: String,
    },

    /// List stored user ids
    List,

    /// Print the sample profile, or store it for a user
    Sample {
        /// Store the sample under this user id instead of printing it
        #[arg(short, long)]
        user: Option<String>,
    },
}
