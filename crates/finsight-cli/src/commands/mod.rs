//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Profile analysis commands (ratios, score, risk, predict, report, context)
//! - `core` - Shared utilities (config, store, predictor, profile input)
//! - `profile` - Stored profile management (save, show, delete, list, sample)
//! - `serve` - Web server command
//! - `train` - Model training and reference dataset summary

pub mod analyze;
pub mod core;
pub mod profile;
pub mod serve;
pub mod train;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use profile::*;
pub use serve::*;
pub use train::*;
