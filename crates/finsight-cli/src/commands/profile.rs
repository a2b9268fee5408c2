//! Stored profile commands

use std::path::Path;

use anyhow::{Context, Result};
use finsight_core::{store::LAST_UPDATED_KEY, ProfileStore, UserFinancialProfile};
use tracing::info;

use super::{format_amount, print_json, read_profile_file};

/// Validate a profile file, derive its totals and store it
pub fn cmd_profile_save(store: &dyn ProfileStore, user: &str, file: &Path) -> Result<()> {
    let profile = read_profile_file(file)?;
    profile.validate().context("Profile failed validation")?;

    let saved = store
        .save_profile(user, &profile.normalized())
        .context("Failed to save profile")?;
    info!(user = %user, backend = store.backend(), "Saved profile");

    println!("✅ Saved profile for '{}'", user);
    println!("   Net income:   {}", format_amount(saved.net_monthly_income));
    println!("   Fixed costs:  {}", format_amount(saved.fixed_costs_total));
    println!("   Net worth:    {}", format_amount(saved.total_net_worth));
    if let Some(at) = saved.extra.get(LAST_UPDATED_KEY).and_then(|v| v.as_str()) {
        println!("   Updated:      {}", at);
    }
    Ok(())
}

pub fn cmd_profile_show(store: &dyn ProfileStore, user: &str) -> Result<()> {
    let profile = store
        .load_profile(user)
        .context("Failed to load profile")?
        .with_context(|| format!("No stored profile for user '{}'", user))?;
    print_json(&profile)
}

pub fn cmd_profile_delete(store: &dyn ProfileStore, user: &str) -> Result<()> {
    if store.delete_profile(user).context("Failed to delete profile")? {
        println!("🗑️  Deleted profile for '{}'", user);
    } else {
        println!("No stored profile for '{}'", user);
    }
    Ok(())
}

pub fn cmd_profile_list(store: &dyn ProfileStore) -> Result<()> {
    let users = store.list_users().context("Failed to list profiles")?;

    if users.is_empty() {
        println!("No stored profiles ({} store)", store.backend());
        return Ok(());
    }

    println!("👥 Stored profiles ({})", users.len());
    println!("   ─────────────────────────────────────");
    for user in users {
        println!("   {}", user);
    }
    Ok(())
}

/// Print the sample profile, or store it when a user id is given
pub fn cmd_profile_sample(store: &dyn ProfileStore, user: Option<&str>) -> Result<()> {
    let sample = UserFinancialProfile::sample();

    match user {
        Some(user) => {
            store
                .save_profile(user, &sample.normalized())
                .context("Failed to save sample profile")?;
            println!("✅ Stored the sample profile for '{}'", user);
            Ok(())
        }
        None => print_json(&sample),
    }
}
