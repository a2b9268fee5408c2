//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analysis;
pub mod health;
pub mod model;
pub mod profiles;

// Re-export all handlers for use in router
pub use analysis::*;
pub use health::*;
pub use model::*;
pub use profiles::*;

use crate::AppError;

/// Run CPU-bound engine work off the async workers
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await?)
}
