//! Server command implementation

use std::sync::Arc;

use anyhow::Result;
use finsight_core::{FinancialAnalyzer, ProfileStore, ServerConfig, TrainedPredictor};
use finsight_server::AppState;

pub async fn cmd_serve(
    mut config: ServerConfig,
    store: Arc<dyn ProfileStore>,
    predictor: Arc<TrainedPredictor>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    println!("🚀 Starting Finsight API server...");
    println!("   Profiles:  {} store", store.backend());
    println!("   Dataset:   {}", predictor.source_description());
    println!("   Listening: http://{}:{}", config.host, config.port);
    if config.allowed_origins.is_empty() {
        println!("   CORS:      same-origin only");
    } else {
        println!("   CORS:      {}", config.allowed_origins.join(", "));
    }
    println!();
    println!("   Models train on the first prediction request.");

    let state = AppState::new(store, FinancialAnalyzer::new(predictor));
    finsight_server::serve(state, &config).await
}
