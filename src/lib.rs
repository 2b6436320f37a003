// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod recommend;
pub mod store;
pub mod taxonomy;
pub mod telemetry;
pub mod urgency;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::pipeline::{Analyzer, CombinedAnalysis, IncidentInput};
pub use crate::recommend::{Recommendation, Recommender, RecommenderTables, SentimentHintPolicy};
pub use crate::taxonomy::Category;
pub use crate::urgency::UrgencyLevel;

use axum::Router;

/// Build the full application router from `AppConfig::from_env()`.
/// Used by the Shuttle entrypoint and by integration tests.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = config::AppConfig::from_env()?;
    let state = AppState::from_config(&cfg)?;
    Ok(router(state))
}
