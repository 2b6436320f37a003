//! Trade Incident Analyzer: binary entrypoint
//! Boots the Axum HTTP server with analysis, incident and metrics routes.

use shuttle_axum::ShuttleAxum;
use trade_incident_analyzer::telemetry;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    let router = trade_incident_analyzer::app().await?;
    Ok(router.into())
}
