use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub const ANALYSES_TOTAL: &str = "incident_analyses_total";
pub const DEGRADED_TOTAL: &str = "incident_collaborator_degraded_total";
pub const URGENCY_TOTAL: &str = "incident_calculated_urgency_total";
pub const ANALYSIS_DURATION_MS: &str = "incident_analysis_duration_ms";
pub const CREATED_TOTAL: &str = "incidents_created_total";
pub const DOCUMENTS_TOTAL: &str = "incident_documents_processed_total";

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process; later calls reuse it.
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| {
                let handle = match PrometheusBuilder::new().install_recorder() {
                    Ok(h) => h,
                    Err(e) => {
                        // Another recorder is already global; keep a detached
                        // handle so /metrics still renders.
                        tracing::warn!(error = %e, "prometheus recorder not installed");
                        PrometheusBuilder::new().build_recorder().handle()
                    }
                };
                describe();
                handle
            })
            .clone();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!(ANALYSES_TOTAL, "Incident analyses performed.");
    describe_counter!(
        DEGRADED_TOTAL,
        "Collaborator calls that fell back to a default, by stage."
    );
    describe_counter!(URGENCY_TOTAL, "Calculated urgency of analysed incidents.");
    describe_histogram!(ANALYSIS_DURATION_MS, "End-to-end analysis time in milliseconds.");
    describe_counter!(CREATED_TOTAL, "Incidents appended to the log.");
    describe_counter!(DOCUMENTS_TOTAL, "Uploaded documents run through text extraction.");
}
