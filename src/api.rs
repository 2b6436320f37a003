use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::analyze::{
    DocumentProcessor, HfInferenceClient, HfSentiment, HfZeroShotClassifier, IncidentClassifier,
    LexicalClassifier, LexiconSentiment, PatternEntityExtractor, SentimentScorer,
    TesseractExtractor,
};
use crate::config::{AppConfig, Backend};
use crate::error::ApiError;
use crate::metrics::{self as m, Metrics};
use crate::pipeline::{Analyzer, CombinedAnalysis, IncidentInput};
use crate::recommend::{load_tables_file, Recommender, RecommenderTables};
use crate::store::{Incident, IncidentMetrics, IncidentStatus, IncidentStore, NewIncident};
use crate::taxonomy::Category;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub store: Arc<IncidentStore>,
    pub documents: Arc<DocumentProcessor>,
    pub metrics: Metrics,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire collaborators for the configured backend.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let tables = match &cfg.tables_path {
            Some(path) => load_tables_file(path)?,
            None => RecommenderTables::builtin(),
        };
        let recommender =
            Recommender::new(Arc::new(tables)).with_hint_policy(cfg.sentiment_hint_policy);

        let (classifier, sentiment): (Arc<dyn IncidentClassifier>, Arc<dyn SentimentScorer>) =
            match cfg.backend {
                Backend::Local => (
                    Arc::new(LexicalClassifier::new()),
                    Arc::new(LexiconSentiment::new()),
                ),
                Backend::HuggingFace => {
                    let client = HfInferenceClient::from_config(&cfg.hf)?;
                    (
                        Arc::new(HfZeroShotClassifier::new(
                            client.clone(),
                            cfg.hf.classifier_model.clone(),
                        )),
                        Arc::new(HfSentiment::new(client, cfg.hf.sentiment_model.clone())),
                    )
                }
            };

        let analyzer = Analyzer::new(
            classifier,
            sentiment,
            Arc::new(PatternEntityExtractor::new()),
            Arc::new(recommender),
        )
        .with_entity_filter(cfg.entity_filter());

        let documents = DocumentProcessor::new(&cfg.upload_dir, Arc::new(TesseractExtractor::new()))
            .map_err(|e| {
                anyhow::anyhow!("creating upload dir {}: {e}", cfg.upload_dir.display())
            })?;

        info!(
            backend = ?cfg.backend,
            hint_policy = ?cfg.sentiment_hint_policy,
            upload_dir = %cfg.upload_dir.display(),
            "incident analyzer ready"
        );

        Ok(Self {
            analyzer: Arc::new(analyzer),
            store: Arc::new(IncidentStore::new()),
            documents: Arc::new(documents),
            metrics: Metrics::init(),
            max_upload_bytes: cfg.max_upload_bytes,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let metrics: Router = state.metrics.router();
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/incidents", get(list_incidents))
        .route("/incidents/analyze", post(analyze_incident))
        .route("/incidents/create", post(create_incident))
        .route("/incidents/metrics", get(incident_metrics))
        .route("/incidents/{id}", get(get_incident))
        .route("/incidents/{id}/status", post(update_status))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
        .merge(metrics)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}

async fn analyze_incident(
    State(state): State<AppState>,
    body: Result<Json<IncidentInput>, JsonRejection>,
) -> Result<Json<CombinedAnalysis>, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(state.analyzer.analyze(&input).await))
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

async fn create_incident(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Incident>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut title = None;
    let mut description = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await.map_err(|e| ApiError::BadRequest(e.body_text()))?),
            "description" => {
                description = Some(field.text().await.map_err(|e| ApiError::BadRequest(e.body_text()))?)
            }
            "documents" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                // An empty file part is how clients send "no documents".
                if !bytes.is_empty() {
                    uploads.push(Upload {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            other => debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let title = title.ok_or_else(|| ApiError::BadRequest("missing field: title".into()))?;
    let description =
        description.ok_or_else(|| ApiError::BadRequest("missing field: description".into()))?;

    let input = IncidentInput { title, description };
    let analysis = state.analyzer.analyze(&input).await;

    let id = state.store.reserve_id();
    let mut documents = Vec::with_capacity(uploads.len());
    for up in &uploads {
        let (summary, _text) = state
            .documents
            .process(id, &up.filename, &up.bytes)
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("saving upload: {e}")))?;
        counter!(m::DOCUMENTS_TOTAL).increment(1);
        documents.push(summary);
    }

    let incident = state.store.create_with_id(
        id,
        NewIncident {
            title: input.title,
            description: input.description,
            category: analysis.category,
            urgency_level: analysis.urgency_level,
            documents,
        },
    );
    counter!(m::CREATED_TOTAL).increment(1);
    info!(
        id = incident.id,
        category = %incident.category,
        urgency = %incident.urgency_level,
        documents = incident.document_count,
        "incident created"
    );
    Ok(Json(incident))
}

async fn list_incidents(State(state): State<AppState>) -> Json<Vec<Incident>> {
    Json(state.store.list())
}

async fn get_incident(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Incident>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    state.store.get(id).map(Json).ok_or(ApiError::NotFound(id))
}

#[derive(serde::Deserialize)]
struct StatusReq {
    status: IncidentStatus,
}

async fn update_status(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<StatusReq>, JsonRejection>,
) -> Result<Json<Incident>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let incident = state
        .store
        .update_status(id, req.status)
        .ok_or(ApiError::NotFound(id))?;
    info!(id, status = ?incident.status, "incident status updated");
    Ok(Json(incident))
}

async fn incident_metrics(State(state): State<AppState>) -> Json<IncidentMetrics> {
    Json(state.store.metrics(&Category::labels()))
}
