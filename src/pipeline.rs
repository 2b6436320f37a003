// src/pipeline.rs
//! Analysis orchestrator.
//!
//! Order:
//! 1) classifier, sentiment scorer and entity extractor run concurrently over
//!    the same input (no ordering between them)
//! 2) failed collaborators are replaced by their documented defaults and
//!    reported in `degraded`
//! 3) the recommendation engine turns category + text into actions and an
//!    SLA-bounded resolution estimate

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::analyze::{
    urgency_hint, Classification, Degradation, EntityExtractor, EntityType, IncidentClassifier,
    LexicalClassifier, LexiconSentiment, Outcome, PatternEntityExtractor, SentimentScore,
    SentimentScorer, Stage,
};
use crate::metrics as m;
use crate::recommend::Recommender;
use crate::taxonomy::Category;
use crate::telemetry::fingerprint;
use crate::urgency::UrgencyLevel;

/// Confidence reported with the fallback category.
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, Deserialize)]
pub struct IncidentInput {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub entity: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedAnalysis {
    pub category: String,
    pub confidence: f32,
    pub sentiment: String,
    /// Sentiment-derived urgency hint.
    pub urgency_level: UrgencyLevel,
    /// Urgency the recommendation engine used for the SLA and estimate.
    pub calculated_urgency: UrgencyLevel,
    pub entities: Option<Vec<Entity>>,
    pub recommended_actions: Vec<String>,
    pub estimated_resolution_time: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<Degradation>,
}

pub struct Analyzer {
    classifier: Arc<dyn IncidentClassifier>,
    sentiment: Arc<dyn SentimentScorer>,
    entities: Arc<dyn EntityExtractor>,
    recommender: Arc<Recommender>,
    labels: Vec<String>,
    entity_filter: Vec<EntityType>,
}

impl Default for Analyzer {
    /// Offline collaborators, built-in tables.
    fn default() -> Self {
        Self::new(
            Arc::new(LexicalClassifier::new()),
            Arc::new(LexiconSentiment::new()),
            Arc::new(PatternEntityExtractor::new()),
            Arc::new(Recommender::default()),
        )
    }
}

impl Analyzer {
    pub fn new(
        classifier: Arc<dyn IncidentClassifier>,
        sentiment: Arc<dyn SentimentScorer>,
        entities: Arc<dyn EntityExtractor>,
        recommender: Arc<Recommender>,
    ) -> Self {
        Self {
            classifier,
            sentiment,
            entities,
            recommender,
            labels: Category::labels(),
            entity_filter: vec![EntityType::TrackingId, EntityType::Product],
        }
    }

    pub fn with_entity_filter(mut self, filter: Vec<EntityType>) -> Self {
        self.entity_filter = filter;
        self
    }

    /// Candidate labels handed to the classifier (taxonomy order).
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn recommender(&self) -> &Recommender {
        &self.recommender
    }

    pub async fn analyze(&self, input: &IncidentInput) -> CombinedAnalysis {
        let started = Instant::now();
        let full_text = format!("{} {}", input.title, input.description);

        let (classified, scored, extracted) = tokio::join!(
            self.classifier.classify(&input.title, &input.description, &self.labels),
            self.sentiment.score(&full_text),
            self.entities.extract(&full_text),
        );

        let mut degraded = Vec::new();

        let (classification, d) = Outcome::or_default_with(classified, || Classification {
            label: Category::FALLBACK.as_str().to_string(),
            confidence: FALLBACK_CONFIDENCE,
        })
        .into_parts(Stage::Classifier);
        degraded.extend(d);

        let (sentiment, d) =
            Outcome::or_default_with(scored, SentimentScore::neutral).into_parts(Stage::Sentiment);
        let hint = if d.is_some() {
            UrgencyLevel::Medium
        } else {
            urgency_hint(sentiment.score)
        };
        degraded.extend(d);

        let (found, d) = Outcome::or_default_with(extracted, Vec::new).into_parts(Stage::Entities);
        degraded.extend(d);
        let entities: Vec<Entity> = found
            .into_iter()
            .filter(|e| self.entity_filter.contains(&e.entity_type))
            .map(|e| Entity {
                entity: e.entity,
                entity_type: e.entity_type.as_str().to_string(),
            })
            .collect();

        let rec = self
            .recommender
            .recommend(&classification.label, &full_text, hint);

        for dg in &degraded {
            warn!(stage = %dg.stage, reason = %dg.reason, "collaborator degraded to default");
            counter!(m::DEGRADED_TOTAL, "stage" => dg.stage.as_str()).increment(1);
        }
        counter!(m::ANALYSES_TOTAL).increment(1);
        counter!(m::URGENCY_TOTAL, "urgency" => rec.urgency.as_str()).increment(1);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!(m::ANALYSIS_DURATION_MS).record(elapsed_ms);

        info!(
            id = %fingerprint(&full_text),
            category = %classification.label,
            confidence = classification.confidence,
            hint = %hint,
            urgency = %rec.urgency,
            hours = rec.hours,
            entities = entities.len(),
            degraded = degraded.len(),
            elapsed_ms,
            "incident analysed"
        );

        CombinedAnalysis {
            category: classification.label,
            confidence: classification.confidence,
            sentiment: sentiment.label.as_str().to_string(),
            urgency_level: hint,
            calculated_urgency: rec.urgency,
            entities: if entities.is_empty() { None } else { Some(entities) },
            estimated_resolution_time: rec.estimated_resolution_time(),
            recommended_actions: rec.actions,
            degraded,
        }
    }
}
