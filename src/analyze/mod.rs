// src/analyze/mod.rs
//! External collaborators behind trait seams: classifier, sentiment scorer,
//! entity extractor, document OCR. Each has an offline implementation and,
//! where a hosted model exists, a Hugging Face Inference API one.

pub mod classifier;
pub mod documents;
pub mod entities;
pub mod huggingface;
pub mod sentiment;

use serde::Serialize;
use std::fmt;

// Re-export convenient types.
pub use crate::analyze::classifier::{Classification, HfZeroShotClassifier, IncidentClassifier, LexicalClassifier};
pub use crate::analyze::documents::{DocumentProcessor, DocumentSummary, DocumentTextExtractor, TesseractExtractor};
pub use crate::analyze::entities::{EntityExtractor, EntityType, ExtractedEntity, PatternEntityExtractor};
pub use crate::analyze::huggingface::HfInferenceClient;
pub use crate::analyze::sentiment::{
    urgency_hint, HfSentiment, LexiconSentiment, Polarity, SentimentScore, SentimentScorer,
};

/// Pipeline stage that can degrade to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Classifier,
    Sentiment,
    Entities,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Classifier => "classifier",
            Stage::Sentiment => "sentiment",
            Stage::Entities => "entities",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage that fell back to its default value, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Degradation {
    pub stage: Stage,
    pub reason: String,
}

/// Collaborator result after fallback handling: either the real value or a
/// default that stands in for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Fresh(T),
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    /// Wrap a collaborator result, substituting `fallback` on error.
    pub fn or_default_with<E: fmt::Display>(res: Result<T, E>, fallback: impl FnOnce() -> T) -> Self {
        match res {
            Ok(v) => Outcome::Fresh(v),
            Err(e) => Outcome::Degraded {
                value: fallback(),
                reason: e.to_string(),
            },
        }
    }

    /// Split into the value and, when degraded, a record for `stage`.
    pub fn into_parts(self, stage: Stage) -> (T, Option<Degradation>) {
        match self {
            Outcome::Fresh(v) => (v, None),
            Outcome::Degraded { value, reason } => (value, Some(Degradation { stage, reason })),
        }
    }
}
