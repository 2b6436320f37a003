//! Incident classification: pick one label out of a candidate set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::huggingface::HfInferenceClient;
use crate::error::CollaboratorError;
use crate::taxonomy::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    /// Confidence in [0,1].
    pub confidence: f32,
}

#[async_trait]
pub trait IncidentClassifier: Send + Sync {
    async fn classify(
        &self,
        title: &str,
        description: &str,
        labels: &[String],
    ) -> Result<Classification, CollaboratorError>;
    fn name(&self) -> &'static str;
}

// ------------------------------------------------------------
// Offline cue-word classifier
// ------------------------------------------------------------

/// Deterministic classifier over [`Category::cues`].
///
/// Score per label = number of distinct cues found in the lowercased text.
/// Ties go to the earlier label. Confidence is the winner's share of all hits.
/// Labels outside the taxonomy have no cues and never win.
#[derive(Debug, Clone, Default)]
pub struct LexicalClassifier;

impl LexicalClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(text: &str, label: &str) -> usize {
        label
            .parse::<Category>()
            .map(|c| c.cues().iter().filter(|cue| text.contains(*cue)).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl IncidentClassifier for LexicalClassifier {
    async fn classify(
        &self,
        title: &str,
        description: &str,
        labels: &[String],
    ) -> Result<Classification, CollaboratorError> {
        let text = format!("{title} {description}").to_lowercase();

        let mut total = 0usize;
        let mut best: Option<(&String, usize)> = None;
        for label in labels {
            let s = Self::score(&text, label);
            total += s;
            if s > 0 && best.map_or(true, |(_, b)| s > b) {
                best = Some((label, s));
            }
        }

        match best {
            Some((label, s)) => Ok(Classification {
                label: label.clone(),
                confidence: (s as f32 / total as f32).clamp(0.0, 1.0),
            }),
            None => Err(CollaboratorError::NoSignal),
        }
    }

    fn name(&self) -> &'static str {
        "lexical"
    }
}

// ------------------------------------------------------------
// Hugging Face zero-shot classifier
// ------------------------------------------------------------

pub const DEFAULT_ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";
pub const HYPOTHESIS_TEMPLATE: &str = "This trade incident involves {}.";

pub struct HfZeroShotClassifier {
    client: HfInferenceClient,
    model: String,
}

impl HfZeroShotClassifier {
    pub fn new(client: HfInferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[derive(Serialize)]
struct ZeroShotReq<'a> {
    inputs: &'a str,
    parameters: ZeroShotParams<'a>,
}

#[derive(Serialize)]
struct ZeroShotParams<'a> {
    candidate_labels: &'a [String],
    hypothesis_template: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ZeroShotResp {
    labels: Vec<String>,
    scores: Vec<f32>,
}

/// The API answers with either a bare object or a one-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ZeroShotBody {
    One(ZeroShotResp),
    Many(Vec<ZeroShotResp>),
}

impl ZeroShotBody {
    /// Labels come back sorted by score; the first pair is the winner.
    pub(crate) fn top(self) -> Result<Classification, CollaboratorError> {
        let resp = match self {
            ZeroShotBody::One(r) => r,
            ZeroShotBody::Many(v) => v
                .into_iter()
                .next()
                .ok_or_else(|| CollaboratorError::Malformed("empty zero-shot array".into()))?,
        };
        match (resp.labels.into_iter().next(), resp.scores.first()) {
            (Some(label), Some(&score)) => Ok(Classification {
                label,
                confidence: score.clamp(0.0, 1.0),
            }),
            _ => Err(CollaboratorError::Malformed("zero-shot response without labels".into())),
        }
    }
}

#[async_trait]
impl IncidentClassifier for HfZeroShotClassifier {
    async fn classify(
        &self,
        title: &str,
        description: &str,
        labels: &[String],
    ) -> Result<Classification, CollaboratorError> {
        let text = format!("{title} {description}");
        let req = ZeroShotReq {
            inputs: &text,
            parameters: ZeroShotParams {
                candidate_labels: labels,
                hypothesis_template: HYPOTHESIS_TEMPLATE,
            },
        };
        let body: ZeroShotBody = self.client.infer(&self.model, &req).await?;
        body.top()
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }
}
