//! Sentiment scoring and the sentiment-derived urgency hint.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::huggingface::HfInferenceClient;
use crate::error::CollaboratorError;
use crate::urgency::UrgencyLevel;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
    /// Only produced when no sentiment could be computed.
    Neutral,
}

impl Polarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "Positive",
            Polarity::Negative => "Negative",
            Polarity::Neutral => "Neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScore {
    pub label: Polarity,
    /// Confidence of `label`, in [0,1].
    pub score: f32,
}

impl SentimentScore {
    /// Stand-in used when the scorer fails.
    pub fn neutral() -> Self {
        Self {
            label: Polarity::Neutral,
            score: 0.5,
        }
    }
}

#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn score(&self, text: &str) -> Result<SentimentScore, CollaboratorError>;
    fn name(&self) -> &'static str;
}

/// Urgency hint bands over the sentiment score, inclusive, first match wins:
/// [0.0, 0.3] Low, [0.3, 0.6] Medium, [0.6, 1.0] High. Out of range → Medium.
pub fn urgency_hint(score: f32) -> UrgencyLevel {
    const BANDS: [(f32, f32, UrgencyLevel); 3] = [
        (0.0, 0.3, UrgencyLevel::Low),
        (0.3, 0.6, UrgencyLevel::Medium),
        (0.6, 1.0, UrgencyLevel::High),
    ];
    BANDS
        .iter()
        .find(|(lo, hi, _)| *lo <= score && score <= *hi)
        .map(|(_, _, level)| *level)
        .unwrap_or(UrgencyLevel::Medium)
}

// ------------------------------------------------------------
// Lexicon scorer
// ------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (raw lexicon sum, token count).
    /// A negator in the previous 1..=3 tokens flips the sign of a word's score.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }
}

#[async_trait]
impl SentimentScorer for LexiconSentiment {
    async fn score(&self, text: &str) -> Result<SentimentScore, CollaboratorError> {
        let (raw, _) = self.score_text(text);
        // Map |raw| onto [0.5, 1): zero evidence is a coin flip.
        let magnitude = raw.unsigned_abs() as f32;
        let score = 0.5 + 0.5 * magnitude / (magnitude + 2.0);
        let label = if raw < 0 {
            Polarity::Negative
        } else {
            Polarity::Positive
        };
        Ok(SentimentScore { label, score })
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Alphanumeric (plus apostrophe) tokens, lower-case.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
    )
}

// ------------------------------------------------------------
// Hugging Face text-classification scorer
// ------------------------------------------------------------

pub const DEFAULT_SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

pub struct HfSentiment {
    client: HfInferenceClient,
    model: String,
}

impl HfSentiment {
    pub fn new(client: HfInferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LabelScore {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SentimentBody {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl SentimentBody {
    pub(crate) fn best(self) -> Result<SentimentScore, CollaboratorError> {
        let candidates = match self {
            SentimentBody::Nested(v) => v.into_iter().next().unwrap_or_default(),
            SentimentBody::Flat(v) => v,
        };
        let top = candidates
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| CollaboratorError::Malformed("empty sentiment response".into()))?;

        let label = if top.label.eq_ignore_ascii_case("NEGATIVE") {
            Polarity::Negative
        } else {
            Polarity::Positive
        };
        Ok(SentimentScore {
            label,
            score: top.score.clamp(0.0, 1.0),
        })
    }
}

#[async_trait]
impl SentimentScorer for HfSentiment {
    async fn score(&self, text: &str) -> Result<SentimentScore, CollaboratorError> {
        let body: SentimentBody = self
            .client
            .infer(&self.model, &serde_json::json!({ "inputs": text }))
            .await?;
        body.best()
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_flips_word_score() {
        let s = LexiconSentiment::new();
        let (plain, _) = s.score_text("shipment delayed");
        let (negated, _) = s.score_text("shipment not delayed");
        assert!(plain < 0);
        assert_eq!(negated, -plain);
    }

    #[tokio::test]
    async fn negative_text_maps_to_negative_label() {
        let s = LexiconSentiment::new();
        let out = s.score("Cargo damaged and payment overdue").await.unwrap();
        assert_eq!(out.label, Polarity::Negative);
        assert!(out.score > 0.6);
        assert_eq!(urgency_hint(out.score), UrgencyLevel::High);
    }

    #[tokio::test]
    async fn text_without_lexicon_words_is_even() {
        let s = LexiconSentiment::new();
        let out = s.score("the vessel berth schedule").await.unwrap();
        assert_eq!(out.label, Polarity::Positive);
        assert!((out.score - 0.5).abs() < f32::EPSILON);
        assert_eq!(urgency_hint(out.score), UrgencyLevel::Medium);
    }

    #[test]
    fn band_edges_resolve_to_the_lower_band() {
        assert_eq!(urgency_hint(0.0), UrgencyLevel::Low);
        assert_eq!(urgency_hint(0.3), UrgencyLevel::Low);
        assert_eq!(urgency_hint(0.45), UrgencyLevel::Medium);
        assert_eq!(urgency_hint(0.6), UrgencyLevel::Medium);
        assert_eq!(urgency_hint(0.61), UrgencyLevel::High);
        assert_eq!(urgency_hint(1.0), UrgencyLevel::High);
        assert_eq!(urgency_hint(1.2), UrgencyLevel::Medium);
        assert_eq!(urgency_hint(f32::NAN), UrgencyLevel::Medium);
    }

    #[test]
    fn hf_body_picks_highest_score_in_either_shape() {
        let nested = r#"[[{"label":"POSITIVE","score":0.02},{"label":"NEGATIVE","score":0.98}]]"#;
        let flat = r#"[{"label":"NEGATIVE","score":0.98},{"label":"POSITIVE","score":0.02}]"#;
        for raw in [nested, flat] {
            let body: SentimentBody = serde_json::from_str(raw).unwrap();
            let best = body.best().unwrap();
            assert_eq!(best.label, Polarity::Negative);
            assert!((best.score - 0.98).abs() < 1e-6);
        }
    }

    #[test]
    fn hf_body_empty_is_malformed() {
        let body: SentimentBody = serde_json::from_str("[[]]").unwrap();
        assert!(matches!(body.best(), Err(CollaboratorError::Malformed(_))));
    }
}
