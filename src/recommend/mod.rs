// src/recommend/mod.rs
//! # Recommendation engine
//! Pure, deterministic mapping `(category, description, hint)` →
//! `(actions, estimated resolution time)`. No I/O; tables are injected.
//!
//! Steps:
//! 1) urgency resolution (category base level + high-impact keywords)
//! 2) action template lookup
//! 3) resolution-time estimate, bounded by the SLA of the resolved urgency

pub mod actions;
pub mod resolution;
pub mod tables;
pub mod urgency;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use crate::recommend::actions::get_actions;
pub use crate::recommend::resolution::estimate_hours;
pub use crate::recommend::tables::{load_tables_file, RecommenderTables};
pub use crate::recommend::urgency::{count_impact_keywords, resolve_urgency};

use crate::urgency::UrgencyLevel;

/// What to do with the sentiment-derived urgency hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentHintPolicy {
    /// Hint is accepted and discarded; urgency comes from category + text only.
    #[default]
    Ignore,
    /// Effective urgency is the higher of the calculated level and the hint.
    Escalate,
}

impl std::str::FromStr for SentimentHintPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "escalate" => Ok(Self::Escalate),
            other => Err(format!("unknown sentiment hint policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub actions: Vec<String>,
    /// Urgency that drove the SLA and estimate.
    pub urgency: UrgencyLevel,
    pub hours: u32,
}

impl Recommendation {
    /// `"{hours} hours"`, no pluralisation.
    pub fn estimated_resolution_time(&self) -> String {
        format!("{} hours", self.hours)
    }
}

#[derive(Debug, Clone)]
pub struct Recommender {
    tables: Arc<RecommenderTables>,
    hint_policy: SentimentHintPolicy,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(Arc::new(RecommenderTables::builtin()))
    }
}

impl Recommender {
    pub fn new(tables: Arc<RecommenderTables>) -> Self {
        Self {
            tables,
            hint_policy: SentimentHintPolicy::default(),
        }
    }

    pub fn with_hint_policy(mut self, policy: SentimentHintPolicy) -> Self {
        self.hint_policy = policy;
        self
    }

    pub fn tables(&self) -> &RecommenderTables {
        &self.tables
    }

    pub fn hint_policy(&self) -> SentimentHintPolicy {
        self.hint_policy
    }

    pub fn resolve_urgency(&self, category: &str, description: &str) -> UrgencyLevel {
        resolve_urgency(&self.tables, category, description)
    }

    pub fn get_actions(&self, category: &str) -> Vec<String> {
        get_actions(&self.tables, category).to_vec()
    }

    pub fn estimate_hours(&self, category: &str, urgency: UrgencyLevel) -> u32 {
        estimate_hours(&self.tables, category, urgency)
    }

    /// Full recommendation for one incident. Never fails.
    pub fn recommend(
        &self,
        category: &str,
        description: &str,
        sentiment_hint: UrgencyLevel,
    ) -> Recommendation {
        let calculated = self.resolve_urgency(category, description);
        let urgency = match self.hint_policy {
            SentimentHintPolicy::Ignore => calculated,
            SentimentHintPolicy::Escalate => calculated.max(sentiment_hint),
        };

        let actions = self.get_actions(category);
        // The estimator caps at the SLA already; the outer min is kept as an
        // independent bound on the published figure.
        let hours = self
            .tables
            .sla(urgency)
            .min(self.estimate_hours(category, urgency));

        Recommendation {
            actions,
            urgency,
            hours,
        }
    }
}
