// src/analyze/entities.rs
//! Rule-based entity extraction for trade incident text.
//!
//! Rules (regex crate syntax, no lookarounds):
//! - Tracking ID: letter prefix + digits (`SHP1234`, `TRK-00921`) or digits + letters (`123ABC`)
//! - Document: bill of lading, certificate of origin, customs forms, import license
//! - Product: `<word> shipment` / `<word> cargo` (leading determiners rejected)
//! - Status: delayed, pending, cleared, held
//! - Location: `port of <Name>`
//! - Date: ISO dates and `<day> <Month>` / `<Month> <day>`
//! - Amount: `$1,200.50`, `5000 USD`
//!
//! Overlapping matches are resolved left-to-right, longest first.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CollaboratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "Tracking ID")]
    TrackingId,
    Document,
    Product,
    Status,
    Location,
    Organization,
    Date,
    Amount,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::TrackingId => "Tracking ID",
            EntityType::Document => "Document",
            EntityType::Product => "Product",
            EntityType::Status => "Status",
            EntityType::Location => "Location",
            EntityType::Organization => "Organization",
            EntityType::Date => "Date",
            EntityType::Amount => "Amount",
        }
    }

    /// Fixed per-type confidence: pattern-anchored types score higher.
    pub fn confidence(&self) -> f32 {
        match self {
            EntityType::TrackingId | EntityType::Document => 0.95,
            EntityType::Location | EntityType::Date => 0.9,
            _ => 0.8,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [EntityType; 8] = [
            EntityType::TrackingId,
            EntityType::Document,
            EntityType::Product,
            EntityType::Status,
            EntityType::Location,
            EntityType::Organization,
            EntityType::Date,
            EntityType::Amount,
        ];
        ALL.iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown entity type: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedEntity {
    pub entity: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Byte offsets into the input.
    pub start: usize,
    pub end: usize,
    pub confidence: f32,
}

#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>, CollaboratorError>;
    fn name(&self) -> &'static str;
}

struct Rule {
    kind: EntityType,
    re: Regex,
    /// Capture group holding the entity span (0 = whole match).
    group: usize,
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let rule = |kind, pattern: &str, group| Rule {
        kind,
        re: Regex::new(pattern).expect("entity rule regex"),
        group,
    };
    vec![
        rule(
            EntityType::TrackingId,
            r"\b(?:[A-Z]{2,4}-?\d{3,10}|\d{3,6}[A-Z]{2,4})\b",
            0,
        ),
        rule(
            EntityType::Document,
            r"(?i)\b(?:bill of lading|certificate of origin|customs forms?|import licen[cs]e)\b",
            0,
        ),
        rule(EntityType::Product, r"(?i)\b([a-z]+\s+(?:shipment|cargo))\b", 1),
        rule(EntityType::Status, r"(?i)\b(?:delayed|pending|cleared|held)\b", 0),
        rule(EntityType::Location, r"\b(?i:port of)\s+([A-Z][a-z]+(?:\s[A-Z][a-z]+)?)", 1),
        rule(
            EntityType::Date,
            r"(?i)\b(?:\d{4}-\d{2}-\d{2}|\d{1,2}\s(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s\d{1,2})\b",
            0,
        ),
        rule(
            EntityType::Amount,
            r"(?:\$\s?\d[\d,]*(?:\.\d+)?|\b\d[\d,]*(?:\.\d+)?\s?(?:USD|EUR|GBP)\b)",
            0,
        ),
    ]
});

/// Words that make `<word> shipment` a reference rather than a product.
const PRODUCT_STOPWORDS: &[&str] = &[
    "a", "an", "the", "this", "that", "our", "their", "his", "her", "its", "my", "your", "entire",
    "whole", "next", "last", "first", "delayed", "pending", "held", "cleared", "of", "and",
];

#[derive(Debug, Clone, Default)]
pub struct PatternEntityExtractor;

impl PatternEntityExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract_sync(&self, text: &str) -> Vec<ExtractedEntity> {
        let mut found = Vec::new();
        for rule in RULES.iter() {
            for caps in rule.re.captures_iter(text) {
                let Some(m) = caps.get(rule.group) else {
                    continue;
                };
                if rule.kind == EntityType::Product {
                    let lead = m.as_str().split_whitespace().next().unwrap_or_default();
                    if PRODUCT_STOPWORDS.contains(&lead.to_lowercase().as_str()) {
                        continue;
                    }
                }
                found.push(ExtractedEntity {
                    entity: m.as_str().to_string(),
                    entity_type: rule.kind,
                    start: m.start(),
                    end: m.end(),
                    confidence: rule.kind.confidence(),
                });
            }
        }

        // Left-to-right, longest first; drop anything overlapping a kept span.
        found.sort_by(|a, b| a.start.cmp(&b.start).then((b.end - b.start).cmp(&(a.end - a.start))));
        let mut out: Vec<ExtractedEntity> = Vec::with_capacity(found.len());
        for e in found {
            if out.last().map_or(true, |last| e.start >= last.end) {
                out.push(e);
            }
        }
        out
    }
}

#[async_trait]
impl EntityExtractor for PatternEntityExtractor {
    async fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>, CollaboratorError> {
        Ok(self.extract_sync(text))
    }

    fn name(&self) -> &'static str {
        "patterns"
    }
}
