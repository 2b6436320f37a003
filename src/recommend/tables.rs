//! Lookup tables for the recommendation engine.
//!
//! Built once at start-up (built-in seed or a JSON file) and shared through
//! `Arc`. JSON shape mirrors the struct; every field except the three
//! category maps has a default, so a partial file only overrides what it
//! names:
//!
//! ```json
//! {
//!   "urgency_factors": { "Damaged Goods": "High" },
//!   "action_templates": { "Damaged Goods": ["..."] },
//!   "base_resolution_hours": { "Damaged Goods": 12 }
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::{fs, path::Path};

use crate::urgency::{PerUrgency, UrgencyLevel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderTables {
    /// Category -> base urgency.
    pub urgency_factors: HashMap<String, UrgencyLevel>,
    #[serde(default)]
    pub default_urgency: UrgencyLevel,
    /// Category -> actions in execution order.
    pub action_templates: HashMap<String, Vec<String>>,
    #[serde(default = "default_fallback_actions")]
    pub fallback_actions: Vec<String>,
    /// Hard ceiling on resolution time per urgency.
    #[serde(default = "default_sla_hours")]
    pub sla_hours: PerUrgency<u32>,
    /// Category -> base resolution time in hours.
    pub base_resolution_hours: HashMap<String, u32>,
    #[serde(default = "default_base_hours")]
    pub default_base_hours: u32,
    #[serde(default = "default_multipliers")]
    pub urgency_multipliers: PerUrgency<f64>,
    /// Lowercase trigger words; matched as substrings.
    #[serde(default = "default_keywords")]
    pub high_impact_keywords: Vec<String>,
}

fn default_fallback_actions() -> Vec<String> {
    strings(&[
        "Escalate to relevant department for immediate review",
        "Schedule stakeholder update within 24 hours",
        "Document incident details and track resolution progress",
    ])
}

fn default_sla_hours() -> PerUrgency<u32> {
    PerUrgency {
        high: 24,
        medium: 48,
        low: 72,
    }
}

fn default_base_hours() -> u32 {
    24
}

fn default_multipliers() -> PerUrgency<f64> {
    PerUrgency {
        high: 0.7,
        medium: 1.0,
        low: 1.5,
    }
}

fn default_keywords() -> Vec<String> {
    strings(&[
        "immediate",
        "urgent",
        "critical",
        "severe",
        "damaged",
        "breach",
        "violation",
        "failed",
        "emergency",
        "risk",
    ])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RecommenderTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RecommenderTables {
    /// Built-in commodity-trading seed.
    pub fn builtin() -> Self {
        use UrgencyLevel::{High, Low, Medium};

        let mut urgency_factors = HashMap::new();
        for (category, level) in [
            ("Damaged Goods", High),
            ("Quality Control", High),
            ("Payment Issue", High),
            ("Shipment Delay", High),
            ("Transportation Issue", High),
            ("Platform Technical Issue", High),
            ("Supply Shortage", High),
            ("Compliance Violation", High),
            ("Documentation Issue", Medium),
            ("Storage Issue", Medium),
            ("Integration Error", Medium),
            ("Data Synchronization", Medium),
            ("Communication Breakdown", Medium),
            ("Quality Assurance", Medium),
            ("Verification Failure", Medium),
            ("Contract Issue", Low),
            ("Currency Risk", Low),
            ("Traceability Issue", Low),
            ("Aggregation Issue", Low),
            ("Trade Execution Error", Low),
        ] {
            urgency_factors.insert(category.to_string(), level);
        }

        let mut action_templates = HashMap::new();
        for (category, actions) in [
            (
                "Damaged Goods",
                &[
                    "Initiate immediate damage assessment within 4 hours",
                    "Document damage with photos and inspection report",
                    "File insurance claim if damage exceeds threshold",
                ],
            ),
            (
                "Quality Control",
                &[
                    "Schedule immediate quality inspection within 2 hours",
                    "Collect samples for laboratory testing if required",
                    "Prepare quality deviation report with findings",
                ],
            ),
            (
                "Standards Violation",
                &[
                    "Review product specifications against standards",
                    "Collect non-conformance evidence and documentation",
                    "Schedule supplier quality audit within 24 hours",
                ],
            ),
            (
                "Documentation Issue",
                &[
                    "Request missing documents from the responsible party within 4 hours",
                    "Schedule document verification with compliance team within 24 hours",
                    "Set up automated reminders for document submission every 8 hours",
                ],
            ),
            (
                "Compliance Violation",
                &[
                    "Initiate immediate compliance review within 2 hours",
                    "Prepare violation report and notify regulatory team",
                    "Schedule stakeholder meeting to address compliance gaps",
                ],
            ),
            (
                "Contract Issue",
                &[
                    "Review contract terms with legal team within 24 hours",
                    "Prepare amendment documentation if required",
                    "Schedule resolution meeting with counterparty",
                ],
            ),
            (
                "Shipment Delay",
                &[
                    "Request immediate status update from logistics provider",
                    "Calculate impact on delivery timeline and notify stakeholders",
                    "Identify alternative routing options within 8 hours",
                ],
            ),
            (
                "Transportation Issue",
                &[
                    "Arrange backup transportation within 6 hours",
                    "Update tracking system with new vehicle details",
                    "Schedule 4-hourly status updates from transport team",
                ],
            ),
            (
                "Storage Issue",
                &[
                    "Assess current storage condition within 2 hours",
                    "Identify alternative storage facilities if needed",
                    "Monitor commodity condition every 6 hours",
                ],
            ),
            (
                "Payment Issue",
                &[
                    "Contact treasury team for payment status within 2 hours",
                    "Prepare payment reconciliation report",
                    "Set up payment tracking checkpoints",
                ],
            ),
            (
                "Financing Problem",
                &[
                    "Escalate to finance team for immediate review",
                    "Prepare alternative financing options within 24 hours",
                    "Schedule stakeholder update meeting",
                ],
            ),
            (
                "Platform Technical Issue",
                &[
                    "Initiate system diagnostic within 1 hour",
                    "Implement temporary workaround if available",
                    "Schedule technical team review within 4 hours",
                ],
            ),
            (
                "Integration Error",
                &[
                    "Check integration logs for error patterns",
                    "Initiate failover to backup systems if available",
                    "Schedule technical team intervention within 2 hours",
                ],
            ),
        ] {
            action_templates.insert(category.to_string(), strings(actions));
        }

        let mut base_resolution_hours = HashMap::new();
        for (category, hours) in [
            ("Documentation Issue", 24),
            ("Compliance Violation", 48),
            ("Transportation Issue", 12),
            ("Shipment Delay", 24),
            ("Payment Issue", 24),
            ("Platform Technical Issue", 8),
            ("Integration Error", 12),
        ] {
            base_resolution_hours.insert(category.to_string(), hours);
        }

        Self {
            urgency_factors,
            default_urgency: UrgencyLevel::Medium,
            action_templates,
            fallback_actions: default_fallback_actions(),
            sla_hours: default_sla_hours(),
            base_resolution_hours,
            default_base_hours: default_base_hours(),
            urgency_multipliers: default_multipliers(),
            high_impact_keywords: default_keywords(),
        }
    }

    /// Lowercase + de-duplicate keywords and reject tables the engine
    /// cannot answer from (empty fallback, empty keyword entries).
    pub fn normalized(mut self) -> Result<Self> {
        if self.fallback_actions.is_empty() {
            bail!("fallback_actions must not be empty");
        }
        if let Some((category, _)) = self.action_templates.iter().find(|(_, a)| a.is_empty()) {
            bail!("action template for '{category}' is empty");
        }
        for level in UrgencyLevel::ALL {
            let m = self.urgency_multipliers.get(level);
            if !m.is_finite() || m < 0.0 {
                bail!("urgency multiplier for {level} must be a non-negative number");
            }
        }

        let mut seen = HashSet::new();
        let mut keywords = Vec::with_capacity(self.high_impact_keywords.len());
        for kw in self.high_impact_keywords.drain(..) {
            let kw = kw.trim().to_lowercase();
            if kw.is_empty() {
                bail!("high_impact_keywords contains an empty entry");
            }
            if seen.insert(kw.clone()) {
                keywords.push(kw);
            }
        }
        self.high_impact_keywords = keywords;
        Ok(self)
    }

    pub fn sla(&self, level: UrgencyLevel) -> u32 {
        self.sla_hours.get(level)
    }
}

/// Load tables from a JSON file (no caching).
pub fn load_tables_file(path: &Path) -> Result<RecommenderTables> {
    let bytes = fs::read(path)
        .with_context(|| format!("reading recommender tables from {}", path.display()))?;
    let tables: RecommenderTables = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing recommender tables in {}", path.display()))?;
    tables.normalized()
}
