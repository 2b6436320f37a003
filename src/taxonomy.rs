//! # Incident taxonomy
//!
//! Fixed reference set of incident categories for commodity-trading
//! operations. The declaration order of [`Category::ALL`] is the candidate
//! label order handed to classifiers and the row order of incident metrics.
//!
//! Each category also carries a short list of lowercase cue phrases used by
//! the offline [`LexicalClassifier`](crate::analyze::classifier::LexicalClassifier).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    // Documentation & compliance
    #[serde(rename = "Documentation Issue")]
    DocumentationIssue,
    #[serde(rename = "Compliance Violation")]
    ComplianceViolation,
    #[serde(rename = "Contract Issue")]
    ContractIssue,
    // Logistics & shipment
    #[serde(rename = "Shipment Delay")]
    ShipmentDelay,
    #[serde(rename = "Damaged Goods")]
    DamagedGoods,
    #[serde(rename = "Quality Control")]
    QualityControl,
    #[serde(rename = "Storage Issue")]
    StorageIssue,
    #[serde(rename = "Transportation Issue")]
    TransportationIssue,
    // Financial & payment
    #[serde(rename = "Payment Issue")]
    PaymentIssue,
    #[serde(rename = "Financing Problem")]
    FinancingProblem,
    #[serde(rename = "Currency Risk")]
    CurrencyRisk,
    // Technical & system
    #[serde(rename = "Platform Technical Issue")]
    PlatformTechnicalIssue,
    #[serde(rename = "Integration Error")]
    IntegrationError,
    #[serde(rename = "Data Synchronization")]
    DataSynchronization,
    // Trade operations
    #[serde(rename = "Aggregation Issue")]
    AggregationIssue,
    #[serde(rename = "Verification Failure")]
    VerificationFailure,
    #[serde(rename = "Trade Execution Error")]
    TradeExecutionError,
    // Communication & support
    #[serde(rename = "Communication Breakdown")]
    CommunicationBreakdown,
    #[serde(rename = "Stakeholder Dispute")]
    StakeholderDispute,
    // Supply chain
    #[serde(rename = "Supply Shortage")]
    SupplyShortage,
    #[serde(rename = "Quality Assurance")]
    QualityAssurance,
    #[serde(rename = "Traceability Issue")]
    TraceabilityIssue,
}

impl Category {
    pub const ALL: [Category; 22] = [
        Category::DocumentationIssue,
        Category::ComplianceViolation,
        Category::ContractIssue,
        Category::ShipmentDelay,
        Category::DamagedGoods,
        Category::QualityControl,
        Category::StorageIssue,
        Category::TransportationIssue,
        Category::PaymentIssue,
        Category::FinancingProblem,
        Category::CurrencyRisk,
        Category::PlatformTechnicalIssue,
        Category::IntegrationError,
        Category::DataSynchronization,
        Category::AggregationIssue,
        Category::VerificationFailure,
        Category::TradeExecutionError,
        Category::CommunicationBreakdown,
        Category::StakeholderDispute,
        Category::SupplyShortage,
        Category::QualityAssurance,
        Category::TraceabilityIssue,
    ];

    /// Category used when classification is unavailable.
    pub const FALLBACK: Category = Category::PlatformTechnicalIssue;

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DocumentationIssue => "Documentation Issue",
            Category::ComplianceViolation => "Compliance Violation",
            Category::ContractIssue => "Contract Issue",
            Category::ShipmentDelay => "Shipment Delay",
            Category::DamagedGoods => "Damaged Goods",
            Category::QualityControl => "Quality Control",
            Category::StorageIssue => "Storage Issue",
            Category::TransportationIssue => "Transportation Issue",
            Category::PaymentIssue => "Payment Issue",
            Category::FinancingProblem => "Financing Problem",
            Category::CurrencyRisk => "Currency Risk",
            Category::PlatformTechnicalIssue => "Platform Technical Issue",
            Category::IntegrationError => "Integration Error",
            Category::DataSynchronization => "Data Synchronization",
            Category::AggregationIssue => "Aggregation Issue",
            Category::VerificationFailure => "Verification Failure",
            Category::TradeExecutionError => "Trade Execution Error",
            Category::CommunicationBreakdown => "Communication Breakdown",
            Category::StakeholderDispute => "Stakeholder Dispute",
            Category::SupplyShortage => "Supply Shortage",
            Category::QualityAssurance => "Quality Assurance",
            Category::TraceabilityIssue => "Traceability Issue",
        }
    }

    /// All category names in taxonomy order.
    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }

    /// Lowercase cue phrases (substring match) for lexical classification.
    pub fn cues(&self) -> &'static [&'static str] {
        match self {
            Category::DocumentationIssue => &[
                "document",
                "bill of lading",
                "certificate of origin",
                "paperwork",
                "customs form",
                "invoice missing",
            ],
            Category::ComplianceViolation => &[
                "compliance",
                "kyc",
                "regulator",
                "regulatory",
                "sanction",
                "aml",
            ],
            Category::ContractIssue => &["contract", "clause", "amendment", "terms"],
            Category::ShipmentDelay => &[
                "delay",
                "late",
                "held at port",
                "not arrived",
                "eta",
                "stuck",
            ],
            Category::DamagedGoods => &["damage", "broken", "torn", "spoiled", "wet bags", "leak"],
            Category::QualityControl => &["quality check", "inspection", "moisture", "grade", "sample"],
            Category::StorageIssue => &["warehouse", "storage", "silo", "stock room"],
            Category::TransportationIssue => &["truck", "vehicle", "carrier", "driver", "breakdown on route"],
            Category::PaymentIssue => &["payment", "paid", "unpaid", "invoice", "remittance"],
            Category::FinancingProblem => &["financing", "loan", "credit line", "letter of credit"],
            Category::CurrencyRisk => &["currency", "exchange rate", "fx", "devaluation"],
            Category::PlatformTechnicalIssue => &[
                "platform",
                "system down",
                "login",
                "outage",
                "error page",
                "crash",
            ],
            Category::IntegrationError => &["integration", "api", "webhook", "sync failed", "connector"],
            Category::DataSynchronization => &["synchroniz", "out of sync", "mismatch", "inconsistent data"],
            Category::AggregationIssue => &["aggregation", "aggregator", "consolidat", "pooling"],
            Category::VerificationFailure => &["verification", "verify", "unverified", "identity"],
            Category::TradeExecutionError => &["execution", "order", "wrong price", "trade booked"],
            Category::CommunicationBreakdown => &["no response", "unreachable", "communication", "not informed"],
            Category::StakeholderDispute => &["dispute", "disagree", "conflict", "claim rejected"],
            Category::SupplyShortage => &["shortage", "insufficient supply", "out of stock", "scarce"],
            Category::QualityAssurance => &["quality assurance", "standard", "certification", "audit"],
            Category::TraceabilityIssue => &["trace", "origin unknown", "lot number", "tracking lost"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Exact, case-insensitive match on the display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown category: {needle}"))
    }
}
