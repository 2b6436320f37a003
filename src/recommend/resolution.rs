use super::tables::RecommenderTables;
use crate::urgency::UrgencyLevel;

/// Estimated resolution time in whole hours, capped by the SLA of `urgency`.
///
/// `floor(base * multiplier)`, then `min(.., SLA)`. Truncates, never rounds.
pub fn estimate_hours(tables: &RecommenderTables, category: &str, urgency: UrgencyLevel) -> u32 {
    let base = tables
        .base_resolution_hours
        .get(category)
        .copied()
        .unwrap_or(tables.default_base_hours);
    let multiplier = tables.urgency_multipliers.get(urgency);

    let candidate = (f64::from(base) * multiplier).floor().max(0.0) as u32;
    candidate.min(tables.sla(urgency))
}
