//! Urgency resolution: category base level adjusted by textual evidence.

use std::collections::HashSet;

use super::tables::RecommenderTables;
use crate::urgency::UrgencyLevel;

/// Number of distinct high-impact keywords present in `description`.
///
/// Matching is substring containment on the lowercased text, so a keyword
/// embedded in a longer word counts too ("risk" in "brisk").
/// Keywords are folded the same way here as in `RecommenderTables::normalized`,
/// so hand-built tables with mixed case or duplicates count the same.
pub fn count_impact_keywords(tables: &RecommenderTables, description: &str) -> usize {
    let text = description.to_lowercase();
    let mut seen = HashSet::new();
    tables
        .high_impact_keywords
        .iter()
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty() && seen.insert(kw.clone()))
        .filter(|kw| text.contains(kw.as_str()))
        .count()
}

/// Base urgency of `category`, or the table default when unmapped.
pub fn base_urgency(tables: &RecommenderTables, category: &str) -> UrgencyLevel {
    tables
        .urgency_factors
        .get(category)
        .copied()
        .unwrap_or(tables.default_urgency)
}

/// Escalation policy, first match wins:
/// 1. two or more keywords -> High
/// 2. one keyword and base not Low -> High
/// 3. no keyword and base High -> Medium
/// 4. otherwise the base level
pub fn resolve_urgency(tables: &RecommenderTables, category: &str, description: &str) -> UrgencyLevel {
    let base = base_urgency(tables, category);
    let impact = count_impact_keywords(tables, description);

    if impact >= 2 {
        UrgencyLevel::High
    } else if impact == 1 && base != UrgencyLevel::Low {
        UrgencyLevel::High
    } else if impact == 0 && base == UrgencyLevel::High {
        UrgencyLevel::Medium
    } else {
        base
    }
}
