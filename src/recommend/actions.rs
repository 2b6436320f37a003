use super::tables::RecommenderTables;

/// Recommended actions for `category`, in execution order.
/// Unmapped categories get the generic fallback sequence.
pub fn get_actions<'t>(tables: &'t RecommenderTables, category: &str) -> &'t [String] {
    tables
        .action_templates
        .get(category)
        .map(Vec::as_slice)
        .unwrap_or(tables.fallback_actions.as_slice())
}
