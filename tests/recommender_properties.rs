// tests/recommender_properties.rs
//
// Table-driven checks of the recommendation engine over the built-in tables:
// urgency escalation rules, SLA bounds, fallback actions, determinism.

use std::sync::Arc;

use trade_incident_analyzer::recommend::{count_impact_keywords, RecommenderTables};
use trade_incident_analyzer::{Category, Recommender, SentimentHintPolicy, UrgencyLevel};

const FALLBACK: [&str; 3] = [
    "Escalate to relevant department for immediate review",
    "Schedule stakeholder update within 24 hours",
    "Document incident details and track resolution progress",
];

fn engine() -> Recommender {
    Recommender::default()
}

/// Category names from the taxonomy plus a few the tables do not know.
fn all_categories() -> Vec<String> {
    let mut v = Category::labels();
    v.extend(["Standards Violation", "Nonexistent Category", ""].map(String::from));
    v
}

#[test]
fn example_contract_issue_without_keywords_stays_low() {
    assert_eq!(
        engine().resolve_urgency("Contract Issue", "routine review needed"),
        UrgencyLevel::Low
    );
}

#[test]
fn example_two_keywords_override_low_base() {
    assert_eq!(
        engine().resolve_urgency("Contract Issue", "this is a critical breach"),
        UrgencyLevel::High
    );
}

#[test]
fn example_high_base_without_keywords_drops_to_medium() {
    assert_eq!(
        engine().resolve_urgency("Damaged Goods", "minor cosmetic issue"),
        UrgencyLevel::Medium
    );
}

#[test]
fn example_platform_issue_high_estimate() {
    let e = engine();
    assert_eq!(e.estimate_hours("Platform Technical Issue", UrgencyLevel::High), 5);
    let rec = e.recommend(
        "Platform Technical Issue",
        "critical outage, emergency",
        UrgencyLevel::Low,
    );
    assert_eq!(rec.urgency, UrgencyLevel::High);
    assert_eq!(rec.estimated_resolution_time(), "5 hours");
}

#[test]
fn example_unknown_category_gets_fallback_in_order() {
    assert_eq!(engine().get_actions("Nonexistent Category"), FALLBACK);
}

#[test]
fn zero_keywords_keeps_base_unless_high() {
    let e = engine();
    let text = "routine note";
    assert_eq!(count_impact_keywords(e.tables(), text), 0);
    for c in all_categories() {
        let base = e
            .tables()
            .urgency_factors
            .get(&c)
            .copied()
            .unwrap_or(UrgencyLevel::Medium);
        let expected = if base == UrgencyLevel::High {
            UrgencyLevel::Medium
        } else {
            base
        };
        assert_eq!(e.resolve_urgency(&c, text), expected, "category {c:?}");
    }
}

#[test]
fn one_keyword_escalates_non_low_bases() {
    let e = engine();
    let text = "this is urgent";
    assert_eq!(count_impact_keywords(e.tables(), text), 1);
    for c in all_categories() {
        let base = e
            .tables()
            .urgency_factors
            .get(&c)
            .copied()
            .unwrap_or(UrgencyLevel::Medium);
        let got = e.resolve_urgency(&c, text);
        if base == UrgencyLevel::Low {
            assert_eq!(got, UrgencyLevel::Low, "category {c:?}");
        } else {
            assert_eq!(got, UrgencyLevel::High, "category {c:?}");
        }
    }
}

#[test]
fn two_keywords_always_high() {
    let e = engine();
    for c in all_categories() {
        assert_eq!(
            e.resolve_urgency(&c, "SEVERE damage, Immediate action"),
            UrgencyLevel::High,
            "category {c:?}"
        );
    }
}

#[test]
fn repeated_keyword_counts_once() {
    let e = engine();
    assert_eq!(count_impact_keywords(e.tables(), "urgent urgent URGENT"), 1);
    assert_eq!(
        e.resolve_urgency("Contract Issue", "urgent urgent URGENT"),
        UrgencyLevel::Low
    );
}

#[test]
fn estimates_never_exceed_sla() {
    let e = engine();
    for c in all_categories() {
        for u in UrgencyLevel::ALL {
            let hours = e.estimate_hours(&c, u);
            assert!(hours <= e.tables().sla(u), "{c:?} {u}: {hours}");
        }
    }
    assert_eq!(e.estimate_hours("Compliance Violation", UrgencyLevel::High), 24);
    assert_eq!(e.estimate_hours("Unknown", UrgencyLevel::Low), 36);
}

#[test]
fn actions_are_never_empty() {
    let e = engine();
    for c in all_categories() {
        assert!(!e.get_actions(&c).is_empty(), "category {c:?}");
    }
    assert_eq!(
        e.get_actions("Standards Violation")[0],
        "Review product specifications against standards"
    );
}

#[test]
fn recommend_is_idempotent_and_ignores_hint_by_default() {
    let e = engine();
    assert_eq!(e.hint_policy(), SentimentHintPolicy::Ignore);
    let a = e.recommend("Payment Issue", "late payment", UrgencyLevel::High);
    let b = e.recommend("Payment Issue", "late payment", UrgencyLevel::High);
    let c = e.recommend("Payment Issue", "late payment", UrgencyLevel::Low);
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn escalate_policy_takes_the_higher_level() {
    let e = Recommender::default().with_hint_policy(SentimentHintPolicy::Escalate);
    for c in all_categories() {
        for hint in UrgencyLevel::ALL {
            let calculated = e.resolve_urgency(&c, "status check");
            let rec = e.recommend(&c, "status check", hint);
            assert_eq!(rec.urgency, calculated.max(hint), "{c:?} hint {hint}");
            assert!(rec.hours <= e.tables().sla(rec.urgency));
        }
    }
}

#[test]
fn substituted_tables_drive_the_engine() {
    let json = r#"{
        "urgency_factors": { "Vessel Issue": "Low" },
        "action_templates": { "Vessel Issue": ["Call the master"] },
        "base_resolution_hours": { "Vessel Issue": 100 },
        "high_impact_keywords": ["Mayday", "mayday", " sinking "]
    }"#;
    let tables: RecommenderTables = serde_json::from_str(json).unwrap();
    let tables = tables.normalized().unwrap();
    assert_eq!(tables.high_impact_keywords, vec!["mayday", "sinking"]);

    let e = Recommender::new(Arc::new(tables));
    assert_eq!(e.get_actions("Vessel Issue"), vec!["Call the master"]);
    assert_eq!(e.resolve_urgency("Vessel Issue", "MAYDAY, sinking"), UrgencyLevel::High);
    // floor(100 * 0.7) = 70, capped at the High SLA
    assert_eq!(e.estimate_hours("Vessel Issue", UrgencyLevel::High), 24);
    assert_eq!(e.get_actions("Payment Issue"), FALLBACK);
}

#[test]
fn injected_keywords_are_matched_case_insensitively_and_once() {
    let mut tables = RecommenderTables::builtin();
    tables.high_impact_keywords = vec!["urgent".into(), "urgent".into()];
    let e = Recommender::new(Arc::new(tables));
    assert_eq!(e.resolve_urgency("Contract Issue", "urgent"), UrgencyLevel::Low);

    let mut tables = RecommenderTables::builtin();
    tables.high_impact_keywords = vec!["URGENT".into()];
    let e = Recommender::new(Arc::new(tables));
    assert_eq!(e.resolve_urgency("Storage Issue", "urgent"), UrgencyLevel::High);
}
