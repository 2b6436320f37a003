//! Append-only in-memory incident log with sequential ids.

use chrono::{DateTime, Utc};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::sync::Mutex;

use crate::analyze::documents::DocumentSummary;
use crate::urgency::UrgencyLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, Serialize)]
pub struct Incident {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub urgency_level: UrgencyLevel,
    pub status: IncidentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub document_count: usize,
    pub documents: Vec<DocumentSummary>,
}

/// Everything but the id and timestamps, which the store assigns.
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    pub category: String,
    pub urgency_level: UrgencyLevel,
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncidentMetrics {
    pub total_incidents: usize,
    pub high_priority: usize,
    pub open: usize,
    pub resolved: usize,
    pub by_category: CategoryCounts,
}

/// Per-category counts in the order the categories were given.
/// Serialised as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts(Vec<(String, usize)>);

impl CategoryCounts {
    pub fn get(&self, category: &str) -> Option<usize> {
        self.0.iter().find(|(c, _)| c == category).map(|(_, n)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(c, n)| (c.as_str(), *n))
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, n) in &self.0 {
            map.serialize_entry(category, n)?;
        }
        map.end()
    }
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    incidents: Vec<Incident>,
}

#[derive(Debug)]
pub struct IncidentStore {
    inner: Mutex<Inner>,
}

impl Default for IncidentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IncidentStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                incidents: Vec::new(),
            }),
        }
    }

    /// Reserve the id the next `create` will get. Used to name uploads
    /// before the record exists; ids are never reused, so a reserved id that
    /// is never created simply leaves a gap.
    pub fn reserve_id(&self) -> u64 {
        let mut g = self.inner.lock().expect("incident store mutex poisoned");
        let id = g.next_id;
        g.next_id += 1;
        id
    }

    /// Append a new open incident; id assignment and append are one step.
    pub fn create(&self, new: NewIncident) -> Incident {
        let mut g = self.inner.lock().expect("incident store mutex poisoned");
        let id = g.next_id;
        g.next_id += 1;
        let incident = build(id, new);
        g.incidents.push(incident.clone());
        incident
    }

    /// Append under an id obtained from [`reserve_id`](Self::reserve_id).
    /// Keeps the log ordered by id.
    pub fn create_with_id(&self, id: u64, new: NewIncident) -> Incident {
        let mut g = self.inner.lock().expect("incident store mutex poisoned");
        let incident = build(id, new);
        let pos = g.incidents.partition_point(|i| i.id < id);
        g.incidents.insert(pos, incident.clone());
        incident
    }

    pub fn get(&self, id: u64) -> Option<Incident> {
        let g = self.inner.lock().expect("incident store mutex poisoned");
        g.incidents.iter().find(|i| i.id == id).cloned()
    }

    pub fn list(&self) -> Vec<Incident> {
        let g = self.inner.lock().expect("incident store mutex poisoned");
        g.incidents.clone()
    }

    pub fn update_status(&self, id: u64, status: IncidentStatus) -> Option<Incident> {
        let mut g = self.inner.lock().expect("incident store mutex poisoned");
        let incident = g.incidents.iter_mut().find(|i| i.id == id)?;
        incident.status = status;
        incident.updated_at = Utc::now();
        Some(incident.clone())
    }

    /// Aggregate counts; `categories` seeds `by_category` so every known
    /// category is present even at zero.
    pub fn metrics(&self, categories: &[String]) -> IncidentMetrics {
        let g = self.inner.lock().expect("incident store mutex poisoned");
        let mut by_category: Vec<(String, usize)> =
            categories.iter().map(|c| (c.clone(), 0)).collect();
        let mut m = IncidentMetrics {
            total_incidents: g.incidents.len(),
            high_priority: 0,
            open: 0,
            resolved: 0,
            by_category: CategoryCounts::default(),
        };
        for i in &g.incidents {
            if i.urgency_level == UrgencyLevel::High {
                m.high_priority += 1;
            }
            match i.status {
                IncidentStatus::Open => m.open += 1,
                IncidentStatus::Resolved => m.resolved += 1,
            }
            if let Some((_, n)) = by_category.iter_mut().find(|(c, _)| *c == i.category) {
                *n += 1;
            }
        }
        m.by_category = CategoryCounts(by_category);
        m
    }
}

fn build(id: u64, new: NewIncident) -> Incident {
    let now = Utc::now();
    Incident {
        id,
        title: new.title,
        description: new.description,
        category: new.category,
        urgency_level: new.urgency_level,
        status: IncidentStatus::Open,
        created_at: now,
        updated_at: now,
        document_count: new.documents.len(),
        documents: new.documents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_incident(category: &str, urgency: UrgencyLevel) -> NewIncident {
        NewIncident {
            title: "t".into(),
            description: "d".into(),
            category: category.into(),
            urgency_level: urgency,
            documents: Vec::new(),
        }
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let s = IncidentStore::new();
        let a = s.create(new_incident("Payment Issue", UrgencyLevel::High));
        let b = s.create(new_incident("Payment Issue", UrgencyLevel::Low));
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.status, IncidentStatus::Open);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn reserved_ids_are_never_reused() {
        let s = IncidentStore::new();
        let r = s.reserve_id();
        let c = s.create(new_incident("Storage Issue", UrgencyLevel::Medium));
        assert_eq!(r, 1);
        assert_eq!(c.id, 2);
        s.create_with_id(r, new_incident("Storage Issue", UrgencyLevel::Medium));
        let ids: Vec<u64> = s.list().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn status_update_bumps_updated_at() {
        let s = IncidentStore::new();
        let a = s.create(new_incident("Payment Issue", UrgencyLevel::High));
        let b = s.update_status(a.id, IncidentStatus::Resolved).unwrap();
        assert_eq!(b.status, IncidentStatus::Resolved);
        assert!(b.updated_at >= a.updated_at);
        assert_eq!(b.created_at, a.created_at);
        assert!(s.update_status(99, IncidentStatus::Resolved).is_none());
    }

    #[test]
    fn metrics_count_every_category() {
        let s = IncidentStore::new();
        s.create(new_incident("Payment Issue", UrgencyLevel::High));
        s.create(new_incident("Payment Issue", UrgencyLevel::Medium));
        let c = s.create(new_incident("Contract Issue", UrgencyLevel::Low));
        s.update_status(c.id, IncidentStatus::Resolved);

        let cats = vec![
            "Payment Issue".to_string(),
            "Contract Issue".to_string(),
            "Currency Risk".to_string(),
        ];
        let m = s.metrics(&cats);
        assert_eq!(m.total_incidents, 3);
        assert_eq!(m.high_priority, 1);
        assert_eq!(m.open, 2);
        assert_eq!(m.resolved, 1);
        assert_eq!(m.by_category.get("Payment Issue"), Some(2));
        assert_eq!(m.by_category.get("Contract Issue"), Some(1));
        assert_eq!(m.by_category.get("Currency Risk"), Some(0));
        assert_eq!(m.by_category.get("Storage Issue"), None);
    }

    #[test]
    fn category_counts_keep_the_given_order() {
        let s = IncidentStore::new();
        s.create(new_incident("Currency Risk", UrgencyLevel::Low));
        let cats = vec![
            "Documentation Issue".to_string(),
            "Currency Risk".to_string(),
            "Aggregation Issue".to_string(),
        ];
        let m = s.metrics(&cats);
        let order: Vec<&str> = m.by_category.iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec!["Documentation Issue", "Currency Risk", "Aggregation Issue"]);

        let json = serde_json::to_string(&m.by_category).unwrap();
        assert_eq!(
            json,
            r#"{"Documentation Issue":0,"Currency Risk":1,"Aggregation Issue":0}"#
        );
    }

    #[test]
    fn concurrent_creates_get_distinct_gap_free_ids() {
        let s = Arc::new(IncidentStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = Arc::clone(&s);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| s.create(new_incident("Payment Issue", UrgencyLevel::Low)).id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=400).collect::<Vec<u64>>());
        assert_eq!(s.list().len(), 400);
    }
}
