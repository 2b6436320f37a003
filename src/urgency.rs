//! Urgency tiers used for prioritisation and SLA ceilings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operational priority of an incident.
///
/// Variant order gives the total order `Low < Medium < High`, so `max()`
/// picks the more urgent of two levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 3] = [UrgencyLevel::High, UrgencyLevel::Medium, UrgencyLevel::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::High => "High",
            UrgencyLevel::Medium => "Medium",
            UrgencyLevel::Low => "Low",
        }
    }
}

impl Default for UrgencyLevel {
    fn default() -> Self {
        UrgencyLevel::Medium
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrgencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(UrgencyLevel::High),
            "medium" => Ok(UrgencyLevel::Medium),
            "low" => Ok(UrgencyLevel::Low),
            other => Err(format!("unknown urgency level: {other}")),
        }
    }
}

/// One value per urgency tier (SLA hours, multipliers, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerUrgency<T> {
    pub high: T,
    pub medium: T,
    pub low: T,
}

impl<T: Copy> PerUrgency<T> {
    pub fn get(&self, level: UrgencyLevel) -> T {
        match level {
            UrgencyLevel::High => self.high,
            UrgencyLevel::Medium => self.medium,
            UrgencyLevel::Low => self.low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_operational_priority() {
        assert!(UrgencyLevel::High > UrgencyLevel::Medium);
        assert!(UrgencyLevel::Medium > UrgencyLevel::Low);
        assert_eq!(UrgencyLevel::Low.max(UrgencyLevel::High), UrgencyLevel::High);
    }

    #[test]
    fn parses_case_insensitively_and_serializes_capitalized() {
        assert_eq!(" HIGH ".parse::<UrgencyLevel>(), Ok(UrgencyLevel::High));
        assert!("urgent".parse::<UrgencyLevel>().is_err());
        assert_eq!(
            serde_json::to_string(&UrgencyLevel::Medium).unwrap(),
            "\"Medium\""
        );
    }
}
