use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity tier derived from the shortage at the destination store.
///
/// Ordered so that `Critical` sorts highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown urgency tier '{0}'; expected low, medium, high, or critical")]
pub struct UnknownUrgency(pub String);

impl Urgency {
    pub const ALL: [Urgency; 4] = [
        Urgency::Critical,
        Urgency::High,
        Urgency::Medium,
        Urgency::Low,
    ];

    /// Classify a shortage magnitude. Thresholds are strict and checked top-down.
    #[must_use]
    pub fn classify(shortage: u32) -> Self {
        if shortage > 150 {
            Urgency::Critical
        } else if shortage > 100 {
            Urgency::High
        } else if shortage > 50 {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = UnknownUrgency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Urgency::Low),
            "medium" => Ok(Urgency::Medium),
            "high" => Ok(Urgency::High),
            "critical" => Ok(Urgency::Critical),
            _ => Err(UnknownUrgency(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries_are_strict() {
        assert_eq!(Urgency::classify(0), Urgency::Low);
        assert_eq!(Urgency::classify(50), Urgency::Low);
        assert_eq!(Urgency::classify(51), Urgency::Medium);
        assert_eq!(Urgency::classify(100), Urgency::Medium);
        assert_eq!(Urgency::classify(101), Urgency::High);
        assert_eq!(Urgency::classify(150), Urgency::High);
        assert_eq!(Urgency::classify(151), Urgency::Critical);
    }

    #[test]
    fn critical_sorts_highest() {
        let mut tiers = vec![Urgency::Medium, Urgency::Critical, Urgency::Low, Urgency::High];
        tiers.sort();
        assert_eq!(
            tiers,
            vec![Urgency::Low, Urgency::Medium, Urgency::High, Urgency::Critical]
        );
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Urgency>(), Ok(Urgency::High));
        assert_eq!(" critical ".parse::<Urgency>(), Ok(Urgency::Critical));
        assert!("urgent".parse::<Urgency>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for tier in Urgency::ALL {
            assert_eq!(tier.to_string().parse::<Urgency>(), Ok(tier));
        }
    }
}
