//! Filtered, sorted projection of the suggestion set plus summary stats.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::book::cmp_suggestion_ids;
use crate::suggestion::TransferSuggestion;
use crate::urgency::{UnknownUrgency, Urgency};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrgencyFilter {
    #[default]
    All,
    Only(Urgency),
}

impl UrgencyFilter {
    #[must_use]
    pub fn matches(self, urgency: Urgency) -> bool {
        match self {
            UrgencyFilter::All => true,
            UrgencyFilter::Only(u) => u == urgency,
        }
    }
}

impl FromStr for UrgencyFilter {
    type Err = UnknownUrgency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(UrgencyFilter::All)
        } else {
            trimmed.parse().map(UrgencyFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Critical first, then most cost-effective.
    #[default]
    Urgency,
    Savings,
    Distance,
    Score,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown sort key '{0}'; expected urgency, savings, distance, or score")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "urgency" => Ok(SortKey::Urgency),
            "savings" => Ok(SortKey::Savings),
            "distance" => Ok(SortKey::Distance),
            "score" => Ok(SortKey::Score),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionQuery {
    pub urgency: UrgencyFilter,
    /// Case-insensitive substring of the product name. Empty matches all.
    pub search: String,
    pub sort: SortKey,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UrgencyCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl UrgencyCounts {
    fn bump(&mut self, urgency: Urgency) {
        match urgency {
            Urgency::Critical => self.critical += 1,
            Urgency::High => self.high += 1,
            Urgency::Medium => self.medium += 1,
            Urgency::Low => self.low += 1,
        }
    }

    #[must_use]
    pub fn get(&self, urgency: Urgency) -> usize {
        match urgency {
            Urgency::Critical => self.critical,
            Urgency::High => self.high,
            Urgency::Medium => self.medium,
            Urgency::Low => self.low,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuggestionStats {
    pub shown: usize,
    pub total_savings: f64,
    pub average_distance: f64,
    /// Neither approved nor rejected.
    pub pending_review: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Over the whole set, not just the shown rows.
    pub urgency_counts: UrgencyCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub suggestions: Vec<TransferSuggestion>,
    pub stats: SuggestionStats,
}

fn compare(key: SortKey, a: &TransferSuggestion, b: &TransferSuggestion) -> Ordering {
    let (x, y) = (&a.assessment, &b.assessment);
    let primary = match key {
        SortKey::Urgency => y
            .urgency
            .cmp(&x.urgency)
            .then_with(|| y.cost_effectiveness_score.total_cmp(&x.cost_effectiveness_score)),
        SortKey::Savings => y.estimated_savings.total_cmp(&x.estimated_savings),
        SortKey::Distance => x.distance_miles.total_cmp(&y.distance_miles),
        SortKey::Score => y.cost_effectiveness_score.total_cmp(&x.cost_effectiveness_score),
    };
    primary.then_with(|| cmp_suggestion_ids(&a.id, &b.id))
}

/// Apply filter, search, and the positive-score gate, then sort and summarize.
pub fn run_query<'a, I>(suggestions: I, query: &SuggestionQuery) -> QueryResult
where
    I: IntoIterator<Item = &'a TransferSuggestion>,
{
    let needle = query.search.trim().to_lowercase();
    let mut urgency_counts = UrgencyCounts::default();
    let mut shown: Vec<TransferSuggestion> = Vec::new();

    for s in suggestions {
        urgency_counts.bump(s.urgency());
        if s.assessment.cost_effectiveness_score > 0.0
            && query.urgency.matches(s.urgency())
            && s.plan.product_name.to_lowercase().contains(&needle)
        {
            shown.push(s.clone());
        }
    }

    shown.sort_by(|a, b| compare(query.sort, a, b));

    let total_savings: f64 = shown.iter().map(|s| s.assessment.estimated_savings).sum();
    let average_distance = if shown.is_empty() {
        0.0
    } else {
        let total: f64 = shown.iter().map(|s| s.assessment.distance_miles).sum();
        #[allow(clippy::cast_precision_loss)]
        let n = shown.len() as f64;
        total / n
    };

    let stats = SuggestionStats {
        shown: shown.len(),
        total_savings,
        average_distance,
        pending_review: shown.iter().filter(|s| s.is_open()).count(),
        approved: shown.iter().filter(|s| s.is_approved()).count(),
        rejected: shown.iter().filter(|s| s.is_rejected()).count(),
        urgency_counts,
    };

    QueryResult {
        suggestions: shown,
        stats,
    }
}
