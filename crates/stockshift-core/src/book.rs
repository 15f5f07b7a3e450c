//! In-memory set of tracked suggestions, in admission order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use crate::generator::TransferCandidate;
use crate::lifecycle::LifecycleError;
use crate::suggestion::{RouteKey, TransferSuggestion};

const ID_PREFIX: &str = "ts-";

/// Stable, zero-padded suggestion id (`ts-001`, `ts-002`, ...).
#[must_use]
pub fn suggestion_id(seq: u64) -> String {
    format!("{ID_PREFIX}{seq:03}")
}

/// Sequence number of an id minted by [`suggestion_id`]; `None` for any
/// other spelling (`ts-01`, `ts-+1`, `abc`).
#[must_use]
pub fn suggestion_seq(id: &str) -> Option<u64> {
    let seq: u64 = id.strip_prefix(ID_PREFIX)?.parse().ok()?;
    (suggestion_id(seq) == id).then_some(seq)
}

/// Admission order: by sequence number, so `ts-999` precedes `ts-1000`.
/// Ids outside the scheme sort last, by text.
#[must_use]
pub fn cmp_suggestion_ids(a: &str, b: &str) -> Ordering {
    match (suggestion_seq(a), suggestion_seq(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Every route claimed by `suggestions`; see [`TransferSuggestion::claimed_routes`].
pub fn claimed_routes<'a, I>(suggestions: I) -> HashSet<RouteKey>
where
    I: IntoIterator<Item = &'a TransferSuggestion>,
{
    suggestions
        .into_iter()
        .flat_map(TransferSuggestion::claimed_routes)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionBook {
    suggestions: BTreeMap<u64, TransferSuggestion>,
    next_seq: u64,
}

impl SuggestionBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A book holding exactly the admitted candidates.
    #[must_use]
    pub fn from_candidates(candidates: Vec<TransferCandidate>, now: DateTime<Utc>) -> Self {
        let mut book = Self::new();
        book.admit_candidates(candidates, now);
        book
    }

    /// Track candidates whose route no suggestion claims. Returns the new ids.
    pub fn admit_candidates(
        &mut self,
        candidates: Vec<TransferCandidate>,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let mut routes = claimed_routes(self.suggestions.values());

        let mut added = Vec::new();
        for candidate in candidates {
            if !routes.insert(RouteKey::of(&candidate.plan)) {
                continue;
            }
            self.next_seq += 1;
            let id = suggestion_id(self.next_seq);
            self.suggestions.insert(
                self.next_seq,
                TransferSuggestion::from_candidate(id.clone(), candidate, now),
            );
            added.push(id);
        }
        added
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TransferSuggestion> {
        self.suggestions.get(&suggestion_seq(id)?)
    }

    /// Current routes of every suggestion other than `id`.
    #[must_use]
    pub fn routes_except(&self, id: &str) -> HashSet<RouteKey> {
        self.suggestions
            .values()
            .filter(|s| s.id != id)
            .map(TransferSuggestion::route_key)
            .collect()
    }

    /// Run `op` against one suggestion.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NotFound`] for an unknown id, otherwise whatever `op` returns.
    pub fn with_suggestion<T>(
        &mut self,
        id: &str,
        op: impl FnOnce(&mut TransferSuggestion) -> Result<T, LifecycleError>,
    ) -> Result<T, LifecycleError> {
        let suggestion = suggestion_seq(id)
            .and_then(|seq| self.suggestions.get_mut(&seq))
            .ok_or_else(|| LifecycleError::NotFound(id.to_string()))?;
        op(suggestion)
    }

    /// Every tracked suggestion in admission order.
    #[must_use]
    pub fn all(&self) -> Vec<&TransferSuggestion> {
        self.suggestions.values().collect()
    }

    /// Suggestions with their sequence numbers, in admission order.
    pub fn into_entries(self) -> impl Iterator<Item = (u64, TransferSuggestion)> {
        self.suggestions.into_iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}
