//! Shared suggestion store for the HTTP layer.
//!
//! Each suggestion sits behind its own mutex so lifecycle requests on one
//! suggestion serialize while requests on different suggestions proceed in
//! parallel. The outer lock is only held to look up or insert entries.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use stockshift_core::{
    suggestion_id, suggestion_seq, RouteKey, SuggestionBook, TransferCandidate,
    TransferSuggestion,
};
use tokio::sync::{Mutex, RwLock};

pub type SharedSuggestion = Arc<Mutex<TransferSuggestion>>;

#[derive(Debug, Default)]
struct Entries {
    /// Keyed by sequence number so iteration follows admission order.
    by_seq: BTreeMap<u64, SharedSuggestion>,
    next_seq: u64,
}

#[derive(Debug, Default)]
pub struct SuggestionRegistry {
    entries: RwLock<Entries>,
}

impl SuggestionRegistry {
    #[must_use]
    pub fn from_book(book: SuggestionBook) -> Self {
        let by_seq: BTreeMap<u64, SharedSuggestion> = book
            .into_entries()
            .map(|(seq, s)| (seq, Arc::new(Mutex::new(s))))
            .collect();
        let next_seq = by_seq.keys().next_back().copied().unwrap_or(0);
        Self {
            entries: RwLock::new(Entries { by_seq, next_seq }),
        }
    }

    pub async fn get(&self, id: &str) -> Option<SharedSuggestion> {
        let seq = suggestion_seq(id)?;
        self.entries.read().await.by_seq.get(&seq).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.by_seq.len()
    }

    /// Point-in-time copy of every suggestion, in admission order.
    pub async fn snapshot(&self) -> Vec<TransferSuggestion> {
        let handles: Vec<SharedSuggestion> =
            self.entries.read().await.by_seq.values().cloned().collect();
        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            out.push(handle.lock().await.clone());
        }
        out
    }

    /// Run `op` on one suggestion with the current routes of all the others.
    /// No other route change or admission can interleave until `op` returns.
    /// `None` for an unknown id.
    pub async fn with_other_routes<T, F>(&self, id: &str, op: F) -> Option<T>
    where
        F: FnOnce(&mut TransferSuggestion, &HashSet<RouteKey>) -> T,
    {
        let seq = suggestion_seq(id)?;
        let entries = self.entries.write().await;
        let handle = entries.by_seq.get(&seq)?.clone();

        let mut occupied = HashSet::new();
        for (other_seq, other) in &entries.by_seq {
            if *other_seq != seq {
                occupied.insert(other.lock().await.route_key());
            }
        }

        let mut suggestion = handle.lock().await;
        Some(op(&mut suggestion, &occupied))
    }

    /// Track candidates whose route no suggestion claims, either as its
    /// current route or as the route it was admitted on. Returns the ids
    /// that were added.
    pub async fn admit(&self, candidates: Vec<TransferCandidate>, now: DateTime<Utc>) -> Vec<String> {
        let mut entries = self.entries.write().await;

        let mut routes: HashSet<RouteKey> = HashSet::new();
        for handle in entries.by_seq.values() {
            routes.extend(handle.lock().await.claimed_routes());
        }

        let mut added = Vec::new();
        for candidate in candidates {
            if !routes.insert(RouteKey::of(&candidate.plan)) {
                continue;
            }
            entries.next_seq += 1;
            let seq = entries.next_seq;
            let id = suggestion_id(seq);
            let suggestion = TransferSuggestion::from_candidate(id.clone(), candidate, now);
            entries.by_seq.insert(seq, Arc::new(Mutex::new(suggestion)));
            added.push(id);
        }
        added
    }
}
