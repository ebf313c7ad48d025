//! Listening history
//!
//! [`History`] is the bounded in-memory log (most recent first);
//! [`HistoryStore`] wraps it with persistence through a `KeyValueStore`,
//! writing the whole list on every change.

use crate::error::Result;
use chrono::{DateTime, Utc};
use encore_core::{Track, TrackId};
use encore_storage::{save_json, KeyValueStore};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// One played track
///
/// Serialized flat: the track fields plus `played_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub track: Track,

    #[serde(default = "Utc::now")]
    pub played_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(track: Track) -> Self {
        Self {
            track,
            played_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &TrackId {
        &self.track.id
    }
}

/// Playback history with bounded size
///
/// Most recent entry at index 0; pushing past capacity drops the oldest.
#[derive(Debug, Clone)]
pub struct History {
    /// History buffer (most recent = front)
    entries: VecDeque<HistoryEntry>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size.min(128)),
            max_size,
        }
    }

    /// Build from stored entries (most recent first), trimming to capacity
    pub fn from_entries(entries: Vec<HistoryEntry>, max_size: usize) -> Self {
        let mut history = Self::new(max_size);
        history.entries.extend(entries);
        history.entries.truncate(history.max_size);
        history
    }

    /// Prepend an entry, discarding the oldest when full
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.max_size);
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Get entry at index (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// All entries, most recent first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HISTORY_CAPACITY)
    }
}

/// Persisted history
pub struct HistoryStore {
    history: History,
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl HistoryStore {
    /// Restore history from `store`
    ///
    /// Never fails: a missing document yields an empty history, and a
    /// malformed one is logged and ignored. Individual records that do not
    /// parse are skipped.
    pub async fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>, max_size: usize) -> Self {
        let key = key.into();
        let entries = match store.get(&key).await {
            Ok(Some(document)) => parse_entries(&document, &key),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read stored history, starting empty");
                Vec::new()
            }
        };

        debug!(key = %key, entries = entries.len(), "Restored history");
        Self {
            history: History::from_entries(entries, max_size),
            store,
            key,
        }
    }

    /// Prepend `track` and persist
    ///
    /// The in-memory history is updated even if persisting fails.
    pub async fn record(&mut self, track: Track) -> Result<()> {
        self.history.push(HistoryEntry::new(track));
        self.persist().await
    }

    /// Drop all entries and persist the empty list
    pub async fn clear(&mut self) -> Result<()> {
        self.history.clear();
        self.persist().await
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn persist(&self) -> Result<()> {
        let entries: Vec<&HistoryEntry> = self.history.entries.iter().collect();
        save_json(self.store.as_ref(), &self.key, &entries).await?;
        Ok(())
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("key", &self.key)
            .field("len", &self.history.len())
            .finish_non_exhaustive()
    }
}

fn parse_entries(document: &str, key: &str) -> Vec<HistoryEntry> {
    let records: Vec<serde_json::Value> = match serde_json::from_str(document) {
        Ok(records) => records,
        Err(e) => {
            warn!(key = %key, error = %e, "Stored history is malformed, starting empty");
            return Vec::new();
        }
    };

    let total = records.len();
    let entries: Vec<HistoryEntry> = records
        .into_iter()
        .filter_map(|record| serde_json::from_value(record).ok())
        .collect();

    if entries.len() < total {
        warn!(
            key = %key,
            skipped = total - entries.len(),
            "Skipped unreadable history records"
        );
    }

    entries
}
