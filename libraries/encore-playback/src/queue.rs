//! Bounded play queue
//!
//! Ordered track ids plus a cursor:
//! ```text
//!   [ A  B  C  D  E ]       capacity: 500
//!           ^
//!         cursor = 2 (C is playing / about to play)
//! ```
//! Appending past capacity evicts from the head and shifts the cursor down
//! by the eviction count, clamped at 0.

use encore_core::TrackId;
use std::collections::VecDeque;

/// Bounded queue of track ids with a cursor
#[derive(Debug, Clone)]
pub struct Queue {
    /// Queued ids, oldest first
    ids: VecDeque<TrackId>,

    /// Index of the current entry (`None` = unset)
    cursor: Option<usize>,

    /// Maximum length
    capacity: usize,
}

impl Queue {
    /// Create new empty queue
    ///
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ids: VecDeque::with_capacity(capacity.min(64)),
            cursor: None,
            capacity,
        }
    }

    /// Replace the whole queue and point the cursor at the first entry
    ///
    /// Returns the first id, or `None` without touching the queue when
    /// `ids` is empty.
    pub fn replace<I>(&mut self, ids: I) -> Option<TrackId>
    where
        I: IntoIterator<Item = TrackId>,
    {
        let ids: VecDeque<TrackId> = ids.into_iter().collect();
        if ids.is_empty() {
            return None;
        }

        self.ids = ids;
        self.cursor = Some(0);
        self.evict_overflow();
        self.ids.front().cloned()
    }

    /// Append ids to the tail, evicting from the head past capacity
    ///
    /// Returns the number of evicted entries.
    pub fn append<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = TrackId>,
    {
        self.ids.extend(ids);
        self.evict_overflow()
    }

    /// Append `id` unless it is already queued anywhere
    ///
    /// Returns whether the id was added.
    pub fn push_unique(&mut self, id: TrackId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.append(std::iter::once(id));
        true
    }

    /// Move the cursor forward by one if there is a next entry
    ///
    /// From an unset cursor on a non-empty queue this moves to 0.
    pub fn advance(&mut self) -> bool {
        let next = match self.cursor {
            Some(index) => index + 1,
            None => 0,
        };

        if next < self.ids.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Move the cursor back by one if there is a previous entry
    pub fn retreat(&mut self) -> bool {
        match self.cursor {
            Some(index) if index > 0 => {
                self.cursor = Some(index - 1);
                true
            }
            _ => false,
        }
    }

    /// Point the cursor at `index` (ignored when out of bounds)
    pub fn set_cursor(&mut self, index: usize) -> bool {
        if index < self.ids.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    /// Check if `id` is queued anywhere
    pub fn contains(&self, id: &TrackId) -> bool {
        self.ids.iter().any(|queued| queued == id)
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.ids.clear();
        self.cursor = None;
    }

    /// Id under the cursor
    pub fn current(&self) -> Option<&TrackId> {
        self.cursor.and_then(|index| self.ids.get(index))
    }

    /// Get id at index
    pub fn get(&self, index: usize) -> Option<&TrackId> {
        self.ids.get(index)
    }

    /// Cursor index (`None` while unset)
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Whether the cursor sits on the final entry
    pub fn is_at_last(&self) -> bool {
        matches!(self.cursor, Some(index) if index + 1 == self.ids.len())
    }

    /// All queued ids in order
    pub fn ids(&self) -> Vec<TrackId> {
        self.ids.iter().cloned().collect()
    }

    /// Number of queued ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Maximum length
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_overflow(&mut self) -> usize {
        let overflow = self.ids.len().saturating_sub(self.capacity);
        if overflow == 0 {
            return 0;
        }

        self.ids.drain(..overflow);
        self.cursor = self.cursor.map(|index| index.saturating_sub(overflow));
        overflow
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_QUEUE_CAPACITY)
    }
}
