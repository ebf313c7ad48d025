//! Suggestion expansion (queue read-ahead)
//!
//! After a track starts, the queue is topped up with related tracks so
//! skip-to-next always has somewhere to go:
//! - empty queue: seed it with the played track followed by its relatives
//! - cursor on the last entry: append the relatives
//! - anywhere else: nothing to do

use crate::queue::Queue;
use encore_core::{TrackId, TrackSummary};

/// Expansion needed for the current queue shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    /// Queue is empty: `[played] ++ related`, cursor 0
    Seed,

    /// Cursor sits on the last entry: append related
    Extend,

    /// Enough read-ahead already
    None,
}

impl Expansion {
    /// Classify `queue`
    pub fn plan(queue: &Queue) -> Self {
        if queue.is_empty() {
            Expansion::Seed
        } else if queue.is_at_last() {
            Expansion::Extend
        } else {
            Expansion::None
        }
    }

    pub fn needs_fetch(&self) -> bool {
        !matches!(self, Expansion::None)
    }

    /// Apply fetched `related` tracks to `queue`
    ///
    /// Returns the number of entries evicted from the head.
    pub fn apply(&self, queue: &mut Queue, played: &TrackId, related: &[TrackSummary]) -> usize {
        let related_ids = related.iter().map(|summary| summary.id.clone());

        match self {
            Expansion::Seed => {
                let len_before = 1 + related.len();
                queue.replace(std::iter::once(played.clone()).chain(related_ids));
                len_before.saturating_sub(queue.len())
            }
            Expansion::Extend => queue.append(related_ids),
            Expansion::None => 0,
        }
    }
}

/// Remembers the last boundary state an extension succeeded for
///
/// The state is the played id together with the queue length at the time;
/// replaying the same track at an unchanged boundary does not fetch again.
/// Only consulted for [`Expansion::Extend`]: seeding an empty queue always
/// fetches.
#[derive(Debug, Clone, Default)]
pub struct ExpansionGuard {
    last: Option<(TrackId, usize)>,
}

impl ExpansionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a fetch for this state has already been done
    pub fn already_expanded(&self, played: &TrackId, queue_len: usize) -> bool {
        matches!(&self.last, Some((id, len)) if id == played && *len == queue_len)
    }

    /// Record the state after a completed expansion
    pub fn mark(&mut self, played: TrackId, queue_len: usize) {
        self.last = Some((played, queue_len));
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<TrackId> {
        raw.iter().map(|id| TrackId::new(*id)).collect()
    }

    fn related(raw: &[&str]) -> Vec<TrackSummary> {
        raw.iter()
            .map(|id| TrackSummary::new(*id, format!("Song {}", id), "Artist"))
            .collect()
    }

    #[test]
    fn empty_queue_is_seeded() {
        let mut queue = Queue::new(10);
        let plan = Expansion::plan(&queue);
        assert_eq!(plan, Expansion::Seed);

        plan.apply(&mut queue, &TrackId::new("A"), &related(&["B", "C"]));

        assert_eq!(queue.ids(), ids(&["A", "B", "C"]));
        assert_eq!(queue.cursor(), Some(0));
    }

    #[test]
    fn last_position_is_extended() {
        let mut queue = Queue::new(10);
        queue.replace(ids(&["A", "B"]));
        queue.advance();

        let plan = Expansion::plan(&queue);
        assert_eq!(plan, Expansion::Extend);

        let evicted = plan.apply(&mut queue, &TrackId::new("B"), &related(&["C", "D"]));

        assert_eq!(evicted, 0);
        assert_eq!(queue.ids(), ids(&["A", "B", "C", "D"]));
        assert_eq!(queue.cursor(), Some(1));
    }

    #[test]
    fn middle_position_needs_nothing() {
        let mut queue = Queue::new(10);
        queue.replace(ids(&["A", "B"]));

        let plan = Expansion::plan(&queue);
        assert_eq!(plan, Expansion::None);
        assert!(!plan.needs_fetch());
    }

    #[test]
    fn extension_respects_capacity() {
        let mut queue = Queue::new(3);
        queue.replace(ids(&["A", "B"]));
        queue.advance();

        let evicted = Expansion::Extend.apply(&mut queue, &TrackId::new("B"), &related(&["C", "D"]));

        assert_eq!(evicted, 1);
        assert_eq!(queue.ids(), ids(&["B", "C", "D"]));
        assert_eq!(queue.cursor(), Some(0));
    }

    #[test]
    fn guard_matches_identical_state_only() {
        let mut guard = ExpansionGuard::new();
        let played = TrackId::new("A");
        assert!(!guard.already_expanded(&played, 1));

        guard.mark(played.clone(), 1);
        assert!(guard.already_expanded(&played, 1));
        assert!(!guard.already_expanded(&played, 3));
        assert!(!guard.already_expanded(&TrackId::new("B"), 1));

        guard.reset();
        assert!(!guard.already_expanded(&played, 1));
    }
}
