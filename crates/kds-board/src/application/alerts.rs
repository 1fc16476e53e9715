//! New-ticket alert tracking.
//!
//! The board chimes once for every pending order id it has not seen pending
//! before. Ids are compared against the previous resync's pending set, so a
//! ticket that stays pending across refetches cues only on first sight.

use std::collections::HashSet;

use uuid::Uuid;

#[derive(Debug, Default)]
pub struct AlertTracker {
    seen: HashSet<Uuid>,
}

impl AlertTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the pending ids of a fresh snapshot and return the ones that
    /// were not pending last time.
    pub fn observe<I>(&mut self, pending: I) -> Vec<Uuid>
    where
        I: IntoIterator<Item = Uuid>,
    {
        let current: HashSet<Uuid> = pending.into_iter().collect();
        let new: Vec<Uuid> = current.difference(&self.seen).copied().collect();
        self.seen = current;
        new
    }
}

/// How many cues to actually play for a batch of new tickets. The toggle
/// drops them entirely rather than queueing them for later.
pub fn cue_count(new_pending: usize, sound_on: bool) -> usize {
    if sound_on {
        new_pending
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_cues_then_goes_quiet() {
        let mut tracker = AlertTracker::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut first = tracker.observe([a, b]);
        first.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(first, expected);

        assert!(tracker.observe([a, b]).is_empty());
    }

    #[test]
    fn only_fresh_ids_cue_on_later_snapshots() {
        let mut tracker = AlertTracker::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        tracker.observe([a, b]);
        // a got accepted, c arrived.
        assert_eq!(tracker.observe([b, c]), vec![c]);
    }

    #[test]
    fn empty_snapshot_resets_nothing_noisily() {
        let mut tracker = AlertTracker::new();
        let a = Uuid::new_v4();
        tracker.observe([a]);
        assert!(tracker.observe([]).is_empty());
    }

    #[test]
    fn sound_toggle_gates_cues() {
        assert_eq!(cue_count(3, true), 3);
        assert_eq!(cue_count(3, false), 0);
        assert_eq!(cue_count(0, true), 0);
    }
}
