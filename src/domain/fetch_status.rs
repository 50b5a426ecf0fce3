use serde::{Deserialize, Serialize};

/// When a student last pulled announcements for a quiz.
///
/// Invariant: `previous_fetch <= time_fetched`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchStatus {
    pub quiz_id: i64,
    pub user_id: i64,
    pub time_fetched: i64,
    pub previous_fetch: i64,
}

impl FetchStatus {
    /// Record created on a student's first fetch in an attempt.
    pub fn first(quiz_id: i64, user_id: i64, now: i64) -> Self {
        Self {
            quiz_id,
            user_id,
            time_fetched: now,
            previous_fetch: now,
        }
    }

    /// The "new since" boundary a fetch at `now` should use.
    ///
    /// A fetch less than `reannounce_window` seconds after the last one is a
    /// reload: it reuses the older `previous_fetch` so the announcements shown
    /// by the last load are neither lost nor re-announced twice.
    pub fn boundary(&self, now: i64, reannounce_window: i64) -> i64 {
        if now - self.time_fetched < reannounce_window {
            self.previous_fetch
        } else {
            self.time_fetched
        }
    }

    /// Moves the record forward to `now` and returns the boundary used.
    pub fn advance(&mut self, now: i64, reannounce_window: i64) -> i64 {
        let boundary = self.boundary(now, reannounce_window);
        self.previous_fetch = boundary;
        // A clock step backwards must not break the ordering invariant.
        self.time_fetched = now.max(boundary);
        boundary
    }
}

/// Outcome of recording a fetch against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchUpdate {
    /// First fetch of the attempt; nothing is "new" relative to the page.
    Created(FetchStatus),
    /// Existing record advanced; `boundary` is the "new since" time.
    Advanced { boundary: i64, status: FetchStatus },
    /// No record exists and none was created (preview users).
    Untracked,
}

impl FetchUpdate {
    pub fn boundary(&self) -> Option<i64> {
        match self {
            FetchUpdate::Advanced { boundary, .. } => Some(*boundary),
            FetchUpdate::Created(_) | FetchUpdate::Untracked => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fetch_sets_both_times() {
        let status = FetchStatus::first(1, 2, 1005);
        assert_eq!(status.time_fetched, 1005);
        assert_eq!(status.previous_fetch, 1005);
    }

    #[test]
    fn test_advance_outside_window_uses_last_fetch() {
        let mut status = FetchStatus { quiz_id: 1, user_id: 2, time_fetched: 1000, previous_fetch: 900 };
        let boundary = status.advance(1040, 5);
        assert_eq!(boundary, 1000);
        assert_eq!(status.previous_fetch, 1000);
        assert_eq!(status.time_fetched, 1040);
    }

    #[test]
    fn test_reload_within_window_keeps_previous_boundary() {
        let mut status = FetchStatus { quiz_id: 1, user_id: 2, time_fetched: 1000, previous_fetch: 900 };
        let first = status.advance(1010, 5);
        let second = status.advance(1012, 5);
        assert_eq!(first, 1000);
        assert_eq!(second, first);
        assert_eq!(status.time_fetched, 1012);
        assert_eq!(status.previous_fetch, 1000);
    }

    #[test]
    fn test_window_edge_is_not_a_reload() {
        let mut status = FetchStatus { quiz_id: 1, user_id: 2, time_fetched: 1000, previous_fetch: 900 };
        assert_eq!(status.advance(1005, 5), 1000);
    }

    #[test]
    fn test_advance_preserves_ordering_invariant() {
        let mut status = FetchStatus { quiz_id: 1, user_id: 2, time_fetched: 1000, previous_fetch: 900 };
        status.advance(990, 5);
        assert!(status.previous_fetch <= status.time_fetched);
    }
}
