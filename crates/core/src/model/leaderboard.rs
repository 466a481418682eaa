use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::PlayerName;

/// Maximum number of entries kept per category.
pub const LEADERBOARD_CAP: usize = 10;

/// Score percentage rounded to the nearest integer.
///
/// Defined as 0 for zero-question sessions instead of dividing by zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percent_of(score: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = f64::from(score) * 100.0 / f64::from(total);
    ratio.round().min(100.0) as u8
}

/// One persisted leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub total: u32,
    pub percent: u8,
    pub recorded_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn new(name: &PlayerName, score: u32, total: u32, recorded_at: DateTime<Utc>) -> Self {
        Self {
            name: name.as_str().to_owned(),
            score,
            total,
            percent: percent_of(score, total),
            recorded_at,
        }
    }
}

/// Entries rank by percent desc, then score desc, then newest first.
fn ranking(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.percent
        .cmp(&a.percent)
        .then_with(|| b.score.cmp(&a.score))
        .then_with(|| b.recorded_at.cmp(&a.recorded_at))
}

/// Top-10 board for one category key.
///
/// Invariant: entries are sorted by [`ranking`] and there are at most
/// [`LEADERBOARD_CAP`] of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a board from persisted entries, restoring the sort order
    /// and cap regardless of how the data was stored.
    #[must_use]
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(ranking);
        entries.truncate(LEADERBOARD_CAP);
        Self { entries }
    }

    /// Insert an entry at its rank, dropping whatever falls past the cap.
    ///
    /// Returns `false` when the entry ranked below a full board and was
    /// discarded.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> bool {
        let rank = self
            .entries
            .partition_point(|existing| ranking(existing, &entry) != Ordering::Greater);
        if rank >= LEADERBOARD_CAP {
            return false;
        }
        self.entries.insert(rank, entry);
        self.entries.truncate(LEADERBOARD_CAP);
        true
    }

    #[must_use]
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn entry(name: &str, score: u32, total: u32, days_ago: i64) -> LeaderboardEntry {
        LeaderboardEntry::new(
            &PlayerName::new(name),
            score,
            total,
            fixed_now() - Duration::days(days_ago),
        )
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(7, 10), 70);
        assert_eq!(percent_of(10, 10), 100);
    }

    #[test]
    fn percent_of_empty_session_is_zero() {
        assert_eq!(percent_of(0, 0), 0);
    }

    #[test]
    fn insert_keeps_ranking_order() {
        let mut board = Leaderboard::new();
        board.insert(entry("mid", 5, 10, 0));
        board.insert(entry("top", 9, 10, 0));
        board.insert(entry("low", 2, 10, 0));

        let names: Vec<_> = board.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["top", "mid", "low"]);
    }

    #[test]
    fn equal_percent_breaks_on_score_then_recency() {
        let mut board = Leaderboard::new();
        board.insert(entry("older", 5, 10, 3));
        board.insert(entry("newer", 5, 10, 1));
        board.insert(entry("bigger", 10, 20, 2));

        let names: Vec<_> = board.entries().iter().map(|e| e.name.as_str()).collect();
        // Same 50% everywhere: higher raw score first, then newest.
        assert_eq!(names, vec!["bigger", "newer", "older"]);
    }

    #[test]
    fn low_insert_into_full_board_is_discarded() {
        let mut board = Leaderboard::new();
        for i in 0..LEADERBOARD_CAP {
            assert!(board.insert(entry(&format!("p{i}"), 8, 10, 0)));
        }
        let before = board.entries().to_vec();

        assert!(!board.insert(entry("straggler", 1, 10, 0)));
        assert_eq!(board.entries(), &before[..]);
    }

    #[test]
    fn outranking_insert_drops_bottom_of_full_board() {
        let mut board = Leaderboard::new();
        for i in 0..LEADERBOARD_CAP {
            board.insert(entry(&format!("p{i}"), 5, 10, 0));
        }

        assert!(board.insert(entry("champion", 10, 10, 0)));
        assert_eq!(board.len(), LEADERBOARD_CAP);
        assert_eq!(board.entries()[0].name, "champion");
    }

    #[test]
    fn from_entries_restores_invariant() {
        let entries = vec![
            entry("low", 1, 10, 0),
            entry("top", 10, 10, 0),
            entry("mid", 5, 10, 0),
        ];
        let board = Leaderboard::from_entries(entries);
        let names: Vec<_> = board.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["top", "mid", "low"]);
    }

    #[test]
    fn entry_serde_round_trip() {
        let original = entry("Awa", 7, 10, 0);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: LeaderboardEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }
}
