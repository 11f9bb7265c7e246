//! Persisted top-score table
//!
//! Persists as a bare JSON array of at most five integers, descending.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_HIGHSCORES;

/// Top scores, sorted descending, capped at [`MAX_HIGHSCORES`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    entries: Vec<i64>,
}

impl HighScores {
    pub fn entries(&self) -> &[i64] {
        &self.entries
    }

    /// Best score on record, 0 when empty
    pub fn best(&self) -> i64 {
        self.entries.first().copied().unwrap_or(0)
    }

    /// A score makes the table only by beating the current worst entry, even
    /// while the table is short. Ties never displace an older entry.
    pub fn qualifies(&self, score: i64) -> bool {
        match self.entries.last() {
            None => true,
            Some(worst) => score > *worst,
        }
    }

    /// Insert a score if it qualifies. Returns its rank (0-based) on success.
    pub fn submit(&mut self, score: i64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        self.entries.push(score);
        self.entries.sort_unstable_by(|a, b| b.cmp(a));
        self.entries.truncate(MAX_HIGHSCORES);
        let rank = self.entries.iter().position(|s| *s == score)?;
        log::info!("new highscore {score} at rank {}", rank + 1);
        Some(rank)
    }
}
