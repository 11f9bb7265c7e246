//! Score & combo engine
//!
//! Tracks score, the combo chain with its decay window, per-round catch
//! statistics, and the one-shot character-unlock thresholds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use super::state::{Character, GameEvent, PowerUpKind};
use crate::consts::*;

/// Characters unlockable by score, with their thresholds
const UNLOCK_THRESHOLDS: [(Character, i64); 1] = [(Character::MyMelody, CHARACTER_UNLOCK_SCORE)];

/// Which characters the player owns, and which one is in play this round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRoster {
    pub selected: Character,
    unlocked: BTreeMap<Character, bool>,
}

impl Default for CharacterRoster {
    fn default() -> Self {
        let mut unlocked = BTreeMap::new();
        unlocked.insert(Character::Kuromi, true);
        unlocked.insert(Character::MyMelody, false);
        Self {
            selected: Character::Kuromi,
            unlocked,
        }
    }
}

impl CharacterRoster {
    pub fn with_unlocked(my_melody: bool) -> Self {
        let mut roster = Self::default();
        if my_melody {
            roster.unlocked.insert(Character::MyMelody, true);
        }
        roster
    }

    pub fn is_unlocked(&self, character: Character) -> bool {
        self.unlocked.get(&character).copied().unwrap_or(false)
    }

    pub fn select(&mut self, character: Character) -> bool {
        if !self.is_unlocked(character) {
            return false;
        }
        self.selected = character;
        true
    }

    /// One-shot edge-crossing scan: a character unlocks only on the call whose
    /// score change crosses its threshold, so repeated calls at a high score
    /// cannot re-fire the notification.
    fn check_unlocks(&mut self, old_score: i64, new_score: i64, events: &mut Vec<GameEvent>) {
        for (character, threshold) in UNLOCK_THRESHOLDS {
            if !self.is_unlocked(character) && old_score < threshold && new_score >= threshold {
                self.unlocked.insert(character, true);
                events.push(GameEvent::CharacterUnlocked(character));
            }
        }
    }
}

/// Score and combo state for one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreState {
    /// Current score; clamped at zero (a bad catch cannot push it negative)
    pub score: i64,
    /// Combo chain, 0..=MAX_COMBO
    pub combo: u32,
    pub last_catch_ms: u64,
    /// Good items caught this round
    pub items_collected: u32,
    /// Consecutive good catches without a bad hit or a missed good item
    pub perfect_streak: u32,
    /// Distinct power-up kinds collected this round
    pub powerup_kinds: BTreeSet<PowerUpKind>,
    /// Best score ever, read from the persisted highscores at round start
    pub highest_score: i64,
}

impl ScoreState {
    pub fn new(highest_score: i64) -> Self {
        Self {
            score: 0,
            combo: 0,
            last_catch_ms: 0,
            items_collected: 0,
            perfect_streak: 0,
            powerup_kinds: BTreeSet::new(),
            highest_score,
        }
    }

    /// Register a good catch against the combo window: within COMBO_TIME_MS of
    /// the previous catch the chain grows (capped), otherwise it restarts at 1.
    pub fn add_combo(&mut self, now_ms: u64) {
        if now_ms.saturating_sub(self.last_catch_ms) < COMBO_TIME_MS {
            self.combo = (self.combo + 1).min(MAX_COMBO);
        } else {
            self.combo = 1;
        }
        self.last_catch_ms = now_ms;
    }

    /// Bad-item hit: combo chain and perfect streak both break
    pub fn reset_combo(&mut self) {
        self.combo = 0;
        self.perfect_streak = 0;
    }

    /// Add points to the score.
    ///
    /// Applies the multiplier power-up, then the combo bonus
    /// `1 + (combo - 1) * COMBO_MULTIPLIER`, truncates, and runs the
    /// character-unlock scan over the old/new score pair.
    pub fn add_score(
        &mut self,
        points: i64,
        has_multiplier: bool,
        roster: &mut CharacterRoster,
        events: &mut Vec<GameEvent>,
    ) {
        let mut value = points as f64;
        if has_multiplier {
            value *= MULTIPLIER_VALUE;
        }
        value *= 1.0 + (self.combo as f64 - 1.0) * COMBO_MULTIPLIER;

        let old_score = self.score;
        let mut new_score = old_score + value as i64;
        if new_score < 0 {
            log::debug!("score clamped to 0 (was about to reach {new_score})");
            new_score = 0;
        }
        self.score = new_score;

        roster.check_unlocks(old_score, new_score, events);
    }

    /// Flat bonus, bypassing multiplier and combo scaling (objective rewards).
    /// Still runs the unlock scan so a bonus can cross a character threshold.
    pub fn add_bonus(
        &mut self,
        points: i64,
        roster: &mut CharacterRoster,
        events: &mut Vec<GameEvent>,
    ) {
        let old_score = self.score;
        self.score = (old_score + points).max(0);
        roster.check_unlocks(old_score, self.score, events);
    }

    /// Points for a single catch, computed from the pre-catch combo.
    ///
    /// `base * level * LEVEL_SCORE_MULTIPLIER * (1 + combo * COMBO_MULTIPLIER)
    ///  * score_mult`, truncated. The combo bonus intentionally applies here
    /// *and* inside [`Self::add_score`].
    pub fn catch_points(is_good: bool, level: u32, combo: u32, score_mult: f64) -> i64 {
        let base = if is_good {
            CATCH_BASE_POINTS
        } else {
            -CATCH_BASE_POINTS
        };
        let points = base
            * level as f64
            * LEVEL_SCORE_MULTIPLIER
            * (1.0 + combo as f64 * COMBO_MULTIPLIER)
            * score_mult;
        points as i64
    }
}
