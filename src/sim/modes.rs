//! Game modes and the modifiers they layer onto the base simulation
//!
//! A mode is a closed enum with a static spec table; `ModeState` carries the
//! per-round counters the pass/fail rules are computed from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::achievements::AchievementId;

/// Named rule-sets selectable at round start
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Normal,
    /// Time-boxed, good items only
    CandyRain,
    /// Everything falls faster, double points
    SpeedRush,
    /// Fewer items, forced game over below the required accuracy
    Precision,
}

impl GameMode {
    pub const ALL: [GameMode; 4] = [
        GameMode::Normal,
        GameMode::CandyRain,
        GameMode::SpeedRush,
        GameMode::Precision,
    ];

    pub fn spec(self) -> ModeSpec {
        match self {
            GameMode::Normal => ModeSpec {
                duration_ms: None,
                modifiers: Modifiers::default(),
            },
            GameMode::CandyRain => ModeSpec {
                duration_ms: Some(60_000),
                modifiers: Modifiers {
                    score_mult: 1.5,
                    good_items_only: true,
                    ..Modifiers::default()
                },
            },
            GameMode::SpeedRush => ModeSpec {
                duration_ms: None,
                modifiers: Modifiers {
                    speed_mult: 1.5,
                    score_mult: 2.0,
                    ..Modifiers::default()
                },
            },
            GameMode::Precision => ModeSpec {
                duration_ms: None,
                modifiers: Modifiers {
                    score_mult: 3.0,
                    spawn_chance: 0.7,
                    required_accuracy: Some(0.8),
                    ..Modifiers::default()
                },
            },
        }
    }

    /// Next mode in the unlock sequence
    pub fn next(self) -> Option<GameMode> {
        let all = GameMode::ALL;
        let idx = all.iter().position(|m| *m == self)?;
        all.get(idx + 1).copied()
    }

    /// Achievement granted on completing this mode
    pub fn completion_achievement(self) -> Option<AchievementId> {
        match self {
            GameMode::Normal => None,
            GameMode::CandyRain => Some(AchievementId::SugarRush),
            GameMode::SpeedRush => Some(AchievementId::SpeedDemon),
            GameMode::Precision => Some(AchievementId::Accuracy),
        }
    }
}

/// Static description of a mode
#[derive(Debug, Clone, Copy)]
pub struct ModeSpec {
    /// Time-boxed modes complete after this long
    pub duration_ms: Option<u64>,
    pub modifiers: Modifiers,
}

/// Rule modifiers applied over the base simulation.
///
/// Reset to neutral values at round start; overwritten by the selected mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Modifiers {
    /// Scales entity fall speed
    pub speed_mult: f32,
    /// Scales catch points
    pub score_mult: f64,
    /// Divides the spawn delay (higher = more frequent spawns)
    pub spawn_rate: f64,
    /// Bernoulli gate on each item-spawn attempt
    pub spawn_chance: f64,
    /// Suppress bad items entirely
    pub good_items_only: bool,
    /// Forced game over when caught/spawned drops below this
    pub required_accuracy: Option<f32>,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            speed_mult: 1.0,
            score_mult: 1.0,
            spawn_rate: 1.0,
            spawn_chance: 1.0,
            good_items_only: false,
            required_accuracy: None,
        }
    }
}

/// Per-round mode bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeState {
    pub mode: GameMode,
    pub modifiers: Modifiers,
    pub started_ms: u64,
    /// Good items spawned and caught this round; accuracy ignores bad items
    pub items_spawned: u32,
    pub items_caught: u32,
    /// Time-boxed completion already fired
    pub completed: bool,
}

impl ModeState {
    pub fn start(mode: GameMode, now_ms: u64) -> Self {
        Self {
            mode,
            modifiers: mode.spec().modifiers,
            started_ms: now_ms,
            items_spawned: 0,
            items_caught: 0,
            completed: false,
        }
    }

    /// Good-item catch ratio so far, None before the first spawn
    pub fn accuracy(&self) -> Option<f32> {
        if self.items_spawned == 0 {
            return None;
        }
        Some(self.items_caught as f32 / self.items_spawned as f32)
    }
}

/// Persisted map of unlocked modes.
///
/// Every mode starts unlocked; completing a time-boxed mode still marks the
/// next one unlocked so the record survives a future default change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeUnlocks {
    unlocked: BTreeMap<GameMode, bool>,
}

impl Default for ModeUnlocks {
    fn default() -> Self {
        let unlocked = GameMode::ALL.iter().map(|m| (*m, true)).collect();
        Self { unlocked }
    }
}

impl ModeUnlocks {
    pub fn is_unlocked(&self, mode: GameMode) -> bool {
        self.unlocked.get(&mode).copied().unwrap_or(false)
    }

    pub fn unlock(&mut self, mode: GameMode) -> bool {
        !std::mem::replace(self.unlocked.entry(mode).or_insert(false), true)
    }
}
