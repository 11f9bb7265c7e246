//! Candy Catch - simulation core for a falling-item catch arcade game
//!
//! Core modules:
//! - `sim`: Deterministic fixed-tick simulation (entities, scoring, spawning,
//!   collisions, game modes, daily objectives)
//! - `highscores`: Persisted top-5 score list
//! - `achievements`: Achievement catalog and unlock tracking
//! - `persistence`: Best-effort JSON record store
//! - `session`: Round lifecycle and meta-record wiring around the simulation
//!
//! Rendering, audio output and menus live outside this crate; they poll
//! [`session::HudSnapshot`] once per frame and drain [`sim::GameEvent`]s.

pub mod achievements;
pub mod highscores;
pub mod persistence;
pub mod session;
pub mod sim;

pub use achievements::{AchievementId, Achievements};
pub use highscores::HighScores;
pub use persistence::SaveStore;
pub use session::Session;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions (logical pixels)
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;
    /// Nominal simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;

    /// Lives at round start
    pub const START_LIVES: u32 = 5;

    /// Spawn timing: delay starts here and shrinks per level
    pub const START_SPAWN_MS: u64 = 1000;
    pub const MIN_SPAWN_MS: u64 = 300;
    pub const SPAWN_DECREASE_PER_LEVEL_MS: u64 = 40;
    /// Probability that a spawned item is good
    pub const GOOD_ITEM_CHANCE: f64 = 0.7;

    /// Player horizontal speed (px per tick)
    pub const PLAYER_SPEED: f32 = 8.0;
    /// Player catch box
    pub const PLAYER_WIDTH: f32 = 120.0;
    pub const PLAYER_HEIGHT: f32 = 120.0;

    /// Base item fall speed (px per tick), before level scaling
    pub const ITEM_SPEED: f32 = 5.0;
    pub const ITEM_SIZE: f32 = 60.0;
    /// Power-ups fall at this fraction of item speed
    pub const POWERUP_SPEED_FACTOR: f32 = 0.8;
    pub const POWERUP_SIZE: f32 = 40.0;

    /// Level curve
    pub const POINTS_PER_LEVEL: i64 = 100;
    pub const MAX_LEVEL: u32 = 10;
    /// Fall-speed gain per level
    pub const LEVEL_SPEED_INCREASE: f32 = 0.2;
    /// Point multiplier applied per level in the catch formula
    pub const LEVEL_SCORE_MULTIPLIER: f64 = 1.2;

    /// Power-ups
    pub const POWERUP_CHANCE: f64 = 0.15;
    pub const POWERUP_DURATION_MS: u64 = 8000;
    pub const SHIELD_DURATION_MS: u64 = 10_000;
    pub const POWERUP_MIN_INTERVAL_MS: u64 = 5000;
    pub const MULTIPLIER_VALUE: f64 = 2.0;
    /// Magnet pull: good items within range drift toward the player
    pub const MAGNET_RANGE: f32 = 200.0;
    pub const MAGNET_FORCE: f32 = 8.0;

    /// Combos
    pub const COMBO_TIME_MS: u64 = 2000;
    pub const COMBO_MULTIPLIER: f64 = 0.2;
    pub const MAX_COMBO: u32 = 10;

    /// Base points per catch (negated for bad items)
    pub const CATCH_BASE_POINTS: f64 = 10.0;

    /// Score needed to unlock the alternate character
    pub const CHARACTER_UNLOCK_SCORE: i64 = 150_000;

    /// Daily objectives
    pub const DAILY_OBJECTIVE_COUNT: usize = 3;
    pub const DAILY_OBJECTIVE_REWARD: i64 = 500;

    /// Highscore list length
    pub const MAX_HIGHSCORES: usize = 5;

    /// Achievement requirements
    pub const ACH_COMBO_MASTER_REQ: u32 = 10;
    pub const ACH_SURVIVOR_REQ_MS: u64 = 120_000;
    pub const ACH_COLLECTOR_REQ: u32 = 50;
    pub const ACH_POWERUP_LOVER_REQ: u32 = 3;
    pub const ACH_PERFECT_REQ: u32 = 20;
}
