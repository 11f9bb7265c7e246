//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - Fixed timestep only, one tick per frame
//! - All timing derived from the monotonic millisecond clock sampled at tick start
//! - Seeded RNG only
//! - No rendering, audio or file-system dependencies; side effects surface as
//!   [`GameEvent`]s drained by the caller

pub mod collision;
pub mod modes;
pub mod objectives;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::aabb_overlap;
pub use modes::{GameMode, ModeSpec, ModeState, ModeUnlocks, Modifiers};
pub use objectives::{DailyObjectives, Objective, ObjectiveKind};
pub use score::{CharacterRoster, ScoreState};
pub use state::{
    ActiveEffect, ActiveEffects, Character, FallingItem, FallingPowerUp, GameEvent, GameOverReason,
    GamePhase, GameState, ParticleKind, Player, PowerUpKind, Sound,
};
pub use tick::{TickInput, tick};
