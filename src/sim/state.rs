//! Game state and core simulation types
//!
//! Everything a round needs to pause/resume deterministically lives in
//! [`GameState`]; per-tick side effects surface as [`GameEvent`]s.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::modes::{GameMode, ModeState};
use super::score::{CharacterRoster, ScoreState};
use super::spawn::SpawnState;
use crate::consts::*;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Round frozen, state preserved for resume
    Paused,
    /// Round ended
    GameOver,
}

/// Why the round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    LivesExhausted,
    /// Accuracy-gated mode fell below its required catch ratio
    AccuracyFailed,
}

/// Selectable player characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Character {
    Kuromi,
    /// Unlocked at [`CHARACTER_UNLOCK_SCORE`] points
    MyMelody,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// Pulls nearby good items toward the player
    Magnet,
    /// Blocks damage while active
    Shield,
    /// Doubles points from catches
    Multiplier,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Magnet,
        PowerUpKind::Shield,
        PowerUpKind::Multiplier,
    ];

    /// Effect duration once applied; shield lasts longer than the others
    pub fn duration_ms(self) -> u64 {
        match self {
            PowerUpKind::Shield => SHIELD_DURATION_MS,
            PowerUpKind::Magnet | PowerUpKind::Multiplier => POWERUP_DURATION_MS,
        }
    }
}

/// A timed effect applied to the player
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub started_ms: u64,
    pub duration_ms: u64,
}

impl ActiveEffect {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) >= self.duration_ms
    }

    /// Remaining fraction of the effect, decaying monotonically from 1 to 0.
    /// Consumed by the HUD for effect timers.
    pub fn progress(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.started_ms) as f32;
        (1.0 - elapsed / self.duration_ms as f32).max(0.0)
    }
}

/// The set of effects currently applied to the player.
///
/// Invariant: at most one effect per kind. Re-applying a kind replaces the
/// existing effect and restarts its timer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    effects: Vec<ActiveEffect>,
}

impl ActiveEffects {
    pub fn add(&mut self, kind: PowerUpKind, now_ms: u64) {
        self.effects.retain(|e| e.kind != kind);
        self.effects.push(ActiveEffect {
            kind,
            started_ms: now_ms,
            duration_ms: kind.duration_ms(),
        });
    }

    pub fn has(&self, kind: PowerUpKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn progress(&self, kind: PowerUpKind, now_ms: u64) -> Option<f32> {
        self.effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.progress(now_ms))
    }

    /// Drop effects past their duration, returning the kinds that expired.
    pub fn expire(&mut self, now_ms: u64) -> Vec<PowerUpKind> {
        let expired: Vec<PowerUpKind> = self
            .effects
            .iter()
            .filter(|e| e.is_expired(now_ms))
            .map(|e| e.kind)
            .collect();
        self.effects.retain(|e| !e.is_expired(now_ms));
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    /// Push effect start times forward (pause compensation)
    pub fn shift(&mut self, delta_ms: u64) {
        for effect in &mut self.effects {
            effect.started_ms += delta_ms;
        }
    }
}

/// The player's catch sprite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Center position
    pub pos: Vec2,
    pub size: Vec2,
    pub lives: u32,
    pub effects: ActiveEffects,
    pub character: Character,
}

impl Player {
    pub fn new(character: Character) -> Self {
        Self {
            pos: Vec2::new(
                PLAYFIELD_WIDTH / 2.0,
                PLAYFIELD_HEIGHT - 10.0 - PLAYER_HEIGHT / 2.0,
            ),
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            lives: START_LIVES,
            effects: ActiveEffects::default(),
            character,
        }
    }

    /// Shield presence doubles as the invulnerability flag
    pub fn is_invulnerable(&self) -> bool {
        self.effects.has(PowerUpKind::Shield)
    }

    /// Move horizontally by `dir` (-1, 0, +1), clamped to the playfield
    pub fn steer(&mut self, dir: f32) {
        self.pos.x += dir * PLAYER_SPEED;
        let half = self.size.x / 2.0;
        self.pos.x = self.pos.x.clamp(half, PLAYFIELD_WIDTH - half);
    }

    /// Apply one unit of damage. Returns false when the shield absorbed it.
    pub fn take_damage(&mut self) -> bool {
        if self.is_invulnerable() {
            return false;
        }
        debug_assert!(self.lives > 0, "damage applied after round end");
        self.lives = self.lives.saturating_sub(1);
        true
    }
}

/// A falling item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    pub size: Vec2,
    /// Fall speed in px per tick, fixed at spawn
    pub fall_speed: f32,
    pub is_good: bool,
    /// Opaque index into the presentation layer's image catalog
    pub sprite: u32,
    /// Lateral sine drift
    pub drift_phase: f32,
    pub drift_amplitude: f32,
}

impl FallingItem {
    /// Advance one tick of kinematics
    pub fn advance(&mut self, speed_mult: f32) {
        self.pos.y += self.fall_speed * speed_mult;
        self.pos.x += self.drift_phase.sin() * self.drift_amplitude;
        self.drift_phase += 0.05;
    }

    pub fn off_bottom(&self) -> bool {
        self.pos.y - self.size.y / 2.0 > PLAYFIELD_HEIGHT
    }
}

/// A falling power-up entity (pre-activation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingPowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub fall_speed: f32,
    pub kind: PowerUpKind,
    pub drift_phase: f32,
    pub drift_amplitude: f32,
}

impl FallingPowerUp {
    pub fn advance(&mut self, speed_mult: f32) {
        self.pos.y += self.fall_speed * speed_mult;
        self.pos.x += self.drift_phase.sin() * self.drift_amplitude;
        self.drift_phase += 0.05;
    }

    pub fn off_bottom(&self) -> bool {
        self.pos.y - self.size.y / 2.0 > PLAYFIELD_HEIGHT
    }
}

/// Sound cues the core fires at the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Catch,
    Fail,
    PowerUp,
    LevelUp,
}

/// Particle burst kinds (cosmetic; the core only names them)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Sparkle,
    Explosion,
    PowerUp,
    LevelUp,
    Damage,
}

/// Fire-and-forget notifications drained by the caller after each tick
#[derive(Debug, Clone)]
pub enum GameEvent {
    Sound(Sound),
    Particles { kind: ParticleKind, pos: Vec2 },
    LevelUp(u32),
    CharacterUnlocked(Character),
    ModeCompleted(GameMode),
    ObjectiveCompleted(super::objectives::ObjectiveKind),
    AllObjectivesCompleted,
    GameOver(GameOverReason),
}

/// Complete round state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Round seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub game_over_reason: Option<GameOverReason>,
    /// Clock sample from the start of the current tick
    pub now_ms: u64,
    pub round_start_ms: u64,
    /// Current level, 1..=MAX_LEVEL
    pub level: u32,
    pub player: Player,
    pub items: Vec<FallingItem>,
    pub powerups: Vec<FallingPowerUp>,
    pub score: ScoreState,
    pub roster: CharacterRoster,
    pub mode: ModeState,
    pub spawn: SpawnState,
    /// Drained by the caller after each tick; not part of saved state
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    next_id: u32,
}

impl GameState {
    pub fn new(
        seed: u64,
        now_ms: u64,
        mode: GameMode,
        roster: CharacterRoster,
        highest_score: i64,
    ) -> Self {
        Self {
            seed,
            phase: GamePhase::Playing,
            game_over_reason: None,
            now_ms,
            round_start_ms: now_ms,
            level: 1,
            player: Player::new(roster.selected),
            items: Vec::new(),
            powerups: Vec::new(),
            score: ScoreState::new(highest_score),
            roster,
            mode: ModeState::start(mode, now_ms),
            spawn: SpawnState::new(now_ms),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Milliseconds since round start
    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.round_start_ms)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Shift every absolute timestamp forward by a pause's length, so no
    /// timer elapses while the round is frozen
    pub fn shift_timers(&mut self, delta_ms: u64) {
        self.round_start_ms += delta_ms;
        self.score.last_catch_ms += delta_ms;
        self.spawn.last_item_ms += delta_ms;
        self.spawn.last_powerup_ms += delta_ms;
        self.mode.started_ms += delta_ms;
        self.player.effects.shift(delta_ms);
    }

    /// End the round; idempotent
    pub fn end_round(&mut self, reason: GameOverReason) {
        if self.phase != GamePhase::GameOver {
            self.phase = GamePhase::GameOver;
            self.game_over_reason = Some(reason);
            self.events.push(GameEvent::GameOver(reason));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_effect_replaces_same_kind() {
        let mut effects = ActiveEffects::default();
        effects.add(PowerUpKind::Magnet, 1000);
        effects.add(PowerUpKind::Magnet, 4000);

        let active: Vec<_> = effects.iter().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].started_ms, 4000);
        // Timer restarted: still alive past the original expiry
        assert!(effects.progress(PowerUpKind::Magnet, 1000 + POWERUP_DURATION_MS) > Some(0.0));
    }

    #[test]
    fn test_effect_expiry_clears_invulnerability() {
        let mut player = Player::new(Character::Kuromi);
        player.effects.add(PowerUpKind::Shield, 0);
        assert!(player.is_invulnerable());

        let expired = player.effects.expire(SHIELD_DURATION_MS);
        assert_eq!(expired, vec![PowerUpKind::Shield]);
        assert!(!player.is_invulnerable());
    }

    #[test]
    fn test_shield_outlasts_standard_duration() {
        let mut effects = ActiveEffects::default();
        effects.add(PowerUpKind::Shield, 0);
        effects.add(PowerUpKind::Multiplier, 0);

        let expired = effects.expire(POWERUP_DURATION_MS);
        assert_eq!(expired, vec![PowerUpKind::Multiplier]);
        assert!(effects.has(PowerUpKind::Shield));
    }

    #[test]
    fn test_damage_respects_shield() {
        let mut player = Player::new(Character::Kuromi);
        player.effects.add(PowerUpKind::Shield, 0);
        assert!(!player.take_damage());
        assert_eq!(player.lives, START_LIVES);

        player.effects.expire(SHIELD_DURATION_MS);
        assert!(player.take_damage());
        assert_eq!(player.lives, START_LIVES - 1);
    }

    #[test]
    fn test_steer_clamps_to_playfield() {
        let mut player = Player::new(Character::Kuromi);
        for _ in 0..200 {
            player.steer(1.0);
        }
        assert_eq!(player.pos.x, PLAYFIELD_WIDTH - PLAYER_WIDTH / 2.0);
        for _ in 0..200 {
            player.steer(-1.0);
        }
        assert_eq!(player.pos.x, PLAYER_WIDTH / 2.0);
    }

    proptest! {
        /// Effect progress decays monotonically and bottoms out at zero.
        #[test]
        fn effect_progress_monotonic(start in 0u64..100_000, samples in proptest::collection::vec(0u64..20_000, 1..20)) {
            let effect = ActiveEffect {
                kind: PowerUpKind::Magnet,
                started_ms: start,
                duration_ms: POWERUP_DURATION_MS,
            };
            let mut offsets = samples;
            offsets.sort_unstable();
            let mut last = 1.0f32;
            for off in offsets {
                let p = effect.progress(start + off);
                prop_assert!(p >= 0.0 && p <= last);
                last = p;
            }
            prop_assert_eq!(effect.progress(start + POWERUP_DURATION_MS), 0.0);
        }
    }
}
