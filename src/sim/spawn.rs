//! Entity spawner
//!
//! Items spawn on a level-scaled timer; power-ups piggyback on item spawn
//! attempts behind a probability gate and a minimum interval.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::state::{FallingItem, FallingPowerUp, GameState, PowerUpKind};
use crate::consts::*;

/// Sprite catalog sizes, mirrored by the presentation layer
const GOOD_SPRITE_COUNT: u32 = 6;
const BAD_SPRITE_COUNT: u32 = 4;

/// Spawn timers carried across ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnState {
    pub last_item_ms: u64,
    pub last_powerup_ms: u64,
}

impl SpawnState {
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_item_ms: now_ms,
            last_powerup_ms: now_ms,
        }
    }
}

/// Item spawn delay for a level, before mode scaling
pub fn spawn_delay_ms(level: u32) -> u64 {
    START_SPAWN_MS
        .saturating_sub(level as u64 * SPAWN_DECREASE_PER_LEVEL_MS)
        .max(MIN_SPAWN_MS)
}

/// Run one tick of the spawner.
///
/// Each elapsed spawn delay yields one item attempt, gated by the mode's
/// spawn chance. A failed gate still consumes the slot, so sparse modes
/// keep their cadence. Power-up rolls ride the same attempts.
pub fn run_spawns(state: &mut GameState) {
    let modifiers = state.mode.modifiers;
    let delay = (spawn_delay_ms(state.level) as f64 / modifiers.spawn_rate) as u64;

    if state.now_ms.saturating_sub(state.spawn.last_item_ms) < delay {
        return;
    }
    state.spawn.last_item_ms = state.now_ms;

    if state.rng.random_bool(modifiers.spawn_chance) {
        let item = make_item(state);
        // Accuracy tracks good items only; bad items are meant to be dodged
        if item.is_good {
            state.mode.items_spawned += 1;
        }
        state.items.push(item);
    }

    let powerup_ready =
        state.now_ms.saturating_sub(state.spawn.last_powerup_ms) >= POWERUP_MIN_INTERVAL_MS;
    if powerup_ready && state.rng.random_bool(POWERUP_CHANCE) {
        let powerup = make_powerup(state);
        log::debug!("spawned power-up {:?} at x={:.0}", powerup.kind, powerup.pos.x);
        state.powerups.push(powerup);
        state.spawn.last_powerup_ms = state.now_ms;
    }
}

fn make_item(state: &mut GameState) -> FallingItem {
    let is_good =
        state.mode.modifiers.good_items_only || state.rng.random_bool(GOOD_ITEM_CHANCE);
    let sprite = if is_good {
        state.rng.random_range(0..GOOD_SPRITE_COUNT)
    } else {
        state.rng.random_range(0..BAD_SPRITE_COUNT)
    };
    // Per-item speed jitter keeps columns of same-speed items from forming
    let jitter = 1.0 + state.rng.random::<f32>() * 0.4;
    let fall_speed = ITEM_SPEED + state.level as f32 * LEVEL_SPEED_INCREASE * jitter;

    FallingItem {
        id: state.next_entity_id(),
        pos: spawn_pos(state, ITEM_SIZE),
        size: Vec2::splat(ITEM_SIZE),
        fall_speed,
        is_good,
        sprite,
        drift_phase: state.rng.random_range(0.0..TAU),
        drift_amplitude: state.rng.random_range(0.2..0.8),
    }
}

fn make_powerup(state: &mut GameState) -> FallingPowerUp {
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];

    FallingPowerUp {
        id: state.next_entity_id(),
        pos: spawn_pos(state, POWERUP_SIZE),
        size: Vec2::splat(POWERUP_SIZE),
        fall_speed: ITEM_SPEED * POWERUP_SPEED_FACTOR,
        kind,
        drift_phase: state.rng.random_range(0.0..TAU),
        drift_amplitude: state.rng.random_range(0.2..0.8),
    }
}

/// Random horizontal position just above the top edge, fully inside the field
fn spawn_pos(state: &mut GameState, size: f32) -> Vec2 {
    let half = size / 2.0;
    Vec2::new(
        state.rng.random_range(half..PLAYFIELD_WIDTH - half),
        -half,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::modes::GameMode;
    use crate::sim::score::CharacterRoster;

    fn playing_state(mode: GameMode) -> GameState {
        GameState::new(42, 0, mode, CharacterRoster::default(), 0)
    }

    #[test]
    fn test_spawn_delay_shrinks_and_floors() {
        assert_eq!(spawn_delay_ms(1), 960);
        assert_eq!(spawn_delay_ms(5), 800);
        assert!(spawn_delay_ms(1) > spawn_delay_ms(9));
        // Level 20 is off the curve but must still respect the floor
        assert_eq!(spawn_delay_ms(20), MIN_SPAWN_MS);
    }

    #[test]
    fn test_no_spawn_before_delay_elapses() {
        let mut state = playing_state(GameMode::Normal);
        state.now_ms = spawn_delay_ms(1) - 1;
        run_spawns(&mut state);
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_spawn_after_delay_and_counter_increments() {
        // CandyRain spawns good items only, so the accuracy counter must track
        let mut state = playing_state(GameMode::CandyRain);
        state.now_ms = spawn_delay_ms(1);
        run_spawns(&mut state);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.mode.items_spawned, 1);

        // Timer consumed: the very next tick spawns nothing
        state.now_ms += 16;
        run_spawns(&mut state);
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_spawned_items_inside_playfield() {
        let mut state = playing_state(GameMode::Normal);
        for _ in 0..50 {
            state.now_ms += spawn_delay_ms(1);
            run_spawns(&mut state);
        }
        assert!(!state.items.is_empty());
        for item in &state.items {
            let half = item.size.x / 2.0;
            assert!(item.pos.x >= half && item.pos.x <= PLAYFIELD_WIDTH - half);
            assert!(item.pos.y < 0.0);
        }
    }

    #[test]
    fn test_good_items_only_mode_spawns_no_bad_items() {
        let mut state = playing_state(GameMode::CandyRain);
        for _ in 0..200 {
            state.now_ms += spawn_delay_ms(state.level);
            run_spawns(&mut state);
        }
        assert!(!state.items.is_empty());
        assert!(state.items.iter().all(|i| i.is_good));
    }

    #[test]
    fn test_powerup_respects_min_interval() {
        let mut state = playing_state(GameMode::Normal);
        // Drive many spawn attempts inside the first interval window
        while state.now_ms + spawn_delay_ms(1) < POWERUP_MIN_INTERVAL_MS {
            state.now_ms += spawn_delay_ms(1);
            run_spawns(&mut state);
        }
        assert!(state.powerups.is_empty());
    }

    #[test]
    fn test_powerups_eventually_spawn() {
        let mut state = playing_state(GameMode::Normal);
        for _ in 0..500 {
            state.now_ms += spawn_delay_ms(1);
            run_spawns(&mut state);
        }
        assert!(!state.powerups.is_empty());
    }
}
