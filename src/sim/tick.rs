//! The fixed-timestep tick
//!
//! One call per frame. Step order is fixed: pause handling, steering, spawns,
//! kinematics (including magnet pull, misses and effect expiry), mode rules,
//! catch resolution, level progression, objective flush.

use super::collision::resolve_catches;
use super::objectives::{DailyObjectives, ObjectiveKind, grant_rewards};
use super::spawn::run_spawns;
use super::state::{
    GameEvent, GameOverReason, GamePhase, GameState, ParticleKind, PowerUpKind, Sound,
};
use crate::consts::*;

/// Per-tick player input
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Horizontal steering, -1.0..=1.0
    pub dir: f32,
    /// Toggle pause this tick
    pub toggle_pause: bool,
}

/// Advance the simulation to `now_ms`.
///
/// Game-over states are inert. While paused, `now_ms` is not consumed; on
/// resume every timer is shifted by the pause length so nothing expires or
/// spawns across the gap.
pub fn tick(
    state: &mut GameState,
    objectives: &mut DailyObjectives,
    input: &TickInput,
    now_ms: u64,
) {
    debug_assert!(now_ms >= state.now_ms, "tick clock moved backward");

    match state.phase {
        GamePhase::GameOver => return,
        GamePhase::Paused => {
            if input.toggle_pause {
                let delta = now_ms.saturating_sub(state.now_ms);
                state.shift_timers(delta);
                state.now_ms = now_ms;
                state.phase = GamePhase::Playing;
                log::debug!("resumed after {delta}ms pause");
            }
            return;
        }
        GamePhase::Playing => {
            if input.toggle_pause {
                state.phase = GamePhase::Paused;
                return;
            }
        }
    }
    state.now_ms = now_ms;

    if input.dir != 0.0 {
        state.player.steer(input.dir.clamp(-1.0, 1.0));
    }

    run_spawns(state);
    advance_entities(state);
    update_mode(state);
    if state.phase == GamePhase::GameOver {
        return;
    }
    resolve_catches(state, objectives);
    if state.phase == GamePhase::Playing {
        check_level_up(state);
    }
    flush_objectives(state, objectives);
}

/// Kinematics: fall, drift, magnet pull, off-bottom handling, effect expiry
fn advance_entities(state: &mut GameState) {
    let speed_mult = state.mode.modifiers.speed_mult;
    let magnet = state.player.effects.has(PowerUpKind::Magnet);
    let player_pos = state.player.pos;

    let items = std::mem::take(&mut state.items);
    for mut item in items {
        item.advance(speed_mult);
        if magnet && item.is_good {
            let delta = player_pos - item.pos;
            if delta.length() < MAGNET_RANGE {
                // Horizontal pull only; gravity still decides when it arrives
                item.pos.x += delta.x.clamp(-MAGNET_FORCE, MAGNET_FORCE);
            }
        }
        if item.off_bottom() {
            if item.is_good {
                miss_good_item(state, item.pos.x);
            }
        } else {
            state.items.push(item);
        }
    }

    let powerups = std::mem::take(&mut state.powerups);
    for mut powerup in powerups {
        powerup.advance(speed_mult);
        // Missed power-ups fall away without penalty
        if !powerup.off_bottom() {
            state.powerups.push(powerup);
        }
    }

    for kind in state.player.effects.expire(state.now_ms) {
        log::debug!("effect expired: {kind:?}");
    }
}

/// A good item reached the floor: one damage (shield-aware) and the perfect
/// streak breaks. The combo chain is left to decay on its own clock.
fn miss_good_item(state: &mut GameState, x: f32) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.score.perfect_streak = 0;
    if state.player.take_damage() {
        state.push_event(GameEvent::Sound(Sound::Fail));
        state.push_event(GameEvent::Particles {
            kind: ParticleKind::Damage,
            pos: glam::Vec2::new(x, PLAYFIELD_HEIGHT),
        });
        if state.player.lives == 0 {
            state.end_round(GameOverReason::LivesExhausted);
        }
    }
}

/// Mode rules: time-boxed completion and the accuracy floor
fn update_mode(state: &mut GameState) {
    let spec = state.mode.mode.spec();

    if let Some(duration_ms) = spec.duration_ms
        && !state.mode.completed
        && state.now_ms.saturating_sub(state.mode.started_ms) >= duration_ms
    {
        state.mode.completed = true;
        let mode = state.mode.mode;
        log::info!("mode {mode:?} completed");
        state.push_event(GameEvent::ModeCompleted(mode));
    }

    // accuracy() is None until the first good spawn, so a fresh round is safe
    if let Some(required) = spec.modifiers.required_accuracy
        && let Some(accuracy) = state.mode.accuracy()
        && accuracy < required
    {
        log::info!("accuracy {accuracy:.2} below required {required:.2}");
        state.end_round(GameOverReason::AccuracyFailed);
    }
}

/// At most one level step per tick
fn check_level_up(state: &mut GameState) {
    if state.level >= MAX_LEVEL || state.score.score < state.level as i64 * POINTS_PER_LEVEL {
        return;
    }
    state.level += 1;
    log::info!("level up to {}", state.level);
    state.push_event(GameEvent::LevelUp(state.level));
    state.push_event(GameEvent::Sound(Sound::LevelUp));
    let pos = state.player.pos;
    state.push_event(GameEvent::Particles {
        kind: ParticleKind::LevelUp,
        pos,
    });
}

/// End-of-tick progress sync for the observed-best objective kinds
fn flush_objectives(state: &mut GameState, objectives: &mut DailyObjectives) {
    let score = state.score.score.clamp(0, u32::MAX as i64) as u32;
    let mut done = 0;
    done += objectives.observe(ObjectiveKind::ComboReached, state.score.combo, &mut state.events);
    done += objectives.observe(ObjectiveKind::ScoreReached, score, &mut state.events);
    done += objectives.observe(ObjectiveKind::LevelReached, state.level, &mut state.events);
    grant_rewards(state, done);
}
