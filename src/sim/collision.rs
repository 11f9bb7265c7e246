//! Collision detection and catch resolution
//!
//! Everything is an axis-aligned box around a center point. Catch resolution
//! owns the score, combo, damage and objective side effects of a catch.

use glam::Vec2;

use super::objectives::{DailyObjectives, ObjectiveKind, grant_rewards};
use super::score::ScoreState;
use super::state::{
    GameEvent, GameOverReason, GamePhase, GameState, ParticleKind, PowerUpKind, Sound,
};

/// Center-based AABB overlap test
pub fn aabb_overlap(pos_a: Vec2, size_a: Vec2, pos_b: Vec2, size_b: Vec2) -> bool {
    (pos_a.x - pos_b.x).abs() * 2.0 < size_a.x + size_b.x
        && (pos_a.y - pos_b.y).abs() * 2.0 < size_a.y + size_b.y
}

/// Resolve all player/entity overlaps for this tick
pub fn resolve_catches(state: &mut GameState, objectives: &mut DailyObjectives) {
    let player_pos = state.player.pos;
    let player_size = state.player.size;

    let items = std::mem::take(&mut state.items);
    for item in items {
        // Once the round ends mid-resolution, leave the rest untouched
        if state.phase != GamePhase::GameOver
            && aabb_overlap(player_pos, player_size, item.pos, item.size)
        {
            if item.is_good {
                catch_good_item(state, objectives, item.pos);
            } else {
                catch_bad_item(state, item.pos);
            }
        } else {
            state.items.push(item);
        }
    }

    let powerups = std::mem::take(&mut state.powerups);
    for powerup in powerups {
        if state.phase != GamePhase::GameOver
            && aabb_overlap(player_pos, player_size, powerup.pos, powerup.size)
        {
            catch_powerup(state, objectives, powerup.kind, powerup.pos);
        } else {
            state.powerups.push(powerup);
        }
    }
}

fn catch_good_item(state: &mut GameState, objectives: &mut DailyObjectives, pos: Vec2) {
    let points = ScoreState::catch_points(
        true,
        state.level,
        state.score.combo,
        state.mode.modifiers.score_mult,
    );
    state.score.add_combo(state.now_ms);

    let has_multiplier = state.player.effects.has(PowerUpKind::Multiplier);
    state
        .score
        .add_score(points, has_multiplier, &mut state.roster, &mut state.events);

    state.score.items_collected += 1;
    state.score.perfect_streak += 1;
    state.mode.items_caught += 1;

    let mut done = 0;
    done += objectives.add(ObjectiveKind::ItemsCaught, 1, &mut state.events);
    done += objectives.observe(ObjectiveKind::ComboReached, state.score.combo, &mut state.events);
    done += objectives.observe(
        ObjectiveKind::ScoreReached,
        score_as_u32(state.score.score),
        &mut state.events,
    );
    grant_rewards(state, done);

    state.push_event(GameEvent::Sound(Sound::Catch));
    state.push_event(GameEvent::Particles {
        kind: ParticleKind::Sparkle,
        pos,
    });
}

fn catch_bad_item(state: &mut GameState, pos: Vec2) {
    // Penalty uses the pre-hit combo; the chain breaks before scoring so the
    // combo bonus does not soften the deduction
    let points = ScoreState::catch_points(
        false,
        state.level,
        state.score.combo,
        state.mode.modifiers.score_mult,
    );
    state.score.reset_combo();

    let has_multiplier = state.player.effects.has(PowerUpKind::Multiplier);
    state
        .score
        .add_score(points, has_multiplier, &mut state.roster, &mut state.events);

    if state.player.take_damage() {
        state.push_event(GameEvent::Sound(Sound::Fail));
        state.push_event(GameEvent::Particles {
            kind: ParticleKind::Damage,
            pos,
        });
        if state.player.lives == 0 {
            state.end_round(GameOverReason::LivesExhausted);
        }
    } else {
        // Shield soaked the hit; the score penalty still stands
        state.push_event(GameEvent::Particles {
            kind: ParticleKind::Explosion,
            pos,
        });
    }
}

fn catch_powerup(
    state: &mut GameState,
    objectives: &mut DailyObjectives,
    kind: PowerUpKind,
    pos: Vec2,
) {
    log::debug!("power-up collected: {kind:?}");
    state.player.effects.add(kind, state.now_ms);
    state.score.powerup_kinds.insert(kind);

    let done = objectives.add(ObjectiveKind::PowerupsCollected, 1, &mut state.events);
    grant_rewards(state, done);

    state.push_event(GameEvent::Sound(Sound::PowerUp));
    state.push_event(GameEvent::Particles {
        kind: ParticleKind::PowerUp,
        pos,
    });
}

fn score_as_u32(score: i64) -> u32 {
    score.clamp(0, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::modes::GameMode;
    use crate::sim::score::CharacterRoster;
    use crate::sim::state::{FallingItem, FallingPowerUp, GamePhase};
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn playing_state() -> GameState {
        GameState::new(42, 10_000, GameMode::Normal, CharacterRoster::default(), 0)
    }

    fn empty_objectives() -> DailyObjectives {
        let mut rng = Pcg32::seed_from_u64(0);
        let date = NaiveDate::parse_from_str("2026-08-31", "%Y-%m-%d").unwrap();
        DailyObjectives::generate(date, &mut rng)
    }

    fn item_at_player(state: &mut GameState, is_good: bool) -> FallingItem {
        FallingItem {
            id: state.next_entity_id(),
            pos: state.player.pos,
            size: glam::Vec2::splat(ITEM_SIZE),
            fall_speed: ITEM_SPEED,
            is_good,
            sprite: 0,
            drift_phase: 0.0,
            drift_amplitude: 0.0,
        }
    }

    #[test]
    fn test_aabb_overlap() {
        let size = Vec2::splat(10.0);
        assert!(aabb_overlap(Vec2::ZERO, size, Vec2::new(9.0, 0.0), size));
        assert!(!aabb_overlap(Vec2::ZERO, size, Vec2::new(10.0, 0.0), size));
        assert!(!aabb_overlap(Vec2::ZERO, size, Vec2::new(0.0, 11.0), size));
    }

    #[test]
    fn test_good_catch_scores_and_extends_combo() {
        let mut state = playing_state();
        let mut objectives = empty_objectives();
        let item = item_at_player(&mut state, true);
        state.items.push(item);

        resolve_catches(&mut state, &mut objectives);

        // Level 1, combo 0 at catch time: 10 * 1.2 = 12, then combo factor
        // 1 + (1-1)*0.2 = 1.0 in the accumulator
        assert_eq!(state.score.score, 12);
        assert_eq!(state.score.combo, 1);
        assert_eq!(state.score.items_collected, 1);
        assert_eq!(state.score.perfect_streak, 1);
        assert_eq!(state.mode.items_caught, 1);
        assert!(state.items.is_empty());
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Sound(Sound::Catch))));
    }

    #[test]
    fn test_bad_catch_breaks_combo_and_damages() {
        let mut state = playing_state();
        let mut objectives = empty_objectives();
        state.score.combo = 4;
        state.score.perfect_streak = 4;
        state.score.score = 100;
        let item = item_at_player(&mut state, false);
        state.items.push(item);

        resolve_catches(&mut state, &mut objectives);

        assert_eq!(state.score.combo, 0);
        assert_eq!(state.score.perfect_streak, 0);
        // Penalty -10 * 1.2 * (1 + 4*0.2) = -21, then combo-0 factor 0.8: -16
        assert_eq!(state.score.score, 100 - 16);
        assert_eq!(state.player.lives, START_LIVES - 1);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Sound(Sound::Fail))));
    }

    #[test]
    fn test_shield_blocks_damage_but_not_penalty() {
        let mut state = playing_state();
        let mut objectives = empty_objectives();
        state.score.score = 100;
        state.player.effects.add(PowerUpKind::Shield, state.now_ms);
        let item = item_at_player(&mut state, false);
        state.items.push(item);

        resolve_catches(&mut state, &mut objectives);

        assert_eq!(state.player.lives, START_LIVES);
        assert!(state.score.score < 100);
        assert!(!state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Sound(Sound::Fail))));
    }

    #[test]
    fn test_last_life_bad_catch_ends_round() {
        let mut state = playing_state();
        let mut objectives = empty_objectives();
        state.player.lives = 1;
        let item = item_at_player(&mut state, false);
        state.items.push(item);

        resolve_catches(&mut state, &mut objectives);

        assert_eq!(state.player.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(matches!(
            state.game_over_reason,
            Some(GameOverReason::LivesExhausted)
        ));
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver(GameOverReason::LivesExhausted))));
    }

    #[test]
    fn test_second_bad_hit_after_round_end_is_ignored() {
        let mut state = playing_state();
        let mut objectives = empty_objectives();
        state.player.lives = 1;
        let a = item_at_player(&mut state, false);
        let b = item_at_player(&mut state, false);
        state.items.push(a);
        state.items.push(b);

        resolve_catches(&mut state, &mut objectives);

        assert_eq!(state.player.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        // The second item was never resolved
        assert_eq!(state.items.len(), 1);
        let game_overs = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver(_)))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_powerup_not_applied_on_death_tick() {
        let mut state = playing_state();
        let mut objectives = empty_objectives();
        state.player.lives = 1;
        state.score.score = 100;
        let item = item_at_player(&mut state, false);
        state.items.push(item);
        let powerup = FallingPowerUp {
            id: state.next_entity_id(),
            pos: state.player.pos,
            size: glam::Vec2::splat(POWERUP_SIZE),
            fall_speed: ITEM_SPEED * POWERUP_SPEED_FACTOR,
            kind: PowerUpKind::Shield,
            drift_phase: 0.0,
            drift_amplitude: 0.0,
        };
        state.powerups.push(powerup);

        resolve_catches(&mut state, &mut objectives);

        assert_eq!(state.phase, GamePhase::GameOver);
        // The overlapping power-up is left unresolved, so no effect and no
        // post-mortem objective credit or score bonus
        assert_eq!(state.powerups.len(), 1);
        assert!(!state.player.effects.has(PowerUpKind::Shield));
        assert!(state.score.powerup_kinds.is_empty());
    }

    #[test]
    fn test_powerup_catch_applies_effect() {
        let mut state = playing_state();
        let mut objectives = empty_objectives();
        let powerup = FallingPowerUp {
            id: state.next_entity_id(),
            pos: state.player.pos,
            size: glam::Vec2::splat(POWERUP_SIZE),
            fall_speed: ITEM_SPEED * POWERUP_SPEED_FACTOR,
            kind: PowerUpKind::Multiplier,
            drift_phase: 0.0,
            drift_amplitude: 0.0,
        };
        state.powerups.push(powerup);

        resolve_catches(&mut state, &mut objectives);

        assert!(state.powerups.is_empty());
        assert!(state.player.effects.has(PowerUpKind::Multiplier));
        assert!(state.score.powerup_kinds.contains(&PowerUpKind::Multiplier));
    }

    #[test]
    fn test_multiplier_doubles_catch_points() {
        let mut state = playing_state();
        let mut objectives = empty_objectives();
        state.player.effects.add(PowerUpKind::Multiplier, state.now_ms);
        let item = item_at_player(&mut state, true);
        state.items.push(item);

        resolve_catches(&mut state, &mut objectives);

        assert_eq!(state.score.score, 24);
    }

    #[test]
    fn test_distant_entities_survive() {
        let mut state = playing_state();
        let mut objectives = empty_objectives();
        let mut item = item_at_player(&mut state, true);
        item.pos.y = 50.0;
        state.items.push(item);

        resolve_catches(&mut state, &mut objectives);

        assert_eq!(state.items.len(), 1);
        assert_eq!(state.score.score, 0);
    }
}
