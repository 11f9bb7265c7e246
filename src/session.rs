//! Round lifecycle and meta-record wiring
//!
//! A [`Session`] owns everything that outlives a round: highscores,
//! achievements, mode unlocks, the character roster and today's objectives.
//! It drives the simulation tick, routes drained events into the meta
//! records, and persists them when a round ends.

use chrono::{Datelike, NaiveDate};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::achievements::{AchievementId, Achievements};
use crate::highscores::HighScores;
use crate::persistence::SaveStore;
use crate::sim::{
    CharacterRoster, DailyObjectives, GameEvent, GameMode, GamePhase, GameState, ModeUnlocks,
    ObjectiveKind, PowerUpKind, TickInput, tick,
};

/// Everything a frame of UI needs, sampled once per tick
#[derive(Debug, Clone)]
pub struct HudSnapshot {
    pub score: i64,
    pub best: i64,
    pub combo: u32,
    pub lives: u32,
    pub level: u32,
    pub elapsed_ms: u64,
    pub mode: GameMode,
    pub phase: GamePhase,
    /// Good-item catch ratio, shown in accuracy-gated modes
    pub accuracy: Option<f32>,
    /// Active effects with their remaining fraction
    pub effects: Vec<(PowerUpKind, f32)>,
    /// Today's objectives with their progress
    pub objectives: Vec<ObjectiveStatus>,
}

#[derive(Debug, Clone)]
pub struct ObjectiveStatus {
    pub kind: ObjectiveKind,
    pub progress: u32,
    pub target: u32,
    pub completed: bool,
    /// The objective whose progress moved last; the HUD highlights it
    pub active: bool,
}

/// What one driven tick produced
#[derive(Debug, Default)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    pub achievements_unlocked: Vec<AchievementId>,
    /// 0-based table rank when the round just ended on a new highscore
    pub highscore_rank: Option<usize>,
}

pub struct Session {
    store: SaveStore,
    pub highscores: HighScores,
    pub achievements: Achievements,
    pub mode_unlocks: ModeUnlocks,
    pub roster: CharacterRoster,
    pub objectives: DailyObjectives,
    pub state: Option<GameState>,
}

impl Session {
    /// Load all persisted records and roll objectives for `today` if needed.
    ///
    /// A session kept open across midnight should call
    /// [`Self::check_daily_reset`] with the new date (between rounds is
    /// enough); nothing here watches the clock.
    pub fn open(store: SaveStore, today: NaiveDate) -> Self {
        let objectives = match store.load_objectives() {
            Some(mut loaded) => {
                loaded.roll_over(today, &mut objective_rng(today));
                loaded
            }
            None => DailyObjectives::generate(today, &mut objective_rng(today)),
        };

        Self {
            highscores: store.load_highscores(),
            achievements: store.load_achievements(),
            mode_unlocks: store.load_mode_unlocks(),
            roster: store.load_roster(),
            objectives,
            state: None,
            store,
        }
    }

    /// Re-roll objectives when the calendar day has changed since they were
    /// rolled. Returns true if a fresh set was generated (and persisted).
    pub fn check_daily_reset(&mut self, today: NaiveDate) -> bool {
        if !self.objectives.roll_over(today, &mut objective_rng(today)) {
            return false;
        }
        if let Err(err) = self.store.save_objectives(&self.objectives) {
            log::warn!("failed to persist objectives: {err}");
        }
        true
    }

    /// Begin a round. Returns false if the mode is still locked.
    pub fn start_round(&mut self, mode: GameMode, seed: u64, now_ms: u64) -> bool {
        if !self.mode_unlocks.is_unlocked(mode) {
            log::warn!("refusing to start locked mode {mode:?}");
            return false;
        }
        log::info!("starting {mode:?} round, seed {seed}");
        self.state = Some(GameState::new(
            seed,
            now_ms,
            mode,
            self.roster.clone(),
            self.highscores.best(),
        ));
        true
    }

    /// Drive one simulation tick and route its fallout
    pub fn tick(&mut self, input: &TickInput, now_ms: u64) -> TickReport {
        let mut report = TickReport::default();
        let Some(state) = self.state.as_mut() else {
            return report;
        };

        tick(state, &mut self.objectives, input, now_ms);
        report.achievements_unlocked = self.achievements.observe(state);
        report.events = std::mem::take(&mut state.events);

        let mut round_over = false;
        let mut objectives_dirty = false;
        for event in &report.events {
            if let Some(id) = self.achievements.on_event(event) {
                report.achievements_unlocked.push(id);
            }
            match event {
                GameEvent::ModeCompleted(mode) => {
                    if let Some(next) = mode.next()
                        && self.mode_unlocks.unlock(next)
                    {
                        log::info!("mode unlocked: {next:?}");
                    }
                }
                GameEvent::ObjectiveCompleted(_) => objectives_dirty = true,
                GameEvent::GameOver(_) => round_over = true,
                _ => {}
            }
        }

        if round_over {
            report.highscore_rank = self.finalize_round();
        } else if objectives_dirty {
            // Completions are too rare to lose to a crash mid-round
            if let Err(err) = self.store.save_objectives(&self.objectives) {
                log::warn!("failed to persist objectives: {err}");
            }
        }
        report
    }

    /// Discard the active round without recording a score (return to menu).
    /// Cross-round objective progress earned so far is still flushed.
    pub fn abandon_round(&mut self) {
        if self.state.take().is_some() {
            log::info!("round abandoned");
            self.persist();
        }
    }

    pub fn hud(&self) -> Option<HudSnapshot> {
        let state = self.state.as_ref()?;
        Some(HudSnapshot {
            score: state.score.score,
            best: state.score.highest_score.max(state.score.score),
            combo: state.score.combo,
            lives: state.player.lives,
            level: state.level,
            elapsed_ms: state.elapsed_ms(),
            mode: state.mode.mode,
            phase: state.phase,
            accuracy: state.mode.accuracy(),
            effects: state
                .player
                .effects
                .iter()
                .map(|e| (e.kind, e.progress(state.now_ms)))
                .collect(),
            objectives: self
                .objectives
                .objectives()
                .iter()
                .map(|o| ObjectiveStatus {
                    kind: o.kind,
                    progress: self.objectives.progress(o.kind),
                    target: o.target,
                    completed: o.completed,
                    active: self.objectives.active() == Some(o.kind),
                })
                .collect(),
        })
    }

    /// Submit the score and flush every record to disk. Returns the table
    /// rank when the score made the list, so the driver can celebrate it.
    fn finalize_round(&mut self) -> Option<usize> {
        let state = self.state.as_ref()?;
        log::info!(
            "round over: score {} level {} in {:?}",
            state.score.score,
            state.level,
            state.mode.mode
        );

        let rank = self.highscores.submit(state.score.score);
        // Character unlocks earned mid-round move into the persistent roster
        self.roster = state.roster.clone();
        self.persist();
        rank
    }

    fn persist(&self) {
        let results = [
            self.store.save_highscores(&self.highscores),
            self.store.save_achievements(&self.achievements),
            self.store.save_objectives(&self.objectives),
            self.store.save_mode_unlocks(&self.mode_unlocks),
            self.store.save_roster(&self.roster),
        ];
        for err in results.into_iter().filter_map(Result::err) {
            log::warn!("failed to persist session record: {err}");
        }
    }
}

/// Objectives roll deterministically per calendar day
fn objective_rng(date: NaiveDate) -> Pcg32 {
    Pcg32::seed_from_u64(date.num_days_from_ce() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::FallingItem;
    use glam::Vec2;
    use std::fs;

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2026-08-31", "%Y-%m-%d").unwrap()
    }

    fn temp_store(tag: &str) -> SaveStore {
        let dir = std::env::temp_dir().join(format!(
            "candy-catch-session-{tag}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        SaveStore::new(dir)
    }

    fn bad_item_at_player(state: &mut GameState) -> FallingItem {
        FallingItem {
            id: state.next_entity_id(),
            pos: state.player.pos,
            size: Vec2::splat(ITEM_SIZE),
            fall_speed: 0.0,
            is_good: false,
            sprite: 0,
            drift_phase: 0.0,
            drift_amplitude: 0.0,
        }
    }

    #[test]
    fn test_open_on_empty_store_generates_objectives() {
        let session = Session::open(temp_store("open"), today());
        assert_eq!(session.objectives.objectives().len(), DAILY_OBJECTIVE_COUNT);
        assert_eq!(session.highscores.entries().len(), 0);
        assert!(session.state.is_none());
    }

    #[test]
    fn test_objective_roll_is_deterministic_per_day() {
        let a = DailyObjectives::generate(today(), &mut objective_rng(today()));
        let b = DailyObjectives::generate(today(), &mut objective_rng(today()));
        for (x, y) in a.objectives().iter().zip(b.objectives()) {
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.target, y.target);
        }
    }

    #[test]
    fn test_daily_reset_rolls_on_date_change() {
        let store = temp_store("reset");
        let dir = store.dir().to_path_buf();
        let yesterday = today().pred_opt().unwrap();
        let mut session = Session::open(store, yesterday);

        let mut events = Vec::new();
        let kind = session.objectives.objectives()[0].kind;
        session.objectives.add(kind, 1, &mut events);

        assert!(!session.check_daily_reset(yesterday));
        assert!(session.check_daily_reset(today()));
        // Fresh set, no progress carried over, and the roll hit disk
        for o in session.objectives.objectives() {
            assert_eq!(session.objectives.progress(o.kind), 0);
            assert!(!o.completed);
        }
        assert!(dir.join("objectives.json").exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_start_round_threads_best_score() {
        let store = temp_store("best");
        let mut session = Session::open(store, today());
        session.highscores.submit(777);

        assert!(session.start_round(GameMode::Normal, 5, 1000));
        let state = session.state.as_ref().unwrap();
        assert_eq!(state.score.highest_score, 777);
        let _ = fs::remove_dir_all(session.store.dir());
    }

    #[test]
    fn test_game_over_persists_and_records_highscore() {
        let store = temp_store("gameover");
        let dir = store.dir().to_path_buf();
        let mut session = Session::open(store, today());
        session.start_round(GameMode::Normal, 5, 1000);

        {
            let state = session.state.as_mut().unwrap();
            state.player.lives = 1;
            state.score.score = 4321;
            let item = bad_item_at_player(state);
            state.items.push(item);
        }
        let report = session.tick(&TickInput::default(), 1016);

        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver(_))));
        assert!(session.highscores.best() > 0);
        // First entry on an empty table ranks at the top
        assert_eq!(report.highscore_rank, Some(0));
        assert!(dir.join("highscores.json").exists());
        assert!(dir.join("objectives.json").exists());

        // A fresh session sees the persisted score
        let reopened = Session::open(SaveStore::new(&dir), today());
        assert_eq!(reopened.highscores.best(), session.highscores.best());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_tick_without_round_is_noop() {
        let mut session = Session::open(temp_store("noop"), today());
        let report = session.tick(&TickInput::default(), 99);
        assert!(report.events.is_empty());
        assert!(report.achievements_unlocked.is_empty());
    }

    #[test]
    fn test_abandon_round_records_no_score() {
        let store = temp_store("abandon");
        let dir = store.dir().to_path_buf();
        let mut session = Session::open(store, today());
        session.start_round(GameMode::Normal, 5, 1000);
        session.state.as_mut().unwrap().score.score = 9999;

        session.abandon_round();
        assert!(session.state.is_none());
        assert!(session.highscores.entries().is_empty());
        // Meta records still flushed on the way out
        assert!(dir.join("objectives.json").exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_hud_reflects_state() {
        let mut session = Session::open(temp_store("hud"), today());
        assert!(session.hud().is_none());

        session.start_round(GameMode::Precision, 5, 1000);
        let hud = session.hud().unwrap();
        assert_eq!(hud.lives, START_LIVES);
        assert_eq!(hud.level, 1);
        assert_eq!(hud.mode, GameMode::Precision);
        assert_eq!(hud.accuracy, None);
        assert_eq!(hud.objectives.len(), DAILY_OBJECTIVE_COUNT);
    }
}
