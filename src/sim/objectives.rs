//! Daily objectives
//!
//! Three objectives are rolled per calendar day. Progress accumulates across
//! rounds, completion pays a flat score bonus and is strictly one-shot.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Objective categories; each maps to one tracked statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Good items caught (cumulative)
    ItemsCaught,
    /// Best combo chain seen
    ComboReached,
    /// Best round score seen
    ScoreReached,
    /// Power-ups collected (cumulative)
    PowerupsCollected,
    /// Best level seen
    LevelReached,
}

impl ObjectiveKind {
    pub const ALL: [ObjectiveKind; 5] = [
        ObjectiveKind::ItemsCaught,
        ObjectiveKind::ComboReached,
        ObjectiveKind::ScoreReached,
        ObjectiveKind::PowerupsCollected,
        ObjectiveKind::LevelReached,
    ];

    /// Upper bound for the rolled target
    pub fn max_target(self) -> u32 {
        match self {
            ObjectiveKind::ItemsCaught => 100,
            ObjectiveKind::ComboReached => 10,
            ObjectiveKind::ScoreReached => 5000,
            ObjectiveKind::PowerupsCollected => 10,
            ObjectiveKind::LevelReached => 10,
        }
    }
}

/// One rolled objective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    #[serde(rename = "type")]
    pub kind: ObjectiveKind,
    pub target: u32,
    pub completed: bool,
}

/// The current day's objective set with its accumulated progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyObjectives {
    objectives: Vec<Objective>,
    /// Progress per active kind, clamped to the target
    progress: BTreeMap<ObjectiveKind, u32>,
    last_update: NaiveDate,
    /// The not-yet-completed objective whose progress moved last; display
    /// state only, not persisted
    #[serde(skip)]
    active: Option<ObjectiveKind>,
}

impl DailyObjectives {
    /// Roll a fresh set of [`DAILY_OBJECTIVE_COUNT`] distinct objectives.
    /// Targets land uniformly in `[max/2, max]`.
    pub fn generate(date: NaiveDate, rng: &mut impl Rng) -> Self {
        let mut kinds = ObjectiveKind::ALL;
        kinds.shuffle(rng);

        let objectives = kinds[..DAILY_OBJECTIVE_COUNT]
            .iter()
            .map(|&kind| {
                let max = kind.max_target();
                Objective {
                    kind,
                    target: rng.random_range(max / 2..=max),
                    completed: false,
                }
            })
            .collect();

        Self {
            objectives,
            progress: BTreeMap::new(),
            last_update: date,
            active: None,
        }
    }

    /// Re-roll when the calendar day changed. Returns true if it did.
    pub fn roll_over(&mut self, today: NaiveDate, rng: &mut impl Rng) -> bool {
        if self.last_update == today {
            return false;
        }
        log::info!("rolling daily objectives for {today}");
        *self = Self::generate(today, rng);
        true
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn progress(&self, kind: ObjectiveKind) -> u32 {
        self.progress.get(&kind).copied().unwrap_or(0)
    }

    pub fn all_completed(&self) -> bool {
        self.objectives.iter().all(|o| o.completed)
    }

    /// The objective currently highlighted for progress display
    pub fn active(&self) -> Option<ObjectiveKind> {
        self.active
    }

    /// Bump a cumulative counter (items caught, power-ups collected).
    /// Returns the number of objectives newly completed by this call.
    pub fn add(&mut self, kind: ObjectiveKind, amount: u32, events: &mut Vec<GameEvent>) -> u32 {
        let value = self.progress(kind).saturating_add(amount);
        self.apply(kind, value, events)
    }

    /// Report an observed best value (combo, score, level). Progress only
    /// moves forward, so re-observing a lower value is a no-op.
    pub fn observe(&mut self, kind: ObjectiveKind, value: u32, events: &mut Vec<GameEvent>) -> u32 {
        self.apply(kind, value, events)
    }

    fn apply(&mut self, kind: ObjectiveKind, value: u32, events: &mut Vec<GameEvent>) -> u32 {
        let Some(idx) = self.objectives.iter().position(|o| o.kind == kind) else {
            return 0;
        };
        let target = self.objectives[idx].target;

        let clamped = value.min(target).max(self.progress(kind));
        self.progress.insert(kind, clamped);

        if self.objectives[idx].completed {
            return 0;
        }
        // The last-touched incomplete objective is the one the HUD highlights
        self.active = Some(kind);
        if clamped < target {
            return 0;
        }
        self.objectives[idx].completed = true;
        self.active = None;
        events.push(GameEvent::ObjectiveCompleted(kind));
        log::info!("daily objective completed: {kind:?} (target {target})");

        if self.all_completed() {
            events.push(GameEvent::AllObjectivesCompleted);
        }
        1
    }
}

/// Pay the flat reward for objectives completed during this tick
pub(crate) fn grant_rewards(state: &mut GameState, newly_completed: u32) {
    if newly_completed > 0 {
        state.score.add_bonus(
            newly_completed as i64 * DAILY_OBJECTIVE_REWARD,
            &mut state.roster,
            &mut state.events,
        );
    }
}
