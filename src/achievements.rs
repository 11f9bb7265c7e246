//! Achievement catalog and unlock tracking
//!
//! Unlocks are strictly one-shot and persist across rounds. Threshold
//! achievements are checked against live round state after each tick; the
//! event-driven ones ride on drained [`GameEvent`]s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::consts::*;
use crate::sim::{Character, GameEvent, GameState};

/// Every achievement in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    /// Reach the combo cap
    ComboMaster,
    /// Survive two minutes in one round
    Survivor,
    /// Catch 50 good items in one round
    Collector,
    /// Hold all three power-up kinds in one round
    PowerupLover,
    /// 20 consecutive good catches without a miss or bad hit
    Perfect,
    /// Unlock the alternate character
    NewCharMyMelody,
    /// Complete all daily objectives
    DailyMaster,
    /// Complete Candy Rain
    SugarRush,
    /// Complete Speed Rush
    SpeedDemon,
    /// Complete Precision
    Accuracy,
}

impl AchievementId {
    pub const ALL: [AchievementId; 10] = [
        AchievementId::ComboMaster,
        AchievementId::Survivor,
        AchievementId::Collector,
        AchievementId::PowerupLover,
        AchievementId::Perfect,
        AchievementId::NewCharMyMelody,
        AchievementId::DailyMaster,
        AchievementId::SugarRush,
        AchievementId::SpeedDemon,
        AchievementId::Accuracy,
    ];

    /// Display name for the presentation layer
    pub fn title(self) -> &'static str {
        match self {
            AchievementId::ComboMaster => "Combo Master",
            AchievementId::Survivor => "Survivor",
            AchievementId::Collector => "Collector",
            AchievementId::PowerupLover => "Power-Up Lover",
            AchievementId::Perfect => "Perfect",
            AchievementId::NewCharMyMelody => "New Friend",
            AchievementId::DailyMaster => "Daily Master",
            AchievementId::SugarRush => "Sugar Rush",
            AchievementId::SpeedDemon => "Speed Demon",
            AchievementId::Accuracy => "Sharpshooter",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AchievementId::ComboMaster => "Reach a 10x combo",
            AchievementId::Survivor => "Survive for 2 minutes",
            AchievementId::Collector => "Catch 50 items in one round",
            AchievementId::PowerupLover => "Collect all 3 power-up types in one round",
            AchievementId::Perfect => "Catch 20 items in a row without a miss",
            AchievementId::NewCharMyMelody => "Unlock My Melody",
            AchievementId::DailyMaster => "Complete all daily objectives",
            AchievementId::SugarRush => "Complete Candy Rain mode",
            AchievementId::SpeedDemon => "Complete Speed Rush mode",
            AchievementId::Accuracy => "Complete Precision mode",
        }
    }
}

/// Persisted unlock set; serializes as a bare id-to-bool object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Achievements {
    unlocked: BTreeMap<AchievementId, bool>,
}

impl Achievements {
    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.get(&id).copied().unwrap_or(false)
    }

    pub fn unlocked_count(&self) -> usize {
        AchievementId::ALL
            .iter()
            .filter(|id| self.is_unlocked(**id))
            .count()
    }

    /// Unlock an achievement. Returns true only the first time.
    pub fn unlock(&mut self, id: AchievementId) -> bool {
        let fresh = !std::mem::replace(self.unlocked.entry(id).or_insert(false), true);
        if fresh {
            log::info!("achievement unlocked: {}", id.title());
        }
        fresh
    }

    /// Check the threshold achievements against live round state.
    /// Returns the achievements newly unlocked by this call.
    pub fn observe(&mut self, state: &GameState) -> Vec<AchievementId> {
        let mut fresh = Vec::new();
        let mut check = |cond: bool, id: AchievementId, fresh: &mut Vec<AchievementId>| {
            if cond && !self.is_unlocked(id) && self.unlock(id) {
                fresh.push(id);
            }
        };

        check(state.score.combo >= ACH_COMBO_MASTER_REQ, AchievementId::ComboMaster, &mut fresh);
        check(state.elapsed_ms() >= ACH_SURVIVOR_REQ_MS, AchievementId::Survivor, &mut fresh);
        check(
            state.score.items_collected >= ACH_COLLECTOR_REQ,
            AchievementId::Collector,
            &mut fresh,
        );
        check(
            state.score.powerup_kinds.len() as u32 >= ACH_POWERUP_LOVER_REQ,
            AchievementId::PowerupLover,
            &mut fresh,
        );
        check(
            state.score.perfect_streak >= ACH_PERFECT_REQ,
            AchievementId::Perfect,
            &mut fresh,
        );
        check(
            state.roster.is_unlocked(Character::MyMelody),
            AchievementId::NewCharMyMelody,
            &mut fresh,
        );
        fresh
    }

    /// React to a drained event (mode completions, all-objectives-done).
    /// Returns the achievement newly unlocked, if any.
    pub fn on_event(&mut self, event: &GameEvent) -> Option<AchievementId> {
        let id = match event {
            GameEvent::ModeCompleted(mode) => mode.completion_achievement()?,
            GameEvent::AllObjectivesCompleted => AchievementId::DailyMaster,
            _ => return None,
        };
        self.unlock(id).then_some(id)
    }
}
