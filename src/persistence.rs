//! Best-effort JSON record store
//!
//! Each record lives in its own file under the save directory. Loads are
//! tolerant: a missing or corrupt file yields the default value with a
//! warning, never an error. Saves report I/O failures to the caller.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::achievements::Achievements;
use crate::highscores::HighScores;
use crate::sim::{CharacterRoster, DailyObjectives, ModeUnlocks};

const HIGHSCORES_FILE: &str = "highscores.json";
const ACHIEVEMENTS_FILE: &str = "achievements.json";
const OBJECTIVES_FILE: &str = "objectives.json";
const MODES_FILE: &str = "modes.json";
const ROSTER_FILE: &str = "roster.json";

/// File-backed store for everything that outlives a round
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.dir.join(name);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("ignoring corrupt save file {}: {err}", path.display());
                None
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, value: &T) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        fs::write(self.dir.join(name), json)
    }

    pub fn load_highscores(&self) -> HighScores {
        self.load(HIGHSCORES_FILE).unwrap_or_default()
    }

    pub fn save_highscores(&self, scores: &HighScores) -> io::Result<()> {
        self.save(HIGHSCORES_FILE, scores)
    }

    pub fn load_achievements(&self) -> Achievements {
        self.load(ACHIEVEMENTS_FILE).unwrap_or_default()
    }

    pub fn save_achievements(&self, achievements: &Achievements) -> io::Result<()> {
        self.save(ACHIEVEMENTS_FILE, achievements)
    }

    /// Objectives have no meaningful default; the caller rolls a fresh set
    /// for today when nothing (valid) is on disk
    pub fn load_objectives(&self) -> Option<DailyObjectives> {
        self.load(OBJECTIVES_FILE)
    }

    pub fn save_objectives(&self, objectives: &DailyObjectives) -> io::Result<()> {
        self.save(OBJECTIVES_FILE, objectives)
    }

    pub fn load_mode_unlocks(&self) -> ModeUnlocks {
        self.load(MODES_FILE).unwrap_or_default()
    }

    pub fn save_mode_unlocks(&self, unlocks: &ModeUnlocks) -> io::Result<()> {
        self.save(MODES_FILE, unlocks)
    }

    pub fn load_roster(&self) -> CharacterRoster {
        self.load(ROSTER_FILE).unwrap_or_default()
    }

    pub fn save_roster(&self, roster: &CharacterRoster) -> io::Result<()> {
        self.save(ROSTER_FILE, roster)
    }
}
