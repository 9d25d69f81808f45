/*
 * Copyright (c):
 * 2025 zephyrj
 * zephyrj@protonmail.com
 *
 * This file is part of drag-strip.
 *
 * drag-strip is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * drag-strip is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with drag-strip. If not, see <https://www.gnu.org/licenses/>.
 */

use std::collections::BTreeMap;
use std::{fs, io};
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use drag_race::race::RaceResult;

pub const RECORDS_FILENAME: &'static str = "best_times.toml";

#[derive(thiserror::Error, Debug)]
pub enum RecordsError {
    #[error("io error")]
    IoError(#[from] io::Error),
    #[error("couldn't decode records. `{0}`")]
    DecodeError(#[from] toml::de::Error),
    #[error("couldn't encode records. `{0}`")]
    EncodeError(#[from] toml::ser::Error)
}

pub fn get_default_records_path() -> PathBuf {
    match ProjectDirs::from("", "zephyrj", "drag-strip") {
        Some(dirs) => dirs.data_dir().join(RECORDS_FILENAME),
        None => PathBuf::from(RECORDS_FILENAME)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestTime {
    /// s
    pub time: f64,
    pub vehicle: String,
    /// m/s at the line
    pub final_speed: f64
}

/// Player's best time for each race distance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestTimes {
    #[serde(default)]
    records: BTreeMap<String, BestTime>
}

impl BestTimes {
    fn distance_key(race_distance: f64) -> String {
        format!("{:.1}", race_distance)
    }

    /// A missing file just means nothing has been recorded yet
    pub fn load(path: &Path) -> Result<BestTimes, RecordsError> {
        if !path.exists() {
            debug!("No records at {}", path.display());
            return Ok(BestTimes::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(toml::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), RecordsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn best_for(&self, race_distance: f64) -> Option<&BestTime> {
        self.records.get(&BestTimes::distance_key(race_distance))
    }

    /// Record the player's time if it beats the current best.
    /// Aborted races and races the player didn't finish never count.
    pub fn submit(&mut self, result: &RaceResult, vehicle: &str) -> bool {
        if result.aborted {
            return false;
        }
        let time = match result.player.finish_time {
            Some(t) => t,
            None => return false
        };
        let key = BestTimes::distance_key(result.race_distance);
        if let Some(existing) = self.records.get(&key) {
            if existing.time <= time {
                return false;
            }
        }
        info!("New best time over {}m: {:.3}s", key, time);
        self.records.insert(key, BestTime {
            time,
            vehicle: vehicle.to_string(),
            final_speed: result.player.final_speed
        });
        true
    }
}
