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

use std::fs;
use std::path::PathBuf;
use config::{Config, ConfigBuilder, ConfigError};
use config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use drag_race::ai::{Difficulty, DifficultyProfile};
use drag_race::race::QUARTER_MILE;
use drag_race::vehicle::VehicleSpec;

use crate::records;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GlobalSettings {
    player_vehicle_path: String,
    opponent_vehicle_path: String,
    opponent_profile_path: String,
    difficulty: Difficulty,
    race_distance: f64,
    tick_rate: f64,
    player_shift_rpm: f64,
    records_path: String,
    batch_size: u64,
    #[serde(default)]
    seed: Option<u64>
}

impl GlobalSettings {
    const PLAYER_VEHICLE_PATH: &'static str = "player_vehicle_path";
    const OPPONENT_VEHICLE_PATH: &'static str = "opponent_vehicle_path";
    const OPPONENT_PROFILE_PATH: &'static str = "opponent_profile_path";
    const DIFFICULTY: &'static str = "difficulty";
    const RACE_DISTANCE: &'static str = "race_distance";
    const TICK_RATE: &'static str = "tick_rate";
    const PLAYER_SHIFT_RPM: &'static str = "player_shift_rpm";
    const RECORDS_PATH: &'static str = "records_path";
    const BATCH_SIZE: &'static str = "batch_size";
    const CONFIG_FILENAME: &'static str = "drag-strip-conf";
    const ENV_PREFIX: &'static str = "DRAG";

    pub const DEFAULT_TICK_RATE: f64 = 60.0;
    pub const DEFAULT_PLAYER_SHIFT_RPM: f64 = 6800.0;
    pub const DEFAULT_BATCH_SIZE: u64 = 100;

    pub fn default() -> Self {
        GlobalSettings {
            player_vehicle_path: String::new(),
            opponent_vehicle_path: String::new(),
            opponent_profile_path: String::new(),
            difficulty: Difficulty::default(),
            race_distance: QUARTER_MILE,
            tick_rate: GlobalSettings::DEFAULT_TICK_RATE,
            player_shift_rpm: GlobalSettings::DEFAULT_PLAYER_SHIFT_RPM,
            records_path: records::get_default_records_path().to_string_lossy().into_owned(),
            batch_size: GlobalSettings::DEFAULT_BATCH_SIZE,
            seed: None
        }
    }

    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default(GlobalSettings::PLAYER_VEHICLE_PATH, "")?
            .set_default(GlobalSettings::OPPONENT_VEHICLE_PATH, "")?
            .set_default(GlobalSettings::OPPONENT_PROFILE_PATH, "")?
            .set_default(GlobalSettings::DIFFICULTY, Difficulty::default().as_str())?
            .set_default(GlobalSettings::RACE_DISTANCE, QUARTER_MILE)?
            .set_default(GlobalSettings::TICK_RATE, GlobalSettings::DEFAULT_TICK_RATE)?
            .set_default(GlobalSettings::PLAYER_SHIFT_RPM, GlobalSettings::DEFAULT_PLAYER_SHIFT_RPM)?
            .set_default(GlobalSettings::RECORDS_PATH, records::get_default_records_path().to_string_lossy().into_owned())?
            .set_default(GlobalSettings::BATCH_SIZE, GlobalSettings::DEFAULT_BATCH_SIZE)
    }

    pub fn load() -> Result<Self, ConfigError> {
        return match GlobalSettings::builder_with_defaults()?
            .add_source(config::File::with_name(GlobalSettings::CONFIG_FILENAME))
            .add_source(config::Environment::with_prefix(GlobalSettings::ENV_PREFIX))
            .build() {
            Ok(settings) => {
                settings.try_deserialize()
            }
            Err(e) => {
                warn!("Failed to load settings. {}", e.to_string());
                let settings = GlobalSettings::builder_with_defaults()?
                    .add_source(config::Environment::with_prefix(GlobalSettings::ENV_PREFIX))
                    .build()?;
                let ret: GlobalSettings = settings.try_deserialize()?;
                ret.write().unwrap_or_else(|e| { error!("Failed to write settings. {}", e.to_string())});
                Ok(ret)
            }
        }
    }

    fn optional_path(path: &str) -> Option<PathBuf> {
        match path.trim() {
            "" => None,
            p => Some(PathBuf::from(p))
        }
    }

    fn load_vehicle(path: &str) -> drag_race::Result<VehicleSpec> {
        match GlobalSettings::optional_path(path) {
            Some(path) => VehicleSpec::load_from_path(&path),
            None => {
                info!("No vehicle configured, using the reference sedan");
                Ok(VehicleSpec::reference_sedan())
            }
        }
    }

    pub fn player_vehicle(&self) -> drag_race::Result<VehicleSpec> {
        GlobalSettings::load_vehicle(&self.player_vehicle_path)
    }

    pub fn opponent_vehicle(&self) -> drag_race::Result<VehicleSpec> {
        GlobalSettings::load_vehicle(&self.opponent_vehicle_path)
    }

    pub fn opponent_profile(&self) -> drag_race::Result<DifficultyProfile> {
        match GlobalSettings::optional_path(&self.opponent_profile_path) {
            Some(path) => {
                let data = fs::read_to_string(&path)?;
                let profile = DifficultyProfile::from_toml_str(&data)?;
                info!("Loaded AI profile from {}", path.display());
                Ok(profile)
            }
            None => Ok(DifficultyProfile::default())
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn race_distance(&self) -> f64 {
        self.race_distance
    }

    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    pub fn player_shift_rpm(&self) -> f64 {
        self.player_shift_rpm
    }

    pub fn records_path(&self) -> PathBuf {
        GlobalSettings::optional_path(&self.records_path).unwrap_or_else(records::get_default_records_path)
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn write(&self) -> std::io::Result<()> {
        fs::write(format!("{}.toml", GlobalSettings::CONFIG_FILENAME), toml::to_string(&self).map_err(|_e|{
            std::io::Error::new(std::io::ErrorKind::Other, "Failed to encode settings to toml")
        })?)
    }
}

#[cfg(test)]
mod tests {
    use config::{File, FileFormat};
    use drag_race::ai::Difficulty;
    use drag_race::race::QUARTER_MILE;
    use crate::settings::GlobalSettings;

    const TEST_DATA: &'static str = r#"
difficulty = "expert"
race_distance = 201.0
tick_rate = 120.0
seed = 99
"#;

    fn from_toml(data: &str) -> GlobalSettings {
        GlobalSettings::builder_with_defaults().unwrap()
            .add_source(File::from_str(data, FileFormat::Toml))
            .build().unwrap()
            .try_deserialize().unwrap()
    }

    #[test]
    fn defaults_match() {
        let settings = from_toml("");
        assert_eq!(settings, GlobalSettings::default());
        assert_eq!(settings.difficulty(), Difficulty::Medium);
        assert_eq!(settings.race_distance(), QUARTER_MILE);
        assert_eq!(settings.seed(), None);
    }

    #[test]
    fn file_overrides_defaults() {
        let settings = from_toml(TEST_DATA);
        assert_eq!(settings.difficulty(), Difficulty::Expert);
        assert_eq!(settings.race_distance(), 201.0);
        assert_eq!(settings.tick_rate(), 120.0);
        assert_eq!(settings.seed(), Some(99));
        assert_eq!(settings.batch_size(), GlobalSettings::DEFAULT_BATCH_SIZE);
        assert_eq!(settings.player_shift_rpm(), GlobalSettings::DEFAULT_PLAYER_SHIFT_RPM);
    }

    #[test]
    fn empty_paths_use_built_in_data() {
        let settings = GlobalSettings::default();
        assert_eq!(settings.player_vehicle().unwrap().name, "Reference Sedan");
        assert_eq!(settings.opponent_vehicle().unwrap().name, "Reference Sedan");
        assert!(settings.opponent_profile().unwrap().validate().is_ok());
    }

    #[test]
    fn missing_vehicle_file_is_an_io_error() {
        let settings = from_toml("player_vehicle_path = \"/definitely/not/here.toml\"");
        let err = settings.player_vehicle().unwrap_err();
        assert_eq!(err.kind(), drag_race::ErrorKind::IOError);
    }

    #[test]
    fn settings_encode_to_toml() {
        let settings = from_toml("difficulty = \"hard\"");
        assert_eq!(settings.difficulty(), Difficulty::Hard);
        let encoded = toml::to_string(&settings).unwrap();
        assert!(encoded.contains("difficulty = \"hard\""));
        assert_eq!(from_toml(&encoded), settings);
    }
}
