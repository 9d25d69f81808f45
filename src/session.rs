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

use std::sync::Arc;
use tracing::{debug, warn};
use utils::numeric::is_positive_finite;

use drag_race::ai::{Difficulty, DifficultyProfile, OpponentController};
use drag_race::race::{InputSource, RaceOrchestrator, RaceResult};
use drag_race::vehicle::{VehicleSimulation, VehicleSpec};

use crate::driver::ScriptedDriver;
use crate::error::AppError;
use crate::settings::GlobalSettings;

/// Races still running after this much simulated time are aborted
pub const MAX_RACE_TIME: f64 = 300.0;

/// Everything needed to run headless races between the same two cars
#[derive(Debug, Clone)]
pub struct RaceSession {
    player_spec: Arc<VehicleSpec>,
    opponent_spec: Arc<VehicleSpec>,
    profile: DifficultyProfile,
    difficulty: Difficulty,
    race_distance: f64,
    tick_rate: f64,
    player_shift_rpm: f64
}

impl RaceSession {
    pub fn new(player_spec: VehicleSpec,
               opponent_spec: VehicleSpec,
               profile: DifficultyProfile,
               difficulty: Difficulty,
               race_distance: f64,
               tick_rate: f64,
               player_shift_rpm: f64) -> Result<RaceSession, AppError> {
        if !is_positive_finite(tick_rate) {
            return Err(AppError::InvalidSetting("tick_rate".to_string(),
                                                format!("must be > 0, got {}", tick_rate)));
        }
        profile.validate()?;
        Ok(RaceSession {
            player_spec: Arc::new(player_spec),
            opponent_spec: Arc::new(opponent_spec),
            profile,
            difficulty,
            race_distance,
            tick_rate,
            player_shift_rpm
        })
    }

    pub fn from_settings(settings: &GlobalSettings) -> Result<RaceSession, AppError> {
        RaceSession::new(settings.player_vehicle()?,
                         settings.opponent_vehicle()?,
                         settings.opponent_profile()?,
                         settings.difficulty(),
                         settings.race_distance(),
                         settings.tick_rate(),
                         settings.player_shift_rpm())
    }

    pub fn player_spec(&self) -> &VehicleSpec {
        &self.player_spec
    }

    pub fn opponent_spec(&self) -> &VehicleSpec {
        &self.opponent_spec
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn race_distance(&self) -> f64 {
        self.race_distance
    }

    /// Run one race with the scripted driver. The seed fixes the AI's
    /// decisions so the same seed always gives the same result.
    pub fn run(&self, seed: u64) -> Result<RaceResult, AppError> {
        let player = VehicleSimulation::new(Arc::clone(&self.player_spec));
        let opponent = OpponentController::with_seed(Arc::clone(&self.opponent_spec),
                                                     self.profile.clone(),
                                                     self.difficulty,
                                                     seed)?;
        let mut race = RaceOrchestrator::new(player, opponent);
        let mut driver = ScriptedDriver::new(&self.player_spec, self.player_shift_rpm);
        race.start(self.race_distance)?;

        let dt = 1.0 / self.tick_rate;
        let max_ticks = (MAX_RACE_TIME * self.tick_rate).ceil() as u64;
        for _ in 0..max_ticks {
            let input = driver.next_input(race.player().state());
            if let Some(result) = race.tick(dt, &input) {
                debug!("Seed {} finished", seed);
                return Ok(result);
            }
        }
        warn!("Race with seed {} still running after {}s, aborting", seed, MAX_RACE_TIME);
        race.abort().ok_or(AppError::RaceNotStarted(seed))
    }

    pub fn run_batch(&self, runs: u64, base_seed: u64) -> Result<Vec<RaceResult>, AppError> {
        (0..runs).map(|i| self.run(base_seed.wrapping_add(i))).collect()
    }
}

#[cfg(test)]
mod tests {
    use drag_race::ai::{Difficulty, DifficultyProfile};
    use drag_race::vehicle::VehicleSpec;
    use crate::error::AppError;
    use crate::session::RaceSession;

    fn session(difficulty: Difficulty, race_distance: f64) -> RaceSession {
        RaceSession::new(VehicleSpec::reference_sedan(),
                         VehicleSpec::reference_sedan(),
                         DifficultyProfile::default(),
                         difficulty,
                         race_distance,
                         60.0,
                         6800.0).unwrap()
    }

    #[test]
    fn both_cars_finish() {
        let result = session(Difficulty::Medium, 402.0).run(1).unwrap();
        assert!(!result.aborted);
        assert!(result.winner.is_some());
        let player_time = result.player.finish_time.unwrap();
        let opponent_time = result.opponent.finish_time.unwrap();
        assert!(player_time > 0.0 && player_time < 20.0);
        assert!(opponent_time > 0.0 && opponent_time < 20.0);
        assert!(result.margin.unwrap() >= 0.0);
    }

    #[test]
    fn same_seed_same_result() {
        let session = session(Difficulty::Hard, 402.0);
        assert_eq!(session.run(7).unwrap(), session.run(7).unwrap());
    }

    #[test]
    fn batch_runs_each_seed() {
        let results = session(Difficulty::Easy, 201.0).run_batch(3, 10).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.aborted));
    }

    #[test]
    fn bad_configuration_rejected() {
        let err = RaceSession::new(VehicleSpec::reference_sedan(),
                                   VehicleSpec::reference_sedan(),
                                   DifficultyProfile::default(),
                                   Difficulty::Medium,
                                   402.0,
                                   0.0,
                                   6800.0).unwrap_err();
        assert!(matches!(err, AppError::InvalidSetting(_, _)));

        let err = session(Difficulty::Medium, -10.0).run(1).unwrap_err();
        match err {
            AppError::RaceError(e) => assert_eq!(e.kind(), drag_race::ErrorKind::InvalidRaceDistance),
            other => panic!("unexpected error {:?}", other)
        }
    }
}
