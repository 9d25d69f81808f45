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

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracing::{debug, warn};
use utils::numeric::is_positive_finite;

use crate::ai::difficulty::{Difficulty, DifficultyProfile};
use crate::error::Result;
use crate::events::VehicleObserver;
use crate::vehicle::{VehicleSimulation, VehicleSpec};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OpponentState {
    Idle,
    AwaitingLaunch,
    Racing
}

impl OpponentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpponentState::Idle => "idle",
            OpponentState::AwaitingLaunch => "awaiting launch",
            OpponentState::Racing => "racing"
        }
    }
}

impl Display for OpponentState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// AI driver for one vehicle.
///
/// Waits out a reaction time at the start, launches, then holds full throttle
/// and shifts up stochastically once past the profile's shift rpm. Falling
/// behind makes shifts come quicker.
#[derive(Debug)]
pub struct OpponentController {
    vehicle: VehicleSimulation,
    profile: DifficultyProfile,
    difficulty: Difficulty,
    state: OpponentState,
    launch_timer: f64,
    rng: StdRng
}

impl OpponentController {
    pub fn new(spec: Arc<VehicleSpec>,
               profile: DifficultyProfile,
               difficulty: Difficulty) -> Result<OpponentController> {
        OpponentController::with_rng(spec, profile, difficulty, StdRng::from_entropy())
    }

    /// Controller whose shift decisions are reproducible for a given seed
    pub fn with_seed(spec: Arc<VehicleSpec>,
                     profile: DifficultyProfile,
                     difficulty: Difficulty,
                     seed: u64) -> Result<OpponentController> {
        OpponentController::with_rng(spec, profile, difficulty, StdRng::seed_from_u64(seed))
    }

    fn with_rng(spec: Arc<VehicleSpec>,
                profile: DifficultyProfile,
                difficulty: Difficulty,
                rng: StdRng) -> Result<OpponentController> {
        profile.validate()?;
        Ok(OpponentController {
            vehicle: VehicleSimulation::new(spec),
            profile,
            difficulty,
            state: OpponentState::Idle,
            launch_timer: 0.0,
            rng
        })
    }

    pub fn vehicle(&self) -> &VehicleSimulation {
        &self.vehicle
    }

    pub fn subscribe(&mut self, observer: Box<dyn VehicleObserver>) {
        self.vehicle.subscribe(observer);
    }

    pub fn state(&self) -> OpponentState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Seconds from the start of the race until the AI launches
    pub fn reaction_time(&self) -> f64 {
        self.profile.reaction_time(self.difficulty)
    }

    /// Takes effect from the next launch
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if self.state != OpponentState::Idle {
            warn!("Changing AI difficulty to {} mid-race", difficulty);
        }
        self.difficulty = difficulty;
    }

    pub fn start_race(&mut self, race_distance: f64) -> Result<()> {
        self.vehicle.start_race(race_distance)?;
        self.state = OpponentState::AwaitingLaunch;
        self.launch_timer = 0.0;
        debug!("AI ({}) waiting {:.2}s to launch", self.difficulty, self.reaction_time());
        Ok(())
    }

    pub fn stop_race(&mut self) {
        self.vehicle.stop_race();
        self.state = OpponentState::Idle;
    }

    pub fn throttle(&self) -> f64 {
        match self.state {
            OpponentState::Racing => 1.0,
            _ => 0.0
        }
    }

    /// Drive the AI vehicle for `dt` seconds. `opponent_distance` is how far
    /// the vehicle being raced against has travelled.
    pub fn tick(&mut self, dt: f64, opponent_distance: f64) {
        if !is_positive_finite(dt) {
            return;
        }
        match self.state {
            OpponentState::Idle => return,
            OpponentState::AwaitingLaunch => {
                self.launch_timer += dt;
                if self.launch_timer >= self.reaction_time() {
                    if self.vehicle.launch_control() {
                        debug!("AI launched after {:.3}s", self.launch_timer);
                    } else {
                        warn!("AI launch control rejected, racing from gear {}", self.vehicle.state().gear);
                    }
                    self.state = OpponentState::Racing;
                }
            }
            OpponentState::Racing => self.consider_shift(dt, opponent_distance)
        }
        self.vehicle.tick(dt, self.throttle());
    }

    fn consider_shift(&mut self, dt: f64, opponent_distance: f64) {
        if !self.vehicle.is_racing() {
            return;
        }
        let state = self.vehicle.state();
        if state.rpm < self.profile.shift_rpm_threshold || state.gear >= self.vehicle.drivetrain().max_gear() {
            return;
        }
        let gap = opponent_distance - state.distance;
        let bonus = self.profile.rubber_band.bonus(gap);
        let chance = self.profile.shift_probability(dt, bonus);
        if self.rng.gen::<f64>() < chance {
            self.vehicle.shift_up();
        }
    }
}
