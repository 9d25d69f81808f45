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
use tracing::{info, warn};
use utils::numeric::is_positive_finite;

use crate::ai::OpponentController;
use crate::error::Result;
use crate::race::input::PlayerInput;
use crate::vehicle::VehicleSimulation;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Competitor {
    Player,
    Opponent
}

impl Competitor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Competitor::Player => "player",
            Competitor::Opponent => "opponent"
        }
    }
}

impl Display for Competitor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompetitorResult {
    /// None if the line wasn't reached
    pub finish_time: Option<f64>,
    /// m/s
    pub final_speed: f64,
    pub distance: f64
}

impl CompetitorResult {
    fn from_vehicle(vehicle: &VehicleSimulation) -> CompetitorResult {
        CompetitorResult {
            finish_time: vehicle.progress().finish_time(),
            final_speed: vehicle.state().speed,
            distance: vehicle.state().distance
        }
    }

    pub fn finished(&self) -> bool {
        self.finish_time.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub race_distance: f64,
    pub winner: Option<Competitor>,
    pub player: CompetitorResult,
    pub opponent: CompetitorResult,
    /// Seconds between the two finish times when both finished
    pub margin: Option<f64>,
    pub aborted: bool
}

impl RaceResult {
    pub fn player_won(&self) -> bool {
        self.winner == Some(Competitor::Player)
    }
}

/// Dead heats go to the player
fn decide_winner(player: Option<f64>, opponent: Option<f64>) -> (Option<Competitor>, Option<f64>) {
    match (player, opponent) {
        (Some(p), Some(o)) if p <= o => (Some(Competitor::Player), Some(o - p)),
        (Some(p), Some(o)) => (Some(Competitor::Opponent), Some(p - o)),
        (Some(_), None) => (Some(Competitor::Player), None),
        (None, Some(_)) => (Some(Competitor::Opponent), None),
        (None, None) => (None, None)
    }
}

/// Runs one player vehicle against one AI opponent over the same distance
#[derive(Debug)]
pub struct RaceOrchestrator {
    player: VehicleSimulation,
    opponent: OpponentController,
    race_distance: f64,
    active: bool,
    result: Option<RaceResult>
}

impl RaceOrchestrator {
    pub fn new(player: VehicleSimulation, opponent: OpponentController) -> RaceOrchestrator {
        RaceOrchestrator {
            player,
            opponent,
            race_distance: 0.0,
            active: false,
            result: None
        }
    }

    pub fn player(&self) -> &VehicleSimulation {
        &self.player
    }

    pub fn opponent(&self) -> &OpponentController {
        &self.opponent
    }

    pub fn is_racing(&self) -> bool {
        self.active
    }

    pub fn race_distance(&self) -> f64 {
        self.race_distance
    }

    /// Result of the last race to end, if any
    pub fn result(&self) -> Option<&RaceResult> {
        self.result.as_ref()
    }

    /// Put both cars on the line. If either can't start neither races.
    pub fn start(&mut self, race_distance: f64) -> Result<()> {
        if self.active {
            warn!("Restarting a race that was still running");
            self.player.stop_race();
            self.opponent.stop_race();
            self.active = false;
        }
        self.result = None;
        self.player.start_race(race_distance)?;
        if let Err(e) = self.opponent.start_race(race_distance) {
            self.player.stop_race();
            return Err(e);
        }
        self.race_distance = race_distance;
        self.active = true;
        info!("{} vs {} ({}) over {}m",
              self.player.spec().name,
              self.opponent.vehicle().spec().name,
              self.opponent.difficulty(),
              race_distance);
        Ok(())
    }

    /// Advance the race by `dt` seconds. Returns the result on the tick the
    /// second car crosses the line.
    pub fn tick(&mut self, dt: f64, input: &PlayerInput) -> Option<RaceResult> {
        if !self.active || !is_positive_finite(dt) {
            return None;
        }
        self.apply_input(input);
        self.player.tick(dt, input.throttle);
        self.opponent.tick(dt, self.player.state().distance);
        if self.player.is_finished() && self.opponent.vehicle().is_finished() {
            return Some(self.finish(false));
        }
        None
    }

    fn apply_input(&mut self, input: &PlayerInput) {
        if !self.player.is_racing() {
            return;
        }
        if input.launch_control {
            self.player.launch_control();
        }
        if input.shift_up {
            self.player.shift_up();
        }
        if input.shift_down {
            self.player.shift_down();
        }
        if input.nitro {
            self.player.activate_nitro();
        }
    }

    /// Stop both cars now and report whatever has been decided so far.
    /// Once the race is over this returns the existing result, and `None` if
    /// no race was ever started.
    pub fn abort(&mut self) -> Option<RaceResult> {
        if self.active {
            return Some(self.finish(true));
        }
        self.result.clone()
    }

    fn finish(&mut self, aborted: bool) -> RaceResult {
        self.player.stop_race();
        self.opponent.stop_race();
        self.active = false;

        let player = CompetitorResult::from_vehicle(&self.player);
        let opponent = CompetitorResult::from_vehicle(self.opponent.vehicle());
        let (winner, margin) = decide_winner(player.finish_time, opponent.finish_time);
        let result = RaceResult {
            race_distance: self.race_distance,
            winner,
            player,
            opponent,
            margin,
            aborted
        };
        match (&result.winner, aborted) {
            (Some(winner), false) => info!("Race over, {} won by {:.3}s", winner, margin.unwrap_or(0.0)),
            (Some(winner), true) => info!("Race aborted, {} had finished", winner),
            (None, _) => info!("Race aborted with no finishers")
        }
        self.result = Some(result.clone());
        result
    }
}
