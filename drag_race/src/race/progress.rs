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
use utils::numeric::is_positive_finite;
use crate::error::{Error, ErrorKind, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RaceState {
    Idle,
    Racing,
    Finished
}

impl RaceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceState::Idle => "idle",
            RaceState::Racing => "racing",
            RaceState::Finished => "finished"
        }
    }
}

impl Display for RaceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-vehicle race state machine: Idle -> Racing -> Finished
#[derive(Debug, Clone, PartialEq)]
pub struct RaceProgress {
    state: RaceState,
    race_distance: f64,
    elapsed: f64,
    finish_time: Option<f64>
}

impl Default for RaceProgress {
    fn default() -> Self {
        RaceProgress::new()
    }
}

impl RaceProgress {
    pub fn new() -> RaceProgress {
        RaceProgress {
            state: RaceState::Idle,
            race_distance: 0.0,
            elapsed: 0.0,
            finish_time: None
        }
    }

    pub fn start(&mut self, race_distance: f64) -> Result<()> {
        if !is_positive_finite(race_distance) {
            return Err(Error::new(ErrorKind::InvalidRaceDistance,
                                  format!("race distance must be > 0, got {}", race_distance)));
        }
        self.state = RaceState::Racing;
        self.race_distance = race_distance;
        self.elapsed = 0.0;
        self.finish_time = None;
        Ok(())
    }

    /// Racing -> Idle. A finished race stays finished so its time survives.
    pub fn stop(&mut self) {
        if self.state == RaceState::Racing {
            self.state = RaceState::Idle;
        }
    }

    pub fn state(&self) -> RaceState {
        self.state
    }

    pub fn is_racing(&self) -> bool {
        self.state == RaceState::Racing
    }

    pub fn is_finished(&self) -> bool {
        self.state == RaceState::Finished
    }

    pub fn race_distance(&self) -> f64 {
        self.race_distance
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn finish_time(&self) -> Option<f64> {
        self.finish_time
    }

    pub fn distance_to_finish(&self, distance_traveled: f64) -> f64 {
        (self.race_distance - distance_traveled).max(0.0)
    }

    /// Advance the race clock by one tick in which the vehicle moved from
    /// `distance_before` to `distance_after`. Returns true on the tick the
    /// finish line is crossed.
    pub fn advance(&mut self, dt: f64, distance_before: f64, distance_after: f64) -> bool {
        if self.state != RaceState::Racing {
            return false;
        }
        self.elapsed += dt;
        if distance_after < self.race_distance {
            return false;
        }
        // Distance is linear in time within a tick so the crossing point can be
        // placed exactly rather than at the end of the tick
        let travelled = distance_after - distance_before;
        let fraction = if travelled > 0.0 {
            ((self.race_distance - distance_before) / travelled).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.finish_time = Some(self.elapsed - dt + fraction * dt);
        self.state = RaceState::Finished;
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::race::progress::{RaceProgress, RaceState};

    #[test]
    fn start_requires_positive_distance() {
        let mut progress = RaceProgress::new();
        for bad in [0.0, -402.0, f64::NAN, f64::INFINITY] {
            let err = progress.start(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRaceDistance);
            assert_eq!(progress.state(), RaceState::Idle);
        }
        progress.start(402.0).unwrap();
        assert_eq!(progress.state(), RaceState::Racing);
        assert_eq!(progress.race_distance(), 402.0);
    }

    #[test]
    fn finishes_with_interpolated_time() {
        let mut progress = RaceProgress::new();
        progress.start(100.0).unwrap();
        assert!(!progress.advance(1.0, 0.0, 60.0));
        assert_eq!(progress.distance_to_finish(60.0), 40.0);
        // Crosses 100m a quarter of the way through the second tick
        assert!(progress.advance(1.0, 90.0, 130.0));
        assert_eq!(progress.state(), RaceState::Finished);
        assert!((progress.finish_time().unwrap() - 1.25).abs() < 1e-9);
        assert_eq!(progress.distance_to_finish(130.0), 0.0);
    }

    #[test]
    fn advance_is_a_no_op_unless_racing() {
        let mut progress = RaceProgress::new();
        assert!(!progress.advance(1.0, 0.0, 1000.0));
        assert_eq!(progress.elapsed(), 0.0);

        progress.start(10.0).unwrap();
        assert!(progress.advance(1.0, 0.0, 10.0));
        let finish = progress.finish_time();
        assert!(!progress.advance(1.0, 10.0, 20.0));
        assert_eq!(progress.finish_time(), finish);
        assert_eq!(progress.elapsed(), 1.0);
    }

    #[test]
    fn stop_is_idempotent_and_keeps_finish() {
        let mut progress = RaceProgress::new();
        progress.start(50.0).unwrap();
        progress.stop();
        progress.stop();
        assert_eq!(progress.state(), RaceState::Idle);

        progress.start(50.0).unwrap();
        progress.advance(1.0, 0.0, 60.0);
        progress.stop();
        assert_eq!(progress.state(), RaceState::Finished);
        assert!(progress.finish_time().is_some());
    }
}
