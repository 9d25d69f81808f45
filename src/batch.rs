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
use statrs::statistics::{Data, Median, Statistics};
use utils::numeric::round_float_to;

use drag_race::race::RaceResult;

/// Player finish-time statistics over a batch of races
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub runs: usize,
    pub player_wins: usize,
    /// Races the player finished
    pub finished: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64
}

impl BatchSummary {
    /// None if the player didn't finish a single race
    pub fn from_results(results: &[RaceResult]) -> Option<BatchSummary> {
        let times: Vec<f64> = results.iter().filter_map(|r| r.player.finish_time).collect();
        if times.is_empty() {
            return None;
        }
        // Sample deviation is undefined for a single race
        let std_dev = match times.len() {
            1 => 0.0,
            _ => times.iter().std_dev()
        };
        Some(BatchSummary {
            runs: results.len(),
            player_wins: results.iter().filter(|r| r.player_won()).count(),
            finished: times.len(),
            mean: times.iter().mean(),
            median: Data::new(times.clone()).median(),
            std_dev,
            min: Statistics::min(times.iter()),
            max: Statistics::max(times.iter())
        })
    }

    pub fn win_rate(&self) -> f64 {
        match self.runs {
            0 => 0.0,
            runs => self.player_wins as f64 / runs as f64
        }
    }
}

impl Display for BatchSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Races: {} ({} finished by the player)", self.runs, self.finished)?;
        writeln!(f, "Player win rate: {}%", round_float_to(self.win_rate() * 100.0, 1))?;
        writeln!(f, "Mean: {:.3}s  Median: {:.3}s  Std dev: {:.3}s",
                 self.mean, self.median, self.std_dev)?;
        write!(f, "Best: {:.3}s  Worst: {:.3}s", self.min, self.max)
    }
}
