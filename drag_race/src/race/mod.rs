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

pub mod input;
pub mod orchestrator;
pub mod progress;

pub use input::{InputSource, PlayerInput};
pub use orchestrator::{Competitor, CompetitorResult, RaceOrchestrator, RaceResult};
pub use progress::{RaceProgress, RaceState};

/// A quarter mile in metres
pub const QUARTER_MILE: f64 = 402.336;
