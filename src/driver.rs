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

use drag_race::race::{InputSource, PlayerInput};
use drag_race::vehicle::{VehicleSpec, VehicleState};

/// Headless player: launch control off the line, flat out, shift at a fixed
/// rpm and fire the nitro once in the upper gears.
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    shift_rpm: f64,
    max_gear: usize,
    nitro_from_gear: usize,
    has_nitro: bool,
    launched: bool
}

impl ScriptedDriver {
    pub fn new(spec: &VehicleSpec, shift_rpm: f64) -> ScriptedDriver {
        let max_gear = spec.gear_ratios.len();
        ScriptedDriver {
            shift_rpm,
            max_gear,
            nitro_from_gear: max_gear.saturating_sub(1).max(1),
            has_nitro: spec.has_nitro(),
            launched: false
        }
    }
}

impl InputSource for ScriptedDriver {
    fn next_input(&mut self, state: &VehicleState) -> PlayerInput {
        let mut input = PlayerInput::with_throttle(1.0);
        if !self.launched {
            input.launch_control = true;
            self.launched = true;
            return input;
        }
        if state.gear >= 1 && state.gear < self.max_gear && state.rpm >= self.shift_rpm {
            input.shift_up = true;
        }
        if self.has_nitro &&
            !state.nitro_engaged &&
            state.nitro_charge > 0.0 &&
            state.gear >= self.nitro_from_gear {
            input.nitro = true;
        }
        input
    }
}
