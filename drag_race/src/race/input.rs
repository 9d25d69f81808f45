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

use crate::vehicle::VehicleState;

/// Driver requests for a single tick. Actions are applied before the
/// vehicle is advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// 0-1, out of range values are clamped
    pub throttle: f64,
    pub shift_up: bool,
    pub shift_down: bool,
    pub nitro: bool,
    pub launch_control: bool
}

impl PlayerInput {
    pub fn with_throttle(throttle: f64) -> PlayerInput {
        PlayerInput { throttle, ..PlayerInput::default() }
    }
}

/// Something that can drive the player's car: a keyboard, a replay, a script.
pub trait InputSource {
    /// Input for the next tick given where the car is now
    fn next_input(&mut self, state: &VehicleState) -> PlayerInput;
}

#[cfg(test)]
mod tests {
    use crate::race::input::PlayerInput;

    #[test]
    fn throttle_only_input() {
        let input = PlayerInput::with_throttle(0.7);
        assert_eq!(input.throttle, 0.7);
        assert_eq!(input, PlayerInput { throttle: 0.7, ..PlayerInput::default() });
        assert!(!input.shift_up && !input.shift_down && !input.nitro && !input.launch_control);
    }
}
