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

pub fn round_float_to(float: f64, decimal_places: u32) -> f64 {
    let precision_base: u64 = 10;
    let precision_factor = precision_base.pow(decimal_places) as f64;
    (float * precision_factor).round() / precision_factor
}

/// Clamp a value into the range [0, 1]. NaN maps to 0.
pub fn clamp_unit(val: f64) -> f64 {
    if val.is_nan() {
        return 0.0;
    }
    val.clamp(0.0, 1.0)
}

pub fn is_positive_finite(val: f64) -> bool {
    val.is_finite() && val > 0.0
}

pub fn is_unit_interval(val: f64) -> bool {
    val >= 0.0 && val <= 1.0
}
