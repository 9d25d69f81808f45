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

pub fn kw_to_bhp(power_kw: f64) -> f64 {
    power_kw * 1.341
}

pub fn watts_to_kw(power_w: f64) -> f64 {
    power_w / 1000.0
}

pub fn calculate_power_kw(rpm: f64, torque: f64) -> f64 {
    (torque * rpm * 2.0 * std::f64::consts::PI) / (60.0 * 1000.0)
}

pub fn mps_to_kmh(speed: f64) -> f64 {
    speed * 3.6
}

#[cfg(test)]
mod tests {
    use crate::units::{calculate_power_kw, kw_to_bhp, mps_to_kmh, watts_to_kw};

    #[test]
    fn power_from_torque() {
        // 1 Nm at 60000 rpm is 2π kW
        let kw = calculate_power_kw(60000.0, 1.0);
        assert!((kw - 2.0 * std::f64::consts::PI).abs() < 1e-9);
        assert_eq!(calculate_power_kw(0.0, 400.0), 0.0);
    }

    #[test]
    fn conversions() {
        assert!((kw_to_bhp(100.0) - 134.1).abs() < 1e-9);
        assert_eq!(watts_to_kw(1500.0), 1.5);
        assert!((mps_to_kmh(10.0) - 36.0).abs() < 1e-9);
    }
}
