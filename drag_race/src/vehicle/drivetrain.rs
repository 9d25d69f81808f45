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

use utils::units::calculate_power_kw;
use crate::vehicle::VehicleSpec;

/// Rate (1/s) at which engine speed falls back to idle in neutral
pub const NEUTRAL_RPM_DECAY_RATE: f64 = 5.0;

/// Stateless engine and gearing calculations for a single vehicle spec.
///
/// Gears are numbered from 1; gear 0 is neutral. Every RPM this returns is
/// within [idle_rpm, max_rpm] and nothing here panics on bad input.
#[derive(Debug, Clone, Copy)]
pub struct DrivetrainModel<'a> {
    spec: &'a VehicleSpec
}

impl<'a> DrivetrainModel<'a> {
    pub fn new(spec: &'a VehicleSpec) -> DrivetrainModel<'a> {
        DrivetrainModel { spec }
    }

    pub fn min_rpm(&self) -> f64 {
        self.spec.idle_rpm
    }

    pub fn max_rpm(&self) -> f64 {
        self.spec.max_rpm
    }

    pub fn max_gear(&self) -> usize {
        self.spec.gear_ratios.len()
    }

    pub fn clamp_rpm(&self, rpm: f64) -> f64 {
        if rpm.is_nan() {
            return self.min_rpm();
        }
        rpm.clamp(self.min_rpm(), self.max_rpm())
    }

    /// Engine power in W
    pub fn power_at_rpm(&self, rpm: f64) -> f64 {
        let rpm = self.clamp_rpm(rpm);
        match &self.spec.power_curve {
            Some(curve) => curve.value_at(rpm),
            None => calculate_power_kw(rpm, self.spec.torque_curve.value_at(rpm)) * 1000.0
        }
    }

    /// Engine torque in Nm
    pub fn torque_at_rpm(&self, rpm: f64) -> f64 {
        self.spec.torque_curve.value_at(self.clamp_rpm(rpm))
    }

    pub fn gear_ratio(&self, gear: usize) -> Option<f64> {
        match gear {
            0 => None,
            g => self.spec.gear_ratios.get(g - 1).copied()
        }
    }

    /// Torque at the driven wheels for the given engine torque. Zero in neutral.
    pub fn wheel_torque(&self, engine_torque: f64, gear: usize) -> f64 {
        match self.gear_ratio(gear) {
            Some(ratio) => engine_torque * ratio * self.spec.final_drive_ratio,
            None => 0.0
        }
    }

    /// Engine speed for a road speed (m/s) in the given gear.
    ///
    /// Neutral decouples the wheels from the engine so idle is returned there;
    /// use [`DrivetrainModel::rpm_from_neutral_decay`] to ease towards it.
    pub fn rpm_from_speed(&self, speed: f64, gear: usize) -> f64 {
        let ratio = match self.gear_ratio(gear) {
            Some(r) => r,
            None => return self.min_rpm()
        };
        let speed = if speed.is_nan() { 0.0 } else { speed.max(0.0) };
        let wheel_revs_per_sec = speed / (2.0 * std::f64::consts::PI * self.spec.wheel_radius);
        self.clamp_rpm(wheel_revs_per_sec * ratio * self.spec.final_drive_ratio * 60.0)
    }

    /// Blend the current engine speed towards idle over `dt` seconds
    pub fn rpm_from_neutral_decay(&self, current_rpm: f64, dt: f64) -> f64 {
        let current_rpm = self.clamp_rpm(current_rpm);
        let dt = if dt.is_nan() { 0.0 } else { dt.max(0.0) };
        let blend = 1.0 - (-NEUTRAL_RPM_DECAY_RATE * dt).exp();
        self.clamp_rpm(current_rpm + (self.min_rpm() - current_rpm) * blend)
    }

    /// Road speed (m/s) at max rpm in the given gear
    pub fn max_speed_for_gear(&self, gear: usize) -> Option<f64> {
        let ratio = self.gear_ratio(gear)?;
        Some((self.max_rpm() * 2.0 * std::f64::consts::PI * self.spec.wheel_radius) /
            (60.0 * ratio * self.spec.final_drive_ratio))
    }

    /// The highest geared speed (m/s) across all gears. Ignores drag.
    pub fn top_speed(&self) -> f64 {
        (1..=self.max_gear())
            .filter_map(|gear| self.max_speed_for_gear(gear))
            .fold(0.0, f64::max)
    }
}
