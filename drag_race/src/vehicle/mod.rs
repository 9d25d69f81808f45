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

pub mod curve;
pub mod drivetrain;
pub mod simulation;

use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::info;
use utils::numeric::{is_positive_finite, is_unit_interval};

use crate::error::{Error, ErrorKind, Result};
pub use curve::EngineCurve;
pub use drivetrain::DrivetrainModel;
pub use simulation::VehicleSimulation;

pub const GRAVITY: f64 = 9.81; // m/s^2
pub const AIR_DENSITY: f64 = 1.225; // kg/m^3 at sea level
pub const ROLLING_RESISTANCE_COEFFICIENT: f64 = 0.015;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NitroSpec {
    /// Extra engine power in W while boosting
    pub power_boost: f64,
    #[serde(default = "NitroSpec::default_torque_multiplier")]
    pub torque_multiplier: f64,
    /// Seconds of boost a full charge provides
    #[serde(default = "NitroSpec::default_burn_time")]
    pub burn_time: f64
}

impl NitroSpec {
    pub const DEFAULT_TORQUE_MULTIPLIER: f64 = 1.3;
    pub const DEFAULT_BURN_TIME: f64 = 3.0;

    fn default_torque_multiplier() -> f64 {
        NitroSpec::DEFAULT_TORQUE_MULTIPLIER
    }

    fn default_burn_time() -> f64 {
        NitroSpec::DEFAULT_BURN_TIME
    }
}

/// Immutable description of a car. Shared read-only between simulations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub name: String,
    /// kg
    pub weight: f64,
    /// 0-1
    pub grip_coefficient: f64,
    /// 0-1, higher means less drag
    pub aerodynamic_efficiency: f64,
    /// m^2
    #[serde(default = "VehicleSpec::default_frontal_area")]
    pub frontal_area: f64,
    /// m
    #[serde(default = "VehicleSpec::default_wheel_radius")]
    pub wheel_radius: f64,
    pub idle_rpm: f64,
    pub max_rpm: f64,
    pub redline_rpm: f64,
    pub gear_count: usize,
    pub gear_ratios: Vec<f64>,
    pub final_drive_ratio: f64,
    /// Nm by rpm
    pub torque_curve: EngineCurve,
    /// W by rpm. Derived from the torque curve when absent
    #[serde(default)]
    pub power_curve: Option<EngineCurve>,
    #[serde(default)]
    pub nitro: Option<NitroSpec>
}

impl VehicleSpec {
    pub const DEFAULT_FRONTAL_AREA: f64 = 2.0;
    pub const DEFAULT_WHEEL_RADIUS: f64 = 0.3;

    fn default_frontal_area() -> f64 {
        VehicleSpec::DEFAULT_FRONTAL_AREA
    }

    fn default_wheel_radius() -> f64 {
        VehicleSpec::DEFAULT_WHEEL_RADIUS
    }

    pub fn from_toml_str(data: &str) -> Result<VehicleSpec> {
        let spec: VehicleSpec = toml::from_str(data)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn load_from_path(path: &Path) -> Result<VehicleSpec> {
        let data = fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::IOError,
                       format!("Couldn't read vehicle spec {}. {}", path.display(), err.to_string()))
        })?;
        let spec = VehicleSpec::from_toml_str(&data)?;
        info!("Loaded vehicle spec '{}' from {}", spec.name, path.display());
        Ok(spec)
    }

    /// A mid-weight rear wheel drive sedan used when no spec file is configured
    pub fn reference_sedan() -> VehicleSpec {
        VehicleSpec {
            name: "Reference Sedan".to_string(),
            weight: 1200.0,
            grip_coefficient: 0.8,
            aerodynamic_efficiency: 0.7,
            frontal_area: VehicleSpec::DEFAULT_FRONTAL_AREA,
            wheel_radius: VehicleSpec::DEFAULT_WHEEL_RADIUS,
            idle_rpm: 900.0,
            max_rpm: 7500.0,
            redline_rpm: 7000.0,
            gear_count: 5,
            gear_ratios: vec![3.5, 2.2, 1.5, 1.1, 0.9],
            final_drive_ratio: 3.7,
            torque_curve: EngineCurve::new(vec![
                (1000.0, 180.0),
                (2000.0, 250.0),
                (3000.0, 320.0),
                (4000.0, 380.0),
                (5000.0, 400.0),
                (6000.0, 370.0),
                (7000.0, 320.0),
                (7500.0, 280.0)
            ]),
            power_curve: None,
            nitro: Some(NitroSpec {
                power_boost: 50000.0,
                torque_multiplier: NitroSpec::DEFAULT_TORQUE_MULTIPLIER,
                burn_time: NitroSpec::DEFAULT_BURN_TIME
            })
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |details: String| Err(Error::new(ErrorKind::InvalidVehicleSpec,
                                                       format!("{}: {}", self.name, details)));
        if !is_positive_finite(self.weight) {
            return invalid(format!("weight must be > 0, got {}", self.weight));
        }
        if !is_unit_interval(self.grip_coefficient) {
            return invalid(format!("grip coefficient must be within 0-1, got {}", self.grip_coefficient));
        }
        if !is_unit_interval(self.aerodynamic_efficiency) {
            return invalid(format!("aerodynamic efficiency must be within 0-1, got {}", self.aerodynamic_efficiency));
        }
        if !is_positive_finite(self.frontal_area) {
            return invalid(format!("frontal area must be > 0, got {}", self.frontal_area));
        }
        if !is_positive_finite(self.wheel_radius) {
            return invalid(format!("wheel radius must be > 0, got {}", self.wheel_radius));
        }
        if !(self.idle_rpm.is_finite() && self.max_rpm.is_finite() && self.redline_rpm.is_finite()) ||
            self.idle_rpm < 0.0 || self.idle_rpm >= self.redline_rpm || self.redline_rpm > self.max_rpm {
            return invalid(format!("rpm range must satisfy idle < redline <= max, got {}/{}/{}",
                                   self.idle_rpm, self.redline_rpm, self.max_rpm));
        }
        if self.gear_count == 0 {
            return invalid("at least one forward gear is required".to_string());
        }
        if self.gear_ratios.len() != self.gear_count {
            return Err(Error::new(ErrorKind::GearCountMismatch,
                                  format!("{}: gear count is {} but {} ratios were provided",
                                          self.name, self.gear_count, self.gear_ratios.len())));
        }
        if let Some((idx, ratio)) = self.gear_ratios.iter().enumerate().find(|(_, r)| !is_positive_finite(**r)) {
            return invalid(format!("gear {} ratio must be > 0, got {}", idx + 1, ratio));
        }
        if !is_positive_finite(self.final_drive_ratio) {
            return invalid(format!("final drive ratio must be > 0, got {}", self.final_drive_ratio));
        }
        if self.torque_curve.is_empty() {
            return invalid("torque curve is empty".to_string());
        }
        if let Some(power_curve) = &self.power_curve {
            if power_curve.is_empty() {
                return invalid("power curve is empty".to_string());
            }
        }
        if let Some(nitro) = &self.nitro {
            if !(nitro.power_boost.is_finite() && nitro.power_boost >= 0.0) {
                return invalid(format!("nitro power boost must be >= 0, got {}", nitro.power_boost));
            }
            if !is_positive_finite(nitro.torque_multiplier) {
                return invalid(format!("nitro torque multiplier must be > 0, got {}", nitro.torque_multiplier));
            }
            if !is_positive_finite(nitro.burn_time) {
                return invalid(format!("nitro burn time must be > 0, got {}", nitro.burn_time));
            }
        }
        Ok(())
    }

    pub fn has_nitro(&self) -> bool {
        self.nitro.is_some()
    }

    /// The most force the tyres can put down before slipping (N)
    pub fn max_traction_force(&self) -> f64 {
        self.grip_coefficient * self.weight * GRAVITY
    }

    pub fn drag_force_at(&self, speed: f64) -> f64 {
        0.5 * AIR_DENSITY * speed.powi(2) * (1.0 - self.aerodynamic_efficiency) * self.frontal_area
    }

    pub fn rolling_resistance_force(&self) -> f64 {
        ROLLING_RESISTANCE_COEFFICIENT * self.weight * GRAVITY
    }

    /// (rpm, W) at peak power, from the power curve if given
    pub fn peak_power(&self) -> Option<(f64, f64)> {
        match &self.power_curve {
            Some(curve) => curve.peak(),
            None => EngineCurve::power_from_torque(&self.torque_curve).peak()
        }
    }
}

/// Snapshot of one vehicle during a race.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VehicleState {
    /// m/s, never negative
    pub speed: f64,
    pub rpm: f64,
    /// 0 is neutral, 1..=gear_count are the forward gears
    pub gear: usize,
    /// m
    pub distance: f64,
    /// 0-1
    pub nitro_charge: f64,
    pub nitro_engaged: bool,
    /// Force put down at the road on the last tick (N)
    pub traction_force: f64,
    /// Engine power on the last tick (W)
    pub engine_power: f64,
    /// Race clock (s)
    pub elapsed: f64
}

impl VehicleState {
    pub fn on_the_line(spec: &VehicleSpec) -> VehicleState {
        VehicleState {
            rpm: spec.idle_rpm,
            nitro_charge: if spec.has_nitro() { 1.0 } else { 0.0 },
            ..VehicleState::default()
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.gear == 0
    }
}
