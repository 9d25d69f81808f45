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

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use utils::units::calculate_power_kw;

/// An RPM keyed lookup table for engine output (torque in Nm or power in W).
///
/// Points are kept sorted by RPM with duplicate RPM entries dropped (the first
/// one wins). Lookups between points are linearly interpolated and lookups
/// outside the table saturate at the first/last point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct EngineCurve {
    points: Vec<(f64, f64)>
}

impl EngineCurve {
    pub fn new(points: Vec<(f64, f64)>) -> EngineCurve {
        let points = points.into_iter()
            .filter(|(rpm, val)| rpm.is_finite() && val.is_finite())
            .sorted_by(|a, b| a.0.total_cmp(&b.0))
            .dedup_by(|a, b| a.0 == b.0)
            .collect();
        EngineCurve { points }
    }

    /// Build a power curve (W) from a torque curve (Nm) using P = T·ω
    pub fn power_from_torque(torque_curve: &EngineCurve) -> EngineCurve {
        EngineCurve {
            points: torque_curve.points.iter().map(|(rpm, torque)| {
                (*rpm, calculate_power_kw(*rpm, *torque) * 1000.0)
            }).collect()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn num_entries(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn min_rpm(&self) -> Option<f64> {
        self.points.first().map(|(rpm, _)| *rpm)
    }

    pub fn max_rpm(&self) -> Option<f64> {
        self.points.last().map(|(rpm, _)| *rpm)
    }

    /// The (rpm, value) point with the highest value
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.points.iter().copied().max_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn value_at(&self, rpm: f64) -> f64 {
        let mut prev: Option<(f64, f64)> = None;
        for (point_rpm, point_val) in self.points.iter().copied() {
            if point_rpm >= rpm {
                return match prev {
                    _ if point_rpm == rpm => point_val,
                    None => point_val,
                    Some((prev_rpm, prev_val)) => {
                        let slope = (point_val - prev_val) / (point_rpm - prev_rpm);
                        prev_val + slope * (rpm - prev_rpm)
                    }
                };
            }
            prev = Some((point_rpm, point_val));
        }
        // Past the end of the table (or NaN input); hold the last value
        prev.map(|(_, val)| val).unwrap_or(0.0)
    }
}

impl From<Vec<(f64, f64)>> for EngineCurve {
    fn from(points: Vec<(f64, f64)>) -> Self {
        EngineCurve::new(points)
    }
}

impl From<EngineCurve> for Vec<(f64, f64)> {
    fn from(curve: EngineCurve) -> Self {
        curve.points
    }
}

#[cfg(test)]
mod tests {
    use crate::vehicle::curve::EngineCurve;

    fn torque_curve() -> EngineCurve {
        EngineCurve::new(vec![(3000.0, 250.0), (1000.0, 30.0), (2000.0, 100.0), (4000.0, 200.0), (5000.0, 140.0)])
    }

    #[test]
    fn points_are_sorted() {
        let curve = torque_curve();
        let rpms: Vec<f64> = curve.points().iter().map(|(rpm, _)| *rpm).collect();
        assert_eq!(rpms, vec![1000.0, 2000.0, 3000.0, 4000.0, 5000.0]);
        assert_eq!(curve.min_rpm(), Some(1000.0));
        assert_eq!(curve.max_rpm(), Some(5000.0));
    }

    #[test]
    fn duplicate_and_non_finite_points_dropped() {
        let curve = EngineCurve::new(vec![(1000.0, 10.0), (1000.0, 99.0), (f64::NAN, 5.0), (2000.0, f64::INFINITY)]);
        assert_eq!(curve.points(), &[(1000.0, 10.0)]);
    }

    #[test]
    fn interpolates_between_points() {
        let curve = torque_curve();
        assert_eq!(curve.value_at(2000.0), 100.0);
        assert!((curve.value_at(2500.0) - 175.0).abs() < 1e-9);
        assert!((curve.value_at(4500.0) - 170.0).abs() < 1e-9);
    }

    #[test]
    fn saturates_outside_table() {
        let curve = torque_curve();
        assert_eq!(curve.value_at(0.0), 30.0);
        assert_eq!(curve.value_at(-100.0), 30.0);
        assert_eq!(curve.value_at(9000.0), 140.0);
        assert_eq!(EngineCurve::new(Vec::new()).value_at(3000.0), 0.0);
    }

    #[test]
    fn peak_value() {
        assert_eq!(torque_curve().peak(), Some((3000.0, 250.0)));
        assert_eq!(EngineCurve::new(Vec::new()).peak(), None);
    }

    #[test]
    fn power_derived_from_torque() {
        let power = EngineCurve::power_from_torque(&torque_curve());
        // 250Nm @ 3000rpm ~= 78.54kW
        let (rpm, watts) = power.points()[2];
        assert_eq!(rpm, 3000.0);
        assert!((watts - 78539.816).abs() < 0.01);
    }
}
