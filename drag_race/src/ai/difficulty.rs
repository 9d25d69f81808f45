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
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use utils::numeric::{is_positive_finite, is_unit_interval};

use crate::error::{Error, ErrorKind, Result};

/// Metres of gap over which the rubber band reaches full strength
pub const RUBBER_BAND_GAP_SCALE: f64 = 50.0;
/// Shortest expected time (s) between the AI deciding to shift and shifting
pub const MIN_SHIFT_TIME: f64 = 0.01;

/// Indexed by `Difficulty as usize`
static REACTION_MODIFIERS: [f64; 4] = [1.5, 1.0, 0.7, 0.5];

#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard, Difficulty::Expert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert"
        }
    }

    /// Scale applied to the base reaction time at the start line
    pub fn reaction_modifier(&self) -> f64 {
        REACTION_MODIFIERS[*self as usize]
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        Difficulty::ALL.into_iter().find(|d| d.as_str() == lowered).ok_or_else(|| {
            Error::new(ErrorKind::InvalidDifficultyProfile, format!("unknown difficulty '{}'", s))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubberBand {
    pub strength: f64,
    /// Upper bound on the bonus, 0-1
    pub max_bonus: f64,
    /// Gap (m) the AI must be behind by before the band kicks in
    pub activation_gap: f64
}

impl Default for RubberBand {
    fn default() -> Self {
        RubberBand {
            strength: 0.2,
            max_bonus: 0.3,
            activation_gap: 10.0
        }
    }
}

impl RubberBand {
    /// Catch-up bonus for an AI that is `gap` metres behind its opponent
    pub fn bonus(&self, gap: f64) -> f64 {
        if gap.is_nan() || gap < self.activation_gap {
            return 0.0;
        }
        (gap / RUBBER_BAND_GAP_SCALE * self.strength).max(0.0).min(self.max_bonus.max(0.0))
    }
}

/// Tuning for the AI driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Seconds from the start signal to launch before the difficulty modifier
    pub base_reaction_time: f64,
    pub shift_rpm_threshold: f64,
    /// Mean seconds the AI takes to shift once past the threshold
    pub base_shift_speed: f64,
    #[serde(default)]
    pub rubber_band: RubberBand
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        DifficultyProfile {
            base_reaction_time: 0.3,
            shift_rpm_threshold: 6500.0,
            base_shift_speed: 0.25,
            rubber_band: RubberBand::default()
        }
    }
}

impl DifficultyProfile {
    pub fn from_toml_str(data: &str) -> Result<DifficultyProfile> {
        let profile: DifficultyProfile = toml::from_str(data)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |details: String| Err(Error::new(ErrorKind::InvalidDifficultyProfile, details));
        if !(self.base_reaction_time.is_finite() && self.base_reaction_time >= 0.0) {
            return invalid(format!("base reaction time must be >= 0, got {}", self.base_reaction_time));
        }
        if !is_positive_finite(self.shift_rpm_threshold) {
            return invalid(format!("shift rpm threshold must be > 0, got {}", self.shift_rpm_threshold));
        }
        if !is_positive_finite(self.base_shift_speed) {
            return invalid(format!("base shift speed must be > 0, got {}", self.base_shift_speed));
        }
        let band = &self.rubber_band;
        if !(band.strength.is_finite() && band.strength >= 0.0) {
            return invalid(format!("rubber band strength must be >= 0, got {}", band.strength));
        }
        if !is_unit_interval(band.max_bonus) {
            return invalid(format!("rubber band max bonus must be within 0-1, got {}", band.max_bonus));
        }
        if !band.activation_gap.is_finite() {
            return invalid(format!("rubber band activation gap must be finite, got {}", band.activation_gap));
        }
        Ok(())
    }

    pub fn reaction_time(&self, difficulty: Difficulty) -> f64 {
        self.base_reaction_time * difficulty.reaction_modifier()
    }

    /// Chance of shifting up during a tick of `dt` seconds
    pub fn shift_probability(&self, dt: f64, bonus: f64) -> f64 {
        dt / (self.base_shift_speed * (1.0 - bonus)).max(MIN_SHIFT_TIME)
    }
}
