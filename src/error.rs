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

use crate::records::RecordsError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("race error. `{0}`")]
    RaceError(#[from] drag_race::Error),
    #[error("records error. `{0}`")]
    RecordsError(#[from] RecordsError),
    #[error("settings error. `{0}`")]
    SettingsError(#[from] config::ConfigError),
    #[error("invalid setting `{0}`. `{1}`")]
    InvalidSetting(String, String),
    #[error("invalid argument `{0}`")]
    InvalidArgument(String),
    #[error("race with seed {0} was never started")]
    RaceNotStarted(u64)
}
