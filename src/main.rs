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

mod batch;
mod driver;
mod error;
mod records;
mod session;
mod settings;

use std::env;
use tracing::{error, info};

use drag_race::race::{CompetitorResult, RaceResult};
use drag_race::vehicle::DrivetrainModel;
use utils::numeric::round_float_to;
use utils::units::{kw_to_bhp, mps_to_kmh, watts_to_kw};

use crate::batch::BatchSummary;
use crate::error::AppError;
use crate::records::BestTimes;
use crate::session::RaceSession;
use crate::settings::GlobalSettings;

const BATCH_ARG: &'static str = "batch";

fn init_logging() {
    match env::current_dir() {
        Ok(current_dir) => {
            let file_appender = tracing_appender::rolling::never(current_dir, "drag_strip.log");
            let subscriber = tracing_subscriber::fmt()
                .with_writer(file_appender)
                .with_ansi(false)
                .compact()
                .finish();
            match tracing::subscriber::set_global_default(subscriber) {
                Ok(_) => {
                    info!("Logging initialised");
                }
                Err(e) => {
                    eprintln!("Failed to init logging. {}", e.to_string());
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to init logging. Couldn't determine current dir {}", e.to_string());
        }
    }
}

/// `drag-strip` runs one race, `drag-strip N` runs N and `drag-strip batch`
/// runs the configured batch size
fn parse_runs(arg: Option<&str>, batch_size: u64) -> Result<u64, AppError> {
    match arg {
        None => Ok(1),
        Some(BATCH_ARG) => Ok(batch_size.max(1)),
        Some(a) => match a.parse::<u64>() {
            Ok(0) | Err(_) => Err(AppError::InvalidArgument(a.to_string())),
            Ok(runs) => Ok(runs)
        }
    }
}

fn format_competitor(label: &str, result: &CompetitorResult) -> String {
    let time = match result.finish_time {
        Some(t) => format!("{:.3}s", t),
        None => format!("DNF ({:.1}m)", result.distance)
    };
    format!("{:<10}{:<16}{} km/h", label, time, round_float_to(mps_to_kmh(result.final_speed), 1))
}

fn describe_result(session: &RaceSession, result: &RaceResult) -> String {
    let mut lines = vec![format!("{} vs {} ({}) over {}m",
                                 session.player_spec().name,
                                 session.opponent_spec().name,
                                 session.difficulty(),
                                 result.race_distance)];
    lines.push(match (&result.winner, result.margin) {
        (Some(winner), Some(margin)) => format!("Winner: {} by {:.3}s", winner, margin),
        (Some(winner), None) => format!("Winner: {}", winner),
        (None, _) => "No winner".to_string()
    });
    if result.aborted {
        lines.push("Race aborted".to_string());
    }
    lines.push(format_competitor("Player", &result.player));
    lines.push(format_competitor("Opponent", &result.opponent));

    let spec = session.player_spec();
    if let Some((rpm, watts)) = spec.peak_power() {
        let top_speed = DrivetrainModel::new(spec).top_speed();
        lines.push(format!("{}: {} bhp @ {}rpm, {} km/h geared top speed",
                           spec.name,
                           round_float_to(kw_to_bhp(watts_to_kw(watts)), 0),
                           rpm,
                           round_float_to(mps_to_kmh(top_speed), 1)));
    }
    lines.join("\n")
}

fn main() -> Result<(), AppError> {
    init_logging();

    let settings = match GlobalSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings, using defaults. {}", e.to_string());
            GlobalSettings::default()
        }
    };
    let arg = env::args().nth(1);
    let runs = parse_runs(arg.as_deref(), settings.batch_size())?;
    let session = RaceSession::from_settings(&settings)?;
    let seed = settings.seed().unwrap_or_else(rand::random);
    info!("Running {} race(s) from seed {}", runs, seed);
    let results = session.run_batch(runs, seed)?;

    match results.as_slice() {
        [single] => println!("{}", describe_result(&session, single)),
        _ => match BatchSummary::from_results(&results) {
            Some(summary) => println!("{}", summary),
            None => println!("The player didn't finish any of the {} races", results.len())
        }
    }

    let records_path = settings.records_path();
    match BestTimes::load(&records_path) {
        Ok(mut best_times) => {
            let mut improved = false;
            for result in results.iter() {
                improved |= best_times.submit(result, &session.player_spec().name);
            }
            if improved {
                if let Some(best) = best_times.best_for(session.race_distance()) {
                    println!("New best time over {}m: {:.3}s", session.race_distance(), best.time);
                }
                best_times.save(&records_path).unwrap_or_else(|e| {
                    error!("Failed to save records to {}. {}", records_path.display(), e.to_string())
                });
            }
        }
        Err(e) => {
            error!("Failed to load records from {}. {}", records_path.display(), e.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use drag_race::ai::{Difficulty, DifficultyProfile};
    use drag_race::vehicle::VehicleSpec;
    use crate::error::AppError;
    use crate::session::RaceSession;
    use crate::{describe_result, parse_runs};

    #[test]
    fn run_count_arguments() {
        assert_eq!(parse_runs(None, 50).unwrap(), 1);
        assert_eq!(parse_runs(Some("batch"), 50).unwrap(), 50);
        assert_eq!(parse_runs(Some("12"), 50).unwrap(), 12);
        assert!(matches!(parse_runs(Some("0"), 50), Err(AppError::InvalidArgument(_))));
        assert!(matches!(parse_runs(Some("lots"), 50), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn result_description() {
        let session = RaceSession::new(VehicleSpec::reference_sedan(),
                                       VehicleSpec::reference_sedan(),
                                       DifficultyProfile::default(),
                                       Difficulty::Medium,
                                       402.0,
                                       60.0,
                                       6800.0).unwrap();
        let result = session.run(5).unwrap();
        let description = describe_result(&session, &result);
        assert!(description.starts_with("Reference Sedan vs Reference Sedan (medium) over 402m"));
        assert!(description.contains("Winner: "));
        assert!(description.contains("Player"));
        assert!(description.contains("bhp @ 7000rpm"));
        assert!(!description.contains("aborted"));
    }
}
