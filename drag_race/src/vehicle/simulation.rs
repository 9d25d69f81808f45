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

use std::sync::Arc;
use tracing::{debug, info, warn};
use utils::numeric::{clamp_unit, is_positive_finite};

use crate::error::Result;
use crate::events::{ObserverList, VehicleEvent, VehicleObserver};
use crate::race::progress::RaceProgress;
use crate::vehicle::{DrivetrainModel, VehicleSpec, VehicleState};

/// Maximum road speed (m/s) at which launch control can engage
pub const LAUNCH_CONTROL_MAX_SPEED: f64 = 1.0;
/// Fraction of redline launch control holds the engine at
pub const LAUNCH_CONTROL_REDLINE_FRACTION: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Traction {
    force: f64,
    power: f64
}

/// Longitudinal simulation of a single vehicle over a race.
///
/// Owns the vehicle state and race progress; the VehicleSpec is shared read-only.
/// `tick` is the only integrator and never fails, bad input is clamped or
/// ignored instead.
#[derive(Debug)]
pub struct VehicleSimulation {
    spec: Arc<VehicleSpec>,
    state: VehicleState,
    progress: RaceProgress,
    observers: ObserverList
}

impl VehicleSimulation {
    pub fn new(spec: Arc<VehicleSpec>) -> VehicleSimulation {
        let state = VehicleState::on_the_line(&spec);
        VehicleSimulation {
            spec,
            state,
            progress: RaceProgress::new(),
            observers: ObserverList::new()
        }
    }

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn progress(&self) -> &RaceProgress {
        &self.progress
    }

    pub fn drivetrain(&self) -> DrivetrainModel<'_> {
        DrivetrainModel::new(&self.spec)
    }

    pub fn is_racing(&self) -> bool {
        self.progress.is_racing()
    }

    pub fn is_finished(&self) -> bool {
        self.progress.is_finished()
    }

    pub fn subscribe(&mut self, observer: Box<dyn VehicleObserver>) {
        self.observers.subscribe(observer);
    }

    /// Put the car on the line and start the clock. Nothing changes if the
    /// spec or distance is invalid.
    pub fn start_race(&mut self, race_distance: f64) -> Result<()> {
        if let Err(e) = self.spec.validate() {
            warn!("Refusing to start race. {}", e.to_string());
            return Err(e);
        }
        if let Err(e) = self.progress.start(race_distance) {
            warn!("Refusing to start race for {}. {}", self.spec.name, e.to_string());
            return Err(e);
        }
        self.state = VehicleState::on_the_line(&self.spec);
        info!("{} started a {}m race", self.spec.name, race_distance);
        Ok(())
    }

    pub fn stop_race(&mut self) {
        if self.progress.is_racing() {
            debug!("{} stopped at {:.1}m", self.spec.name, self.state.distance);
        }
        self.progress.stop();
    }

    pub fn traction_force(&self, throttle: f64) -> f64 {
        self.traction(clamp_unit(throttle)).force
    }

    fn nitro_boosting(&self, throttle: f64) -> bool {
        self.spec.nitro.is_some() &&
            self.state.nitro_engaged &&
            self.state.nitro_charge > 0.0 &&
            throttle >= 1.0
    }

    fn traction(&self, throttle: f64) -> Traction {
        if self.state.is_neutral() {
            return Traction::default();
        }
        let model = DrivetrainModel::new(&self.spec);
        let mut power = model.power_at_rpm(self.state.rpm);
        let mut torque = model.torque_at_rpm(self.state.rpm);
        if self.nitro_boosting(throttle) {
            if let Some(nitro) = &self.spec.nitro {
                power += nitro.power_boost;
                torque *= nitro.torque_multiplier;
            }
        }
        let requested = model.wheel_torque(torque, self.state.gear) / self.spec.wheel_radius * throttle;
        // Tyres can't put down more than the grip allows however much the engine makes
        let max_traction = self.spec.max_traction_force();
        Traction {
            force: requested.clamp(-max_traction, max_traction),
            power: power * throttle
        }
    }

    /// Advance the vehicle by `dt` seconds with the given throttle (0-1).
    ///
    /// Does nothing unless racing or when `dt` isn't a positive number.
    pub fn tick(&mut self, dt: f64, throttle: f64) {
        if !self.progress.is_racing() || !is_positive_finite(dt) {
            return;
        }
        let throttle = clamp_unit(throttle);
        let boosting = self.nitro_boosting(throttle);
        let traction = self.traction(throttle);

        let drag_force = self.spec.drag_force_at(self.state.speed);
        let rolling_force = self.spec.rolling_resistance_force();
        let acceleration = (traction.force - drag_force - rolling_force) / self.spec.weight;

        let distance_before = self.state.distance;
        self.state.speed = (self.state.speed + acceleration * dt).max(0.0);
        self.state.distance += self.state.speed * dt;

        let model = DrivetrainModel::new(&self.spec);
        self.state.rpm = match self.state.gear {
            0 => model.rpm_from_neutral_decay(self.state.rpm, dt),
            gear => model.rpm_from_speed(self.state.speed, gear)
        };

        if boosting {
            if let Some(nitro) = &self.spec.nitro {
                self.state.nitro_charge = (self.state.nitro_charge - dt / nitro.burn_time).max(0.0);
                if self.state.nitro_charge <= 0.0 {
                    self.state.nitro_engaged = false;
                    debug!("{} nitro spent at {:.1}m", self.spec.name, self.state.distance);
                }
            }
        }
        self.state.traction_force = traction.force;
        self.state.engine_power = traction.power;

        if self.progress.advance(dt, distance_before, self.state.distance) {
            info!("{} finished {}m in {:.3}s at {:.1}m/s",
                  self.spec.name,
                  self.progress.race_distance(),
                  self.progress.finish_time().unwrap_or(self.progress.elapsed()),
                  self.state.speed);
        }
        self.state.elapsed = self.progress.elapsed();
        self.observers.broadcast(&VehicleEvent::StateChanged(self.state));
    }

    /// Returns true if the gear changed
    pub fn shift_up(&mut self) -> bool {
        if self.state.gear >= self.spec.gear_ratios.len() {
            return false;
        }
        self.set_gear(self.state.gear + 1);
        true
    }

    /// Returns true if the gear changed
    pub fn shift_down(&mut self) -> bool {
        if self.state.gear == 0 {
            return false;
        }
        self.set_gear(self.state.gear - 1);
        true
    }

    fn set_gear(&mut self, gear: usize) {
        debug!("{} shifted {} -> {} at {:.0}rpm", self.spec.name, self.state.gear, gear, self.state.rpm);
        self.state.gear = gear;
        self.observers.broadcast(&VehicleEvent::GearChanged { gear });
    }

    /// Drop the clutch from neutral into first with the engine held near
    /// redline. Only allowed from (almost) standstill in neutral.
    pub fn launch_control(&mut self) -> bool {
        if self.state.gear != 0 || self.state.speed >= LAUNCH_CONTROL_MAX_SPEED {
            debug!("{} launch control rejected in gear {} at {:.2}m/s",
                   self.spec.name, self.state.gear, self.state.speed);
            return false;
        }
        let launch_rpm = DrivetrainModel::new(&self.spec)
            .clamp_rpm(self.spec.redline_rpm * LAUNCH_CONTROL_REDLINE_FRACTION);
        self.state.rpm = launch_rpm;
        self.set_gear(1);
        true
    }

    /// Arm the nitro. Boost is applied on ticks at full throttle until the
    /// charge runs out.
    pub fn activate_nitro(&mut self) -> bool {
        if self.spec.nitro.is_none() || self.state.nitro_engaged || self.state.nitro_charge <= 0.0 {
            return false;
        }
        debug!("{} nitro engaged", self.spec.name);
        self.state.nitro_engaged = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;
    use crate::error::ErrorKind;
    use crate::events::{EventRecorder, VehicleEvent};
    use crate::race::progress::RaceState;
    use crate::vehicle::{EngineCurve, NitroSpec, VehicleSimulation, VehicleSpec};
    use crate::vehicle::simulation::LAUNCH_CONTROL_MAX_SPEED;

    const DT: f64 = 1.0 / 60.0;

    fn sedan() -> VehicleSimulation {
        VehicleSimulation::new(Arc::new(VehicleSpec::reference_sedan()))
    }

    fn racing_sedan(distance: f64) -> VehicleSimulation {
        let mut sim = sedan();
        sim.start_race(distance).unwrap();
        sim
    }

    /// Huge torque so the grip limit is always the binding constraint
    fn dragster_spec() -> VehicleSpec {
        let mut spec = VehicleSpec::reference_sedan();
        spec.name = "Dragster".to_string();
        spec.torque_curve = EngineCurve::new(vec![(1000.0, 2000.0), (7500.0, 3000.0)]);
        spec.nitro = Some(NitroSpec { power_boost: 500000.0, torque_multiplier: 3.0, burn_time: 100.0 });
        spec
    }

    #[test]
    fn tick_is_a_no_op_when_idle() {
        let mut sim = sedan();
        sim.shift_up();
        let before = *sim.state();
        sim.tick(DT, 1.0);
        assert_eq!(*sim.state(), before);
        assert_eq!(sim.progress().state(), RaceState::Idle);
    }

    #[test]
    fn start_race_resets_state() {
        let mut sim = racing_sedan(100.0);
        assert!(sim.launch_control());
        for _ in 0..60 {
            sim.tick(DT, 1.0);
        }
        sim.start_race(402.0).unwrap();
        let state = sim.state();
        assert_eq!(state.speed, 0.0);
        assert_eq!(state.distance, 0.0);
        assert_eq!(state.gear, 0);
        assert_eq!(state.rpm, sim.spec().idle_rpm);
        assert_eq!(state.nitro_charge, 1.0);
        assert_eq!(sim.progress().race_distance(), 402.0);
    }

    #[test]
    fn start_race_rejects_bad_configuration() {
        let mut spec = VehicleSpec::reference_sedan();
        spec.gear_ratios.pop();
        let mut sim = VehicleSimulation::new(Arc::new(spec));
        let err = sim.start_race(402.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GearCountMismatch);
        assert!(err.is_configuration_error());
        assert_eq!(sim.progress().state(), RaceState::Idle);

        let mut sim = sedan();
        assert_eq!(sim.start_race(0.0).unwrap_err().kind(), ErrorKind::InvalidRaceDistance);
        assert!(!sim.is_racing());
    }

    #[test]
    fn speed_never_negative_and_distance_never_decreases() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sim = racing_sedan(5000.0);
        let mut last_distance = 0.0;
        for _ in 0..5000 {
            match rng.gen_range(0..10) {
                0 => { sim.shift_up(); }
                1 => { sim.shift_down(); }
                2 => { sim.activate_nitro(); }
                _ => {}
            }
            let dt = rng.gen_range(-0.05..0.1);
            let throttle = rng.gen_range(-0.5..1.5);
            sim.tick(dt, throttle);
            let state = sim.state();
            assert!(state.speed >= 0.0);
            assert!(state.distance >= last_distance);
            last_distance = state.distance;
        }
    }

    #[test]
    fn negative_or_invalid_dt_is_ignored() {
        let mut sim = racing_sedan(402.0);
        sim.launch_control();
        sim.tick(DT, 1.0);
        let before = *sim.state();
        for dt in [-DT, 0.0, f64::NAN, f64::INFINITY] {
            sim.tick(dt, 1.0);
        }
        assert_eq!(*sim.state(), before);
    }

    #[test]
    fn traction_never_exceeds_grip() {
        let spec = Arc::new(dragster_spec());
        let max_traction = spec.max_traction_force();
        let mut sim = VehicleSimulation::new(spec);
        sim.start_race(10000.0).unwrap();
        assert!(sim.launch_control());
        assert!(sim.activate_nitro());
        for gear in 1..=5 {
            while sim.state().gear < gear {
                sim.shift_up();
            }
            for _ in 0..120 {
                for throttle in [0.0, 0.3, 0.99, 1.0, 5.0] {
                    assert!(sim.traction_force(throttle).abs() <= max_traction + 1e-9);
                }
                sim.tick(DT, 1.0);
                assert!(sim.state().traction_force.abs() <= max_traction + 1e-9);
            }
        }
        assert_eq!(sim.traction_force(1.0), max_traction);
    }

    #[test]
    fn neutral_puts_down_no_traction() {
        let sim = racing_sedan(402.0);
        assert_eq!(sim.traction_force(1.0), 0.0);
    }

    #[test]
    fn nitro_boosts_below_the_grip_limit() {
        let mut sim = racing_sedan(402.0);
        // Top gear at idle is nowhere near the grip limit
        for _ in 0..5 {
            sim.shift_up();
        }
        let normal = sim.traction_force(1.0);
        assert!(normal < sim.spec().max_traction_force());
        assert!(sim.activate_nitro());
        let boosted = sim.traction_force(1.0);
        assert!((boosted - normal * NitroSpec::DEFAULT_TORQUE_MULTIPLIER).abs() < 1e-6);
        // Only at full throttle
        assert_eq!(sim.traction_force(0.5), normal * 0.5);
    }

    #[test]
    fn nitro_drains_and_disengages() {
        let mut sim = racing_sedan(10000.0);
        sim.launch_control();
        assert!(sim.activate_nitro());
        assert!(!sim.activate_nitro());
        // Part throttle doesn't burn any
        sim.tick(DT, 0.5);
        assert_eq!(sim.state().nitro_charge, 1.0);
        let ticks = (NitroSpec::DEFAULT_BURN_TIME / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            sim.tick(DT, 1.0);
        }
        assert_eq!(sim.state().nitro_charge, 0.0);
        assert!(!sim.state().nitro_engaged);
        assert!(!sim.activate_nitro());
    }

    #[test]
    fn vehicle_without_nitro_cannot_engage() {
        let mut spec = VehicleSpec::reference_sedan();
        spec.nitro = None;
        let mut sim = VehicleSimulation::new(Arc::new(spec));
        sim.start_race(402.0).unwrap();
        assert_eq!(sim.state().nitro_charge, 0.0);
        assert!(!sim.activate_nitro());
    }

    #[test]
    fn shifting_is_clamped_to_gearbox() {
        let mut sim = sedan();
        let recorder = EventRecorder::new();
        sim.subscribe(Box::new(recorder.clone()));

        assert!(!sim.shift_down());
        assert_eq!(sim.state().gear, 0);
        assert!(recorder.is_empty());

        for _ in 0..5 {
            assert!(sim.shift_up());
        }
        let before = *sim.state();
        assert!(!sim.shift_up());
        assert_eq!(*sim.state(), before);
        assert_eq!(recorder.gear_changes(), vec![1, 2, 3, 4, 5]);

        assert!(sim.shift_down());
        assert_eq!(recorder.gear_changes(), vec![1, 2, 3, 4, 5, 4]);
    }

    #[test]
    fn launch_control_from_standstill() {
        let mut sim = racing_sedan(402.0);
        let recorder = EventRecorder::new();
        sim.subscribe(Box::new(recorder.clone()));
        assert!(sim.launch_control());
        assert_eq!(sim.state().gear, 1);
        assert_eq!(sim.state().rpm, 0.8 * sim.spec().redline_rpm);
        assert_eq!(recorder.events(), vec![VehicleEvent::GearChanged { gear: 1 }]);
        // Already in gear
        assert!(!sim.launch_control());
    }

    #[test]
    fn launch_control_rejected_when_rolling() {
        let mut sim = racing_sedan(402.0);
        sim.launch_control();
        while sim.state().speed < 2.0 {
            sim.tick(DT, 1.0);
        }
        sim.shift_down();
        assert_eq!(sim.state().gear, 0);
        let recorder = EventRecorder::new();
        sim.subscribe(Box::new(recorder.clone()));
        let before = *sim.state();
        assert!(!sim.launch_control());
        assert_eq!(*sim.state(), before);
        assert!(recorder.is_empty());
    }

    #[test]
    fn launch_control_speed_limit_is_exclusive() {
        let mut sim = racing_sedan(402.0);
        sim.state.speed = LAUNCH_CONTROL_MAX_SPEED;
        let before = *sim.state();
        assert!(!sim.launch_control());
        assert_eq!(*sim.state(), before);

        sim.state.speed = LAUNCH_CONTROL_MAX_SPEED - 0.01;
        assert!(sim.launch_control());
        assert_eq!(sim.state().gear, 1);
    }

    #[test]
    fn neutral_rpm_decays_smoothly() {
        let mut sim = racing_sedan(402.0);
        sim.launch_control();
        sim.shift_down();
        let launch_rpm = sim.state().rpm;
        sim.tick(DT, 0.0);
        let rpm = sim.state().rpm;
        assert!(rpm < launch_rpm);
        // One tick at 60Hz only closes ~8% of the gap to idle
        assert!(rpm > launch_rpm - 0.1 * (launch_rpm - sim.spec().idle_rpm));
    }

    #[test]
    fn quarter_mile_in_first_gear_finishes() {
        let mut sim = racing_sedan(402.0);
        assert_eq!(sim.spec().weight, 1200.0);
        assert_eq!(sim.spec().grip_coefficient, 0.8);
        sim.shift_up();
        let mut ticks = 0;
        while !sim.is_finished() && ticks < 20 * 60 {
            sim.tick(DT, 1.0);
            ticks += 1;
        }
        assert!(sim.is_finished(), "only reached {:.1}m", sim.state().distance);
        let finish = sim.progress().finish_time().unwrap();
        assert!(finish > 0.0 && finish < 20.0);
        assert!(sim.state().distance >= 402.0);
    }

    #[test]
    fn ticking_after_finish_changes_nothing() {
        let mut sim = racing_sedan(50.0);
        sim.launch_control();
        while !sim.is_finished() {
            sim.tick(DT, 1.0);
        }
        let recorder = EventRecorder::new();
        sim.subscribe(Box::new(recorder.clone()));
        let state = *sim.state();
        let progress = sim.progress().clone();
        for _ in 0..100 {
            sim.tick(DT, 1.0);
        }
        assert_eq!(*sim.state(), state);
        assert_eq!(*sim.progress(), progress);
        assert!(recorder.is_empty());
    }

    #[test]
    fn state_change_sent_every_tick() {
        let mut sim = racing_sedan(402.0);
        let recorder = EventRecorder::new();
        sim.subscribe(Box::new(recorder.clone()));
        sim.launch_control();
        for _ in 0..10 {
            sim.tick(DT, 1.0);
        }
        let events = recorder.events();
        assert_eq!(events.len(), 11);
        match events.last() {
            Some(VehicleEvent::StateChanged(state)) => assert_eq!(state, sim.state()),
            other => panic!("unexpected last event {:?}", other)
        }
    }

    #[test]
    fn stop_race_halts_ticking() {
        let mut sim = racing_sedan(402.0);
        sim.launch_control();
        sim.tick(DT, 1.0);
        sim.stop_race();
        sim.stop_race();
        let state = *sim.state();
        sim.tick(DT, 1.0);
        assert_eq!(*sim.state(), state);
        assert_eq!(sim.progress().state(), RaceState::Idle);
    }
}
