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

use std::cell::RefCell;
use std::rc::Rc;
use crate::vehicle::VehicleState;

#[derive(Debug, Clone, PartialEq)]
pub enum VehicleEvent {
    /// Sent once at the end of every tick that advanced the vehicle
    StateChanged(VehicleState),
    GearChanged { gear: usize }
}

/// Read-only consumer of vehicle notifications (audio, effects, UI...).
///
/// Called synchronously after the vehicle state has been fully updated.
pub trait VehicleObserver {
    fn notify(&mut self, event: &VehicleEvent);
}

/// Ordered list of observers owned by a single simulation
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Box<dyn VehicleObserver>>
}

impl ObserverList {
    pub fn new() -> ObserverList {
        ObserverList { observers: Vec::new() }
    }

    pub fn subscribe(&mut self, observer: Box<dyn VehicleObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn broadcast(&mut self, event: &VehicleEvent) {
        for observer in self.observers.iter_mut() {
            observer.notify(event);
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObserverList({} observers)", self.observers.len())
    }
}

/// Observer that keeps every event it sees. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<VehicleEvent>>>
}

impl EventRecorder {
    pub fn new() -> EventRecorder {
        EventRecorder::default()
    }

    pub fn events(&self) -> Vec<VehicleEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn gear_changes(&self) -> Vec<usize> {
        self.events.borrow().iter().filter_map(|event| match event {
            VehicleEvent::GearChanged { gear } => Some(*gear),
            _ => None
        }).collect()
    }
}

impl VehicleObserver for EventRecorder {
    fn notify(&mut self, event: &VehicleEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
