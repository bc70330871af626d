// Copyright 2024 The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Spatial state of registered devices.
//!
//! Poses live outside the device table so the bluetooth air model can read
//! positions from the controller thread without touching the scene lock.

use crate::ranging;
use radiosim_model::pose::{Orientation, Position};
use radiosim_model::DeviceId;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct PoseStore {
    positions: RwLock<HashMap<DeviceId, Position>>,
    orientations: RwLock<HashMap<DeviceId, Orientation>>,
}

impl PoseStore {
    pub fn new() -> Self {
        PoseStore {
            positions: RwLock::new(HashMap::new()),
            orientations: RwLock::new(HashMap::new()),
        }
    }

    /// Register a device at the origin.
    pub fn add(&self, device_id: DeviceId) {
        self.positions.write().unwrap().insert(device_id, Position::default());
        self.orientations.write().unwrap().insert(device_id, Orientation::default());
    }

    pub fn remove(&self, device_id: DeviceId) {
        self.positions.write().unwrap().remove(&device_id);
        self.orientations.write().unwrap().remove(&device_id);
    }

    /// Return a registered device to the origin.
    pub fn reset(&self, device_id: DeviceId) {
        self.positions.write().unwrap().insert(device_id, Position::default());
        self.orientations.write().unwrap().insert(device_id, Orientation::default());
    }

    pub fn set_position(&self, device_id: DeviceId, position: &Position) {
        self.positions.write().unwrap().insert(device_id, *position);
    }

    pub fn get_position(&self, device_id: DeviceId) -> Option<Position> {
        self.positions.read().unwrap().get(&device_id).copied()
    }

    pub fn set_orientation(&self, device_id: DeviceId, orientation: &Orientation) {
        self.orientations.write().unwrap().insert(device_id, *orientation);
    }

    pub fn get_orientation(&self, device_id: DeviceId) -> Option<Orientation> {
        self.orientations.read().unwrap().get(&device_id).copied()
    }

    /// Euclidean distance between two registered devices, `None` when
    /// either device is unknown. Positions default to the origin, so a
    /// registered device always has one.
    pub fn distance(&self, a: DeviceId, b: DeviceId) -> Option<f32> {
        let positions = self.positions.read().unwrap();
        let pos_a = positions.get(&a)?;
        let pos_b = positions.get(&b)?;
        Some(ranging::distance(pos_a, pos_b))
    }
}

impl Default for PoseStore {
    fn default() -> Self {
        Self::new()
    }
}
