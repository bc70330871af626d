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

//! Ranging library
//!
//! Converts device poses into distances and simulated signal strength.

use glam::Vec3;
use radiosim_model::pose::Position;

/// Path-loss exponent of the log-distance model. 2.0 is free space.
const PATH_LOSS_EXPONENT: f32 = 2.0;

/// Lower saturation bound for the computed rssi in dBm.
const RSSI_FLOOR: f32 = -120.0;

/// Distances are capped so the rssi arithmetic stays finite and
/// representable in an i8.
const MAX_DISTANCE: f32 = 1.0e6;

/// Convert distance to RSSI with the log-distance path loss model.
/// See [Log-distance_path_loss_model][1].
///
/// [1]: https://en.wikipedia.org/wiki/Log-distance_path_loss_model
///
/// # Parameters
///
/// * `tx_power`: transmitted power (dBm).
/// * `distance`: distance in meters (m), treated as 1m when closer.
///
/// # Returns
///
/// The rssi that would be measured at that distance, non-increasing in
/// distance and clamped to `RSSI_FLOOR..=tx_power`.
pub fn distance_to_rssi(tx_power: i8, distance: f32) -> i8 {
    let distance = distance.clamp(1.0, MAX_DISTANCE);
    let rssi = tx_power as f32 - 10.0 * PATH_LOSS_EXPONENT * distance.log10();
    rssi.clamp(RSSI_FLOOR, tx_power as f32) as i8
}

/// Euclidean distance between two positions.
pub fn distance(a: &Position, b: &Position) -> f32 {
    (Vec3::new(a.x, a.y, a.z) - Vec3::new(b.x, b.y, b.z)).length()
}
