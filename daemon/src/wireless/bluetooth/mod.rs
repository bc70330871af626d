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

//! The Bluetooth facade and its controller collaborator seam.
//!
//! The facade owns per-chip radio state and counters, participates in the
//! two simulated phys and rewrites RSSI from spatial distance. The HCI
//! controller itself is an external library consumed through the
//! [`controller::ControllerModel`] trait; [`loopback`] is the built-in
//! stand-in used by tests and by deployments without a vendor controller.

pub mod controller;
pub mod facade;
pub mod loopback;
pub mod phy;

pub use facade::BluetoothFacade;
