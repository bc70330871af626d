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

//! Radiosim daemon libraries.
//!
//! The daemon multiplexes virtual radio traffic between emulated devices.
//! Peers open a packet stream per chip; the session layer registers the chip
//! with the scene controller, and the packet hub routes frames between the
//! stream and the per-kind radio facade.

pub mod args;
pub mod captures;
pub mod config;
pub mod devices;
pub mod error;
pub mod hub;
pub mod notify;
pub mod ranging;
pub mod service;
pub mod transport;
pub mod version;
pub mod wireless;
