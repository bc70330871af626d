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

//! Data model shared between the simulator core and its control surfaces.
//!
//! These are plain types with serde derives so an outer frontend can render
//! device listings as JSON without reaching into the daemon internals.

pub mod patch;
pub mod pose;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a virtual device, unique within a simulator instance.
pub type DeviceId = u32;

/// Identifier of a chip, unique across kinds within a simulator instance.
pub type ChipId = u32;

/// Identifier assigned by a radio facade, unique within its chip kind.
pub type FacadeId = u32;

/// The kind of radio a chip emulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipKind {
    Bluetooth,
    Wifi,
    Uwb,
}

impl ChipKind {
    /// File name suffix used for capture files of this kind.
    pub fn capture_suffix(&self) -> &'static str {
        match self {
            ChipKind::Bluetooth => "hci",
            ChipKind::Wifi => "wifi",
            ChipKind::Uwb => "uwb",
        }
    }
}

impl fmt::Display for ChipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChipKind::Bluetooth => "BLUETOOTH",
            ChipKind::Wifi => "WIFI",
            ChipKind::Uwb => "UWB",
        };
        write!(f, "{}", name)
    }
}

/// On/off state of a radio. `Unknown` is the absent value in patches and is
/// never applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadioState {
    #[default]
    Unknown,
    On,
    Off,
}

impl RadioState {
    pub fn is_on(&self) -> bool {
        matches!(self, RadioState::On)
    }
}

/// HCI packet indicator as used by the UART (H4) transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HciPacketType {
    #[default]
    Unspecified,
    Command,
    Acl,
    Sco,
    Event,
    Iso,
}

impl HciPacketType {
    pub fn to_u8(self) -> u8 {
        match self {
            HciPacketType::Unspecified => 0,
            HciPacketType::Command => 1,
            HciPacketType::Acl => 2,
            HciPacketType::Sco => 3,
            HciPacketType::Event => 4,
            HciPacketType::Iso => 5,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(HciPacketType::Unspecified),
            1 => Some(HciPacketType::Command),
            2 => Some(HciPacketType::Acl),
            3 => Some(HciPacketType::Sco),
            4 => Some(HciPacketType::Event),
            5 => Some(HciPacketType::Iso),
            _ => None,
        }
    }
}
