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

//! Read-only views of the scene returned by the device listing.

use crate::pose::{Orientation, Position};
use crate::{ChipId, ChipKind, DeviceId, FacadeId, RadioState};
use serde::{Deserialize, Serialize};

/// State and traffic counters of one radio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RadioSnapshot {
    pub state: RadioState,
    pub tx_count: u64,
    pub rx_count: u64,
}

/// Kind-specific chip state as reported by the owning facade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChipRadio {
    Bluetooth { low_energy: RadioSnapshot, classic: RadioSnapshot },
    Wifi(RadioSnapshot),
    Uwb(RadioSnapshot),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChipSnapshot {
    pub id: ChipId,
    pub facade_id: FacadeId,
    pub kind: ChipKind,
    pub name: String,
    pub manufacturer: String,
    pub product_name: String,
    /// True while a capture file is open for this chip.
    pub capture: bool,
    pub radio: ChipRadio,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub id: DeviceId,
    pub guid: String,
    pub name: String,
    pub visible: bool,
    pub position: Position,
    pub orientation: Orientation,
    pub chips: Vec<ChipSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes() {
        let snapshot = DeviceSnapshot {
            id: 1,
            guid: "guid-1".to_string(),
            name: "Boar".to_string(),
            visible: true,
            position: Position::default(),
            orientation: Orientation::default(),
            chips: vec![ChipSnapshot {
                id: 1,
                facade_id: 1,
                kind: ChipKind::Wifi,
                name: "wifi-0".to_string(),
                manufacturer: String::new(),
                product_name: String::new(),
                capture: false,
                radio: ChipRadio::Wifi(RadioSnapshot {
                    state: RadioState::On,
                    tx_count: 0,
                    rx_count: 0,
                }),
            }],
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: DeviceSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "Boar");
        assert_eq!(parsed.chips.len(), 1);
    }
}
