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

//! Patch messages applied by `PatchDevice`. Absent fields leave the current
//! state unchanged.

use crate::pose::{Orientation, Position};
use crate::{ChipId, ChipKind, RadioState};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BluetoothPatch {
    pub low_energy: Option<RadioState>,
    pub classic: Option<RadioState>,
}

/// Kind-specific part of a chip patch, delegated to the owning facade.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ChipRadioPatch {
    Bluetooth(BluetoothPatch),
    Wifi { state: Option<RadioState> },
    Uwb { state: Option<RadioState> },
}

impl ChipRadioPatch {
    /// The chip kind this patch applies to.
    pub fn kind(&self) -> ChipKind {
        match self {
            ChipRadioPatch::Bluetooth(_) => ChipKind::Bluetooth,
            ChipRadioPatch::Wifi { .. } => ChipKind::Wifi,
            ChipRadioPatch::Uwb { .. } => ChipKind::Uwb,
        }
    }
}

/// Patch for a single chip. The target chip is selected by `id` when present,
/// otherwise by the kind of the patch and the chip's position in the device's
/// chip list among chips of that kind.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChipPatch {
    pub id: Option<ChipId>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    pub capture: Option<bool>,
    pub radio: Option<ChipRadioPatch>,
}

impl ChipPatch {
    /// Kind used for position-in-list matching when no chip id is given.
    pub fn kind(&self) -> Option<ChipKind> {
        self.radio.as_ref().map(|r| r.kind())
    }
}

/// Patch for a device. `name` is the preferred match key, `guid` second.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DevicePatch {
    pub name: Option<String>,
    pub guid: Option<String>,
    pub visible: Option<bool>,
    pub position: Option<Position>,
    pub orientation: Option<Orientation>,
    pub chips: Vec<ChipPatch>,
}
