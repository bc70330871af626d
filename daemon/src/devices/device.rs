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

// device.rs

use crate::devices::chip::Chip;
use radiosim_model::{ChipId, ChipKind, DeviceId};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

// common_typos_disable
const DEVICE_NAMES: [&str; 80] = [
    "Bear", "Boar", "Buck", "Bull", "Calf", "Cavy", "Colt", "Cony", "Coon", "Dauw", "Deer",
    "Dieb", "Douc", "Dzho", "Euro", "Eyra", "Fawn", "Foal", "Gaur", "Gilt", "Goat", "Guib",
    "Gyal", "Hare", "Hart", "Hind", "Hogg", "Ibex", "Joey", "Jomo", "Kine", "Kudu", "Lamb",
    "Lion", "Maki", "Mara", "Mare", "Mico", "Mink", "Moco", "Mohr", "Moke", "Mole", "Mona",
    "Mule", "Musk", "Napu", "Neat", "Nowt", "Oont", "Orca", "Oryx", "Oxen", "Paca", "Paco",
    "Pard", "Peba", "Pika", "Pudu", "Puma", "Quey", "Roan", "Runt", "Rusa", "Saki", "Seal",
    "Skug", "Sore", "Tait", "Tegg", "Titi", "Unau", "Urus", "Urva", "Vari", "Vole", "Wolf",
    "Zati", "Zebu", "Zobo",
];

/// The default name for a device, stable for a given guid.
pub fn default_name(guid: &str) -> &'static str {
    let mut hasher = DefaultHasher::new();
    guid.hash(&mut hasher);
    DEVICE_NAMES[(hasher.finish() % DEVICE_NAMES.len() as u64) as usize]
}

pub struct Device {
    pub id: DeviceId,
    pub guid: String,
    pub name: String,
    pub visible: bool,
    // BTreeMap keeps chips in insertion order because chip ids are monotonic.
    pub chips: BTreeMap<ChipId, Chip>,
}

impl Device {
    pub fn new(id: DeviceId, guid: &str, name: &str) -> Self {
        let name = if name.is_empty() { default_name(guid).to_string() } else { name.to_string() };
        Device { id, guid: guid.to_string(), name, visible: true, chips: BTreeMap::new() }
    }

    /// Find the target of a chip patch: by chip id when given, otherwise the
    /// `ordinal`-th chip of `kind` in list order. A patch with neither id
    /// nor kind matches nothing.
    pub fn match_chip(
        &self,
        chip_id: Option<ChipId>,
        kind: Option<ChipKind>,
        ordinal: usize,
    ) -> Option<&Chip> {
        if let Some(chip_id) = chip_id {
            return self.chips.get(&chip_id);
        }
        let kind = kind?;
        self.chips.values().filter(|chip| chip.kind == kind).nth(ordinal)
    }
}
