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

/// A Chip is a generic emulated radio endpoint owned by a Device.
///
/// Radio-specific state (phy membership, counters) is owned by the chip's
/// facade and addressed through `(kind, facade_id)`.
use radiosim_model::patch::ChipPatch;
use radiosim_model::{ChipId, ChipKind, FacadeId};

/// Peer-supplied fields of a new chip.
pub struct CreateParams {
    pub kind: ChipKind,
    pub name: Option<String>,
    pub manufacturer: String,
    pub product_name: String,
}

pub struct Chip {
    pub id: ChipId,
    pub facade_id: FacadeId,
    pub kind: ChipKind,
    pub name: String,
    // These are patchable
    pub manufacturer: String,
    pub product_name: String,
}

impl Chip {
    pub fn new(id: ChipId, facade_id: FacadeId, create_params: &CreateParams) -> Self {
        Self {
            id,
            facade_id,
            kind: create_params.kind,
            name: create_params.name.clone().unwrap_or(format!("chip-{id}")),
            manufacturer: create_params.manufacturer.clone(),
            product_name: create_params.product_name.clone(),
        }
    }

    /// Apply the record-level fields of a chip patch. Kind-specific fields
    /// are delegated to the facade by the scene controller.
    pub fn patch(&mut self, patch: &ChipPatch) {
        if let Some(manufacturer) = &patch.manufacturer {
            self.manufacturer = manufacturer.clone();
        }
        if let Some(product_name) = &patch.product_name {
            self.product_name = product_name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bt_params(name: Option<&str>) -> CreateParams {
        CreateParams {
            kind: ChipKind::Bluetooth,
            name: name.map(String::from),
            manufacturer: "radiosim".to_string(),
            product_name: "radiosim_bt".to_string(),
        }
    }

    #[test]
    fn test_name_defaults_from_id() {
        let chip = Chip::new(7, 1, &bt_params(None));
        assert_eq!(chip.name, "chip-7");
        let chip = Chip::new(8, 2, &bt_params(Some("bt-0")));
        assert_eq!(chip.name, "bt-0");
    }

    #[test]
    fn test_patch_record_fields() {
        let mut chip = Chip::new(1, 1, &bt_params(Some("bt-0")));
        chip.patch(&ChipPatch {
            manufacturer: Some("acme".to_string()),
            ..Default::default()
        });
        assert_eq!(chip.manufacturer, "acme");
        assert_eq!(chip.product_name, "radiosim_bt");
    }
}
