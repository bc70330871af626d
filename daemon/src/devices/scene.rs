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

// scene.rs
//
// The authoritative model of devices, chips and their spatial state.
//
// The scene controller is constructed once at the composition root and
// passed to the session layer and the control surface. Facade calls made
// from scene operations run under the scene lock; facades never reenter
// the scene. Capture sinks do file I/O and are only touched after the
// lock is released.

use crate::captures::capture::Captures;
use crate::devices::chip::{Chip, CreateParams};
use crate::devices::device::Device;
use crate::devices::ids::IdFactory;
use crate::devices::pose::PoseStore;
use crate::error::{Error, Result};
use crate::notify::NotifyBus;
use crate::wireless::FacadeRegistry;
use log::{info, warn};
use radiosim_model::patch::DevicePatch;
use radiosim_model::snapshot::{ChipSnapshot, DeviceSnapshot};
use radiosim_model::{ChipId, DeviceId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// Identifiers assigned when a chip is attached.
#[derive(Debug, Clone, Copy)]
pub struct AddChipResult {
    pub device_id: DeviceId,
    pub chip_id: ChipId,
    pub facade_id: radiosim_model::FacadeId,
}

pub struct SceneController {
    devices: RwLock<BTreeMap<DeviceId, Device>>,
    registry: Arc<FacadeRegistry>,
    pose: Arc<PoseStore>,
    captures: Arc<Captures>,
    notify: Arc<NotifyBus>,
    device_ids: IdFactory,
    chip_ids: IdFactory,
}

impl SceneController {
    pub fn new(
        registry: Arc<FacadeRegistry>,
        pose: Arc<PoseStore>,
        captures: Arc<Captures>,
        notify: Arc<NotifyBus>,
    ) -> Self {
        SceneController {
            devices: RwLock::new(BTreeMap::new()),
            registry,
            pose,
            captures,
            notify,
            device_ids: IdFactory::new(),
            chip_ids: IdFactory::new(),
        }
    }

    /// Attach a chip, creating the owning device when the guid is new.
    ///
    /// Called by the session layer when a peer completes its handshake.
    pub fn add_chip(&self, guid: &str, device_name: &str, params: &CreateParams) -> AddChipResult {
        let (result, device_guid) = {
            let mut devices = self.devices.write().unwrap();
            let device_id = match devices.values().find(|d| d.guid == guid).map(|d| d.id) {
                Some(id) => id,
                None => {
                    let id = self.device_ids.next_id();
                    devices.insert(id, Device::new(id, guid, device_name));
                    self.pose.add(id);
                    id
                }
            };
            let chip_id = self.chip_ids.next_id();
            let facade_id = self.registry.add(params.kind, chip_id);
            let device = devices.get_mut(&device_id).unwrap();
            device.chips.insert(chip_id, Chip::new(chip_id, facade_id, params));
            (AddChipResult { device_id, chip_id, facade_id }, device.guid.clone())
        };
        // Capture sinks touch the filesystem, keep them outside the lock.
        self.captures.insert(result.chip_id, params.kind, result.facade_id, &device_guid);
        info!(
            "added chip: device_id: {} chip_id: {} kind: {} facade_id: {}",
            result.device_id, result.chip_id, params.kind, result.facade_id
        );
        self.notify.notify();
        result
    }

    /// Detach a chip and tear down its facade state. The owning device is
    /// removed with its last chip.
    pub fn remove_chip(&self, device_id: DeviceId, chip_id: ChipId) -> Result<()> {
        {
            let mut devices = self.devices.write().unwrap();
            let device = devices
                .get_mut(&device_id)
                .ok_or(Error::NotFound(format!("RemoveChip device id {device_id}")))?;
            let chip = device
                .chips
                .get(&chip_id)
                .ok_or(Error::NotFound(format!("RemoveChip chip id {chip_id}")))?;
            // Facade teardown happens before the chip record is dropped.
            self.registry.remove(chip.kind, chip.facade_id);
            device.chips.remove(&chip_id);
            if device.chips.is_empty() {
                devices.remove(&device_id);
                self.pose.remove(device_id);
            }
        }
        self.captures.remove(chip_id);
        info!("removed chip: device_id: {device_id} chip_id: {chip_id}");
        self.notify.notify();
        Ok(())
    }

    /// Patch a device matched by name (preferred) or guid, first match in
    /// insertion order. Present fields are applied; chip patches are
    /// delegated to the chip's facade.
    pub fn patch_device(&self, patch: &DevicePatch) -> Result<()> {
        let mut capture_updates: Vec<(ChipId, bool)> = Vec::new();
        {
            let mut devices = self.devices.write().unwrap();
            let device = match_target_device(&mut devices, patch)?;
            if let Some(visible) = patch.visible {
                device.visible = visible;
            }
            if let Some(position) = &patch.position {
                self.pose.set_position(device.id, position);
            }
            if let Some(orientation) = &patch.orientation {
                self.pose.set_orientation(device.id, orientation);
            }
            // Chip patches without an id match the n-th chip of their kind.
            let mut ordinals: HashMap<radiosim_model::ChipKind, usize> = HashMap::new();
            for chip_patch in &patch.chips {
                let ordinal = match (chip_patch.id, chip_patch.kind()) {
                    (None, Some(kind)) => {
                        let ordinal = ordinals.entry(kind).or_insert(0);
                        let current = *ordinal;
                        *ordinal += 1;
                        current
                    }
                    _ => 0,
                };
                let (chip_id, kind, facade_id) = device
                    .match_chip(chip_patch.id, chip_patch.kind(), ordinal)
                    .map(|chip| (chip.id, chip.kind, chip.facade_id))
                    .ok_or(Error::NotFound(format!(
                        "PatchDevice chip not found in device {}",
                        device.name
                    )))?;
                device.chips.get_mut(&chip_id).unwrap().patch(chip_patch);
                if let Some(radio) = &chip_patch.radio {
                    if radio.kind() != kind {
                        return Err(Error::InvalidArgument(format!(
                            "chip {chip_id} is {kind}, patch is {}",
                            radio.kind()
                        )));
                    }
                    self.registry.patch(kind, facade_id, radio);
                }
                if let Some(capture) = chip_patch.capture {
                    capture_updates.push((chip_id, capture));
                }
            }
        }
        for (chip_id, on) in capture_updates {
            if let Err(err) = self.captures.set_state(chip_id, on) {
                warn!("capture patch failed for chip {chip_id}: {err}");
            }
        }
        self.notify.notify();
        Ok(())
    }

    /// Turn packet capture on or off for one chip.
    pub fn patch_capture(&self, chip_id: ChipId, on: bool) -> Result<()> {
        let known = self
            .devices
            .read()
            .unwrap()
            .values()
            .any(|device| device.chips.contains_key(&chip_id));
        if !known {
            return Err(Error::NotFound(format!("PatchCapture chip id {chip_id}")));
        }
        self.captures.set_state(chip_id, on)?;
        self.notify.notify();
        Ok(())
    }

    /// Reset every chip to its default radio state and every device to the
    /// origin. Open capture sinks are released.
    pub fn reset(&self) {
        {
            let mut devices = self.devices.write().unwrap();
            for device in devices.values_mut() {
                device.visible = true;
                self.pose.reset(device.id);
                for chip in device.chips.values() {
                    self.registry.reset(chip.kind, chip.facade_id);
                }
            }
        }
        // Reset releases capture sinks the same way RemoveChip does.
        self.captures.stop_all();
        self.notify.notify();
    }

    /// Ordered snapshots of every device, including per-chip facade state.
    pub fn list(&self) -> Vec<DeviceSnapshot> {
        let devices = self.devices.read().unwrap();
        devices
            .values()
            .map(|device| DeviceSnapshot {
                id: device.id,
                guid: device.guid.clone(),
                name: device.name.clone(),
                visible: device.visible,
                position: self.pose.get_position(device.id).unwrap_or_default(),
                orientation: self.pose.get_orientation(device.id).unwrap_or_default(),
                chips: device
                    .chips
                    .values()
                    .filter_map(|chip| {
                        let radio = self.registry.get(chip.kind, chip.facade_id);
                        if radio.is_none() {
                            // A chip without facade state is an invariant
                            // violation; drop it from the listing.
                            warn!("list: no facade state for chip {}", chip.id);
                        }
                        let radio = radio?;
                        Some(ChipSnapshot {
                            id: chip.id,
                            facade_id: chip.facade_id,
                            kind: chip.kind,
                            name: chip.name.clone(),
                            manufacturer: chip.manufacturer.clone(),
                            product_name: chip.product_name.clone(),
                            capture: self.captures.is_on(chip.id),
                            radio,
                        })
                    })
                    .collect(),
            })
            .collect()
    }

    /// Euclidean distance between two devices, `None` when either is not
    /// registered. Positions default to the origin.
    pub fn get_distance(&self, a: DeviceId, b: DeviceId) -> Option<f32> {
        self.pose.distance(a, b)
    }
}

fn match_target_device<'a>(
    devices: &'a mut BTreeMap<DeviceId, Device>,
    patch: &DevicePatch,
) -> Result<&'a mut Device> {
    if let Some(name) = patch.name.as_deref().filter(|n| !n.is_empty()) {
        return devices
            .values_mut()
            .find(|d| d.name == name)
            .ok_or(Error::NotFound(format!("No such device with name {name}")));
    }
    if let Some(guid) = patch.guid.as_deref().filter(|g| !g.is_empty()) {
        return devices
            .values_mut()
            .find(|d| d.guid == guid)
            .ok_or(Error::NotFound(format!("No such device with guid {guid}")));
    }
    Err(Error::NotFound("PatchDevice without name or guid".to_string()))
}
