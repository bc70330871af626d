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

//! A minimal in-process controller model.
//!
//! Deployments link a full HCI controller library behind
//! [`ControllerFactory`]; this model stands in when none is linked and
//! backs the unit and integration tests. It acknowledges HCI commands with
//! a Command Complete event, honours the hardware-error-before-reset
//! quirk, and surfaces received air traffic to the owning peer as an HCI
//! event.

use crate::devices::ids::IdFactory;
use bytes::Bytes;
use log::warn;
use radiosim_model::HciPacketType;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use super::controller::{
    ControllerFactory, ControllerId, ControllerModel, ControllerProperties, HciPacketTransport,
    PhyKind, Scheduler, TransportCallbacks,
};
use super::phy::{PhyDevice, SimPhy};

const HCI_RESET: [u8; 3] = [0x03, 0x0c, 0x00];
const HARDWARE_ERROR_EVENT: [u8; 3] = [0x10, 0x01, 0x00];

/// One loopback controller and its receive endpoint on the phys.
pub struct LoopbackDevice {
    id: ControllerId,
    transport: Arc<HciPacketTransport>,
    saw_reset: AtomicBool,
    received: Mutex<Vec<(Bytes, PhyKind, i8)>>,
}

impl LoopbackDevice {
    fn new(id: ControllerId, transport: Arc<HciPacketTransport>) -> Arc<Self> {
        Arc::new(LoopbackDevice {
            id,
            transport,
            saw_reset: AtomicBool::new(false),
            received: Mutex::new(Vec::new()),
        })
    }

    /// Air packets received on any phy, with their phy and rewritten RSSI.
    pub fn received(&self) -> Vec<(Bytes, PhyKind, i8)> {
        self.received.lock().unwrap().clone()
    }

    // Host-to-controller packet processing, runs on the controller loop.
    fn on_hci(&self, properties: ControllerProperties, packet_type: HciPacketType, packet: Bytes) {
        if packet_type != HciPacketType::Command {
            return;
        }
        let is_reset = packet.as_ref() == HCI_RESET;
        if properties.hardware_error_before_reset
            && !self.saw_reset.load(Ordering::SeqCst)
            && !is_reset
        {
            self.transport
                .send(HciPacketType::Event, Bytes::from_static(&HARDWARE_ERROR_EVENT));
            return;
        }
        if is_reset {
            self.saw_reset.store(true, Ordering::SeqCst);
        }
        // Command Complete echoing the opcode with success status.
        let opcode = packet.get(0..2).unwrap_or(&[0, 0]);
        let event = vec![0x0e, 0x04, 0x01, opcode[0], opcode[1], 0x00];
        self.transport.send(HciPacketType::Event, Bytes::from(event));
    }
}

impl PhyDevice for LoopbackDevice {
    fn id(&self) -> ControllerId {
        self.id
    }

    fn receive(&self, packet: &Bytes, phy: PhyKind, rssi: i8) {
        self.received.lock().unwrap().push((packet.clone(), phy, rssi));
        // Surface the air packet to the peer as an HCI event.
        self.transport.send(HciPacketType::Event, packet.clone());
    }
}

pub struct LoopbackModel {
    phys: [Arc<SimPhy>; 2],
    properties: ControllerProperties,
    ids: IdFactory,
    devices: RwLock<HashMap<ControllerId, Arc<LoopbackDevice>>>,
}

impl LoopbackModel {
    fn new(phys: [Arc<SimPhy>; 2], properties: ControllerProperties) -> Self {
        LoopbackModel { phys, properties, ids: IdFactory::new(), devices: RwLock::new(HashMap::new()) }
    }

    /// Test hook: transmit an air packet from `sender` on `phy`.
    pub fn transmit(&self, sender: ControllerId, phy: PhyKind, tx_power: i8, packet: &Bytes) {
        self.phys[phy.index()].send(packet, tx_power, sender);
    }

    /// Test hook: the device for a controller id.
    pub fn device(&self, controller_id: ControllerId) -> Option<Arc<LoopbackDevice>> {
        self.devices.read().unwrap().get(&controller_id).cloned()
    }

    pub fn phy(&self, phy: PhyKind) -> &SimPhy {
        &self.phys[phy.index()]
    }
}

impl ControllerModel for LoopbackModel {
    fn add_connection(&self, transport: Arc<HciPacketTransport>) -> ControllerId {
        let id = self.ids.next_id();
        let device = LoopbackDevice::new(id, transport.clone());
        let callback_device = device.clone();
        let properties = self.properties;
        transport.register(TransportCallbacks {
            packet: Box::new(move |packet_type, packet| {
                callback_device.on_hci(properties, packet_type, packet)
            }),
            close: Box::new(|| {}),
        });
        self.devices.write().unwrap().insert(id, device);
        id
    }

    fn remove_device(&self, controller_id: ControllerId) {
        for phy in &self.phys {
            phy.remove(controller_id);
        }
        match self.devices.write().unwrap().remove(&controller_id) {
            Some(device) => device.transport.close(),
            None => warn!("loopback remove_device: unknown controller {controller_id}"),
        }
    }

    fn add_device_to_phy(&self, controller_id: ControllerId, phy: PhyKind) {
        match self.devices.read().unwrap().get(&controller_id) {
            Some(device) => self.phys[phy.index()].add(device.clone()),
            None => warn!("loopback add_device_to_phy: unknown controller {controller_id}"),
        }
    }

    fn remove_device_from_phy(&self, controller_id: ControllerId, phy: PhyKind) {
        self.phys[phy.index()].remove(controller_id);
    }
}

/// Factory handed to [`BluetoothFacade::new`]. Retains the created model
/// so tests can drive air traffic directly.
///
/// [`BluetoothFacade::new`]: super::facade::BluetoothFacade::new
#[derive(Default)]
pub struct LoopbackFactory {
    created: Mutex<Option<Arc<LoopbackModel>>>,
}

impl LoopbackFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently created model.
    pub fn model(&self) -> Option<Arc<LoopbackModel>> {
        self.created.lock().unwrap().clone()
    }
}

impl ControllerFactory for LoopbackFactory {
    fn create(
        &self,
        _scheduler: Scheduler,
        phys: [Arc<SimPhy>; 2],
        properties: ControllerProperties,
    ) -> Arc<dyn ControllerModel> {
        let model = Arc::new(LoopbackModel::new(phys, properties));
        *self.created.lock().unwrap() = Some(model.clone());
        model
    }
}
