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

//! Per-chip Bluetooth controller state, phy membership and counters.

use crate::devices::pose::PoseStore;
use crate::hub::{ResponseSink, Routes};
use crate::ranging::distance_to_rssi;
use crate::wireless::RadioFacade;
use bytes::Bytes;
use log::{info, warn};
use radiosim_model::patch::ChipRadioPatch;
use radiosim_model::snapshot::{ChipRadio, RadioSnapshot};
use radiosim_model::{ChipId, ChipKind, FacadeId, HciPacketType, RadioState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use super::controller::{
    ControllerFactory, ControllerId, ControllerModel, ControllerProperties, HciPacketTransport,
    PhyKind, Scheduler,
};
use super::phy::{AirHooks, SimPhy};

struct ChipState {
    chip_id: ChipId,
    transport: Arc<HciPacketTransport>,
    low_energy: Mutex<RadioState>,
    classic: Mutex<RadioState>,
    le_tx_count: AtomicU64,
    le_rx_count: AtomicU64,
    classic_tx_count: AtomicU64,
    classic_rx_count: AtomicU64,
}

impl ChipState {
    fn new(chip_id: ChipId, transport: Arc<HciPacketTransport>) -> Self {
        ChipState {
            chip_id,
            transport,
            low_energy: Mutex::new(RadioState::On),
            classic: Mutex::new(RadioState::On),
            le_tx_count: AtomicU64::new(0),
            le_rx_count: AtomicU64::new(0),
            classic_tx_count: AtomicU64::new(0),
            classic_rx_count: AtomicU64::new(0),
        }
    }

    fn radio_snapshot(&self, phy: PhyKind) -> RadioSnapshot {
        match phy {
            PhyKind::LowEnergy => RadioSnapshot {
                state: *self.low_energy.lock().unwrap(),
                tx_count: self.le_tx_count.load(Ordering::Relaxed),
                rx_count: self.le_rx_count.load(Ordering::Relaxed),
            },
            PhyKind::BrEdr => RadioSnapshot {
                state: *self.classic.lock().unwrap(),
                tx_count: self.classic_tx_count.load(Ordering::Relaxed),
                rx_count: self.classic_rx_count.load(Ordering::Relaxed),
            },
        }
    }
}

// Chip table shared with the air model hooks, which run on the controller
// thread.
struct Shared {
    chips: RwLock<HashMap<ControllerId, Arc<ChipState>>>,
    routes: Arc<Routes>,
    pose: Arc<PoseStore>,
}

struct AirModel {
    shared: Arc<Shared>,
}

impl AirHooks for AirModel {
    fn incr_tx(&self, controller_id: ControllerId, phy: PhyKind) {
        if let Some(chip) = self.shared.chips.read().unwrap().get(&controller_id) {
            match phy {
                PhyKind::LowEnergy => chip.le_tx_count.fetch_add(1, Ordering::Relaxed),
                PhyKind::BrEdr => chip.classic_tx_count.fetch_add(1, Ordering::Relaxed),
            };
        }
    }

    fn incr_rx(&self, controller_id: ControllerId, phy: PhyKind) {
        if let Some(chip) = self.shared.chips.read().unwrap().get(&controller_id) {
            match phy {
                PhyKind::LowEnergy => chip.le_rx_count.fetch_add(1, Ordering::Relaxed),
                PhyKind::BrEdr => chip.classic_rx_count.fetch_add(1, Ordering::Relaxed),
            };
        }
    }

    /// RSSI from spatial distance. When either endpoint has no mapped
    /// device the sender's tx_power is delivered unchanged.
    fn compute_rssi(&self, sender: ControllerId, receiver: ControllerId, tx_power: i8) -> i8 {
        let Some(sender_device) = self.shared.routes.device_for(ChipKind::Bluetooth, sender)
        else {
            return tx_power;
        };
        let Some(receiver_device) = self.shared.routes.device_for(ChipKind::Bluetooth, receiver)
        else {
            return tx_power;
        };
        match self.shared.pose.distance(sender_device, receiver_device) {
            Some(distance) => distance_to_rssi(tx_power, distance),
            None => tx_power,
        }
    }
}

pub struct BluetoothFacade {
    shared: Arc<Shared>,
    model: Arc<dyn ControllerModel>,
    scheduler: Scheduler,
    sink: Arc<dyn ResponseSink>,
}

impl BluetoothFacade {
    pub fn new(
        factory: &dyn ControllerFactory,
        routes: Arc<Routes>,
        pose: Arc<PoseStore>,
        sink: Arc<dyn ResponseSink>,
    ) -> Self {
        let scheduler = Scheduler::new();
        let shared = Arc::new(Shared { chips: RwLock::new(HashMap::new()), routes, pose });
        let hooks: Arc<dyn AirHooks> = Arc::new(AirModel { shared: shared.clone() });
        // NOTE: 0:BR_EDR, 1:LOW_ENERGY. The order is load bearing for
        // controller libraries that address phys by ordinal.
        let phys = [
            Arc::new(SimPhy::new(PhyKind::BrEdr, hooks.clone())),
            Arc::new(SimPhy::new(PhyKind::LowEnergy, hooks)),
        ];
        let properties = ControllerProperties { hardware_error_before_reset: true };
        let model = factory.create(scheduler.clone(), phys, properties);
        BluetoothFacade { shared, model, scheduler, sink }
    }

    fn patch_radio(
        &self,
        controller_id: ControllerId,
        cell: &Mutex<RadioState>,
        request: Option<RadioState>,
        phy: PhyKind,
    ) {
        let Some(request) = request else { return };
        if request == RadioState::Unknown {
            return;
        }
        let mut state = cell.lock().unwrap();
        if *state == request {
            return;
        }
        *state = request;
        drop(state);
        match request {
            RadioState::On => self.model.add_device_to_phy(controller_id, phy),
            RadioState::Off => self.model.remove_device_from_phy(controller_id, phy),
            RadioState::Unknown => {}
        }
    }
}

impl RadioFacade for BluetoothFacade {
    fn add(&self, chip_id: ChipId) -> FacadeId {
        let transport =
            Arc::new(HciPacketTransport::new(self.scheduler.clone(), self.sink.clone()));
        let controller_id = self.model.add_connection(transport.clone());
        transport.connect(controller_id);
        // Both radios start ON and join their phys.
        self.model.add_device_to_phy(controller_id, PhyKind::BrEdr);
        self.model.add_device_to_phy(controller_id, PhyKind::LowEnergy);
        self.shared
            .chips
            .write()
            .unwrap()
            .insert(controller_id, Arc::new(ChipState::new(chip_id, transport)));
        info!("bluetooth chip created, controller_id: {controller_id} chip_id: {chip_id}");
        controller_id
    }

    fn remove(&self, facade_id: FacadeId) {
        match self.shared.chips.write().unwrap().remove(&facade_id) {
            Some(chip) => {
                info!("removing bluetooth chip {} controller {facade_id}", chip.chip_id);
                self.model.remove_device(facade_id);
            }
            None => warn!("bluetooth remove: unknown facade_id {facade_id}"),
        }
    }

    fn reset(&self, facade_id: FacadeId) {
        let Some(chip) = self.shared.chips.read().unwrap().get(&facade_id).cloned() else {
            warn!("bluetooth reset: unknown facade_id {facade_id}");
            return;
        };
        *chip.low_energy.lock().unwrap() = RadioState::On;
        *chip.classic.lock().unwrap() = RadioState::On;
        chip.le_tx_count.store(0, Ordering::Relaxed);
        chip.le_rx_count.store(0, Ordering::Relaxed);
        chip.classic_tx_count.store(0, Ordering::Relaxed);
        chip.classic_rx_count.store(0, Ordering::Relaxed);
        // Re-join both phys; joining an already joined phy is a no-op.
        self.model.add_device_to_phy(facade_id, PhyKind::BrEdr);
        self.model.add_device_to_phy(facade_id, PhyKind::LowEnergy);
    }

    fn patch(&self, facade_id: FacadeId, patch: &ChipRadioPatch) {
        let ChipRadioPatch::Bluetooth(patch) = patch else {
            warn!("bluetooth patch: wrong patch kind for facade_id {facade_id}");
            return;
        };
        let Some(chip) = self.shared.chips.read().unwrap().get(&facade_id).cloned() else {
            warn!("bluetooth patch: unknown facade_id {facade_id}");
            return;
        };
        self.patch_radio(facade_id, &chip.low_energy, patch.low_energy, PhyKind::LowEnergy);
        self.patch_radio(facade_id, &chip.classic, patch.classic, PhyKind::BrEdr);
    }

    fn get(&self, facade_id: FacadeId) -> Option<ChipRadio> {
        let chip = self.shared.chips.read().unwrap().get(&facade_id).cloned()?;
        Some(ChipRadio::Bluetooth {
            low_energy: chip.radio_snapshot(PhyKind::LowEnergy),
            classic: chip.radio_snapshot(PhyKind::BrEdr),
        })
    }

    fn handle_request(&self, facade_id: FacadeId, packet: &Bytes, packet_type: HciPacketType) {
        match self.shared.chips.read().unwrap().get(&facade_id) {
            Some(chip) => chip.transport.request(packet_type, packet.clone()),
            None => warn!("bluetooth handle_request: unknown facade_id {facade_id}"),
        }
    }
}
