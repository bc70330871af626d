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

//! The simulated air interface.
//!
//! The controller library transmits on a phy through [`SimPhy::send`],
//! which interposes the facade's counter and RSSI hooks: the sender's TX
//! counter moves before delivery is attempted, every other member gets its
//! RX counter moved and receives the packet with an RSSI recomputed from
//! device positions.

use bytes::Bytes;
use std::sync::{Arc, RwLock};

use super::controller::{ControllerId, PhyKind};

/// A controller's receive endpoint on a phy, provided by the controller
/// library when the device joins.
pub trait PhyDevice: Send + Sync {
    fn id(&self) -> ControllerId;
    fn receive(&self, packet: &Bytes, phy: PhyKind, rssi: i8);
}

/// Facade hooks interposed on every phy transmission.
pub trait AirHooks: Send + Sync {
    fn incr_tx(&self, controller_id: ControllerId, phy: PhyKind);
    fn incr_rx(&self, controller_id: ControllerId, phy: PhyKind);
    fn compute_rssi(&self, sender: ControllerId, receiver: ControllerId, tx_power: i8) -> i8;
}

/// One simulated phy with its member controllers.
pub struct SimPhy {
    kind: PhyKind,
    members: RwLock<Vec<Arc<dyn PhyDevice>>>,
    hooks: Arc<dyn AirHooks>,
}

impl SimPhy {
    pub fn new(kind: PhyKind, hooks: Arc<dyn AirHooks>) -> Self {
        SimPhy { kind, members: RwLock::new(Vec::new()), hooks }
    }

    pub fn kind(&self) -> PhyKind {
        self.kind
    }

    /// Join a device. Joining twice is a no-op.
    pub fn add(&self, device: Arc<dyn PhyDevice>) {
        let mut members = self.members.write().unwrap();
        if !members.iter().any(|member| member.id() == device.id()) {
            members.push(device);
        }
    }

    pub fn remove(&self, controller_id: ControllerId) {
        self.members.write().unwrap().retain(|member| member.id() != controller_id);
    }

    pub fn contains(&self, controller_id: ControllerId) -> bool {
        self.members.read().unwrap().iter().any(|member| member.id() == controller_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.read().unwrap().len()
    }

    /// Transmit on this phy. The sender's TX counter moves even when no
    /// other member is present.
    pub fn send(&self, packet: &Bytes, tx_power: i8, sender: ControllerId) {
        self.hooks.incr_tx(sender, self.kind);
        let members: Vec<Arc<dyn PhyDevice>> =
            self.members.read().unwrap().iter().cloned().collect();
        for member in members {
            if member.id() == sender {
                continue;
            }
            let rssi = self.hooks.compute_rssi(sender, member.id(), tx_power);
            self.hooks.incr_rx(member.id(), self.kind);
            member.receive(packet, self.kind, rssi);
        }
    }
}
