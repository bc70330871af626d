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

//! Radio facades, one per chip kind, and the registry that routes to them.

pub mod bluetooth;
pub mod mocked;
pub mod uwb;
pub mod wifi;

use bytes::Bytes;
use radiosim_model::patch::ChipRadioPatch;
use radiosim_model::snapshot::ChipRadio;
use radiosim_model::{ChipId, ChipKind, FacadeId, HciPacketType};
use std::sync::Arc;

/// The uniform per-kind facade contract.
///
/// A facade owns the kind-specific state of every chip of its kind and
/// models the radio's behavior. Operations with an unknown `facade_id`
/// log a warning and are a no-op.
pub trait RadioFacade: Send + Sync {
    /// Allocate per-chip state and return the facade endpoint id.
    fn add(&self, chip_id: ChipId) -> FacadeId;

    /// Drop per-chip state. Called before the chip record is removed.
    fn remove(&self, facade_id: FacadeId);

    /// Return the chip to its default ON state with zeroed counters.
    fn reset(&self, facade_id: FacadeId);

    /// Apply a kind-specific patch. Idempotent: a field is applied only
    /// when present, different from the current state and not UNKNOWN.
    fn patch(&self, facade_id: FacadeId, patch: &ChipRadioPatch);

    /// Kind-specific snapshot including counters.
    fn get(&self, facade_id: FacadeId) -> Option<ChipRadio>;

    /// Inbound host-to-controller packet from the peer.
    fn handle_request(&self, facade_id: FacadeId, packet: &Bytes, packet_type: HciPacketType);
}

/// One facade instance per kind. The registry itself is stateless.
pub struct FacadeRegistry {
    bluetooth: Arc<dyn RadioFacade>,
    wifi: Arc<dyn RadioFacade>,
    uwb: Arc<dyn RadioFacade>,
}

impl FacadeRegistry {
    pub fn new(
        bluetooth: Arc<dyn RadioFacade>,
        wifi: Arc<dyn RadioFacade>,
        uwb: Arc<dyn RadioFacade>,
    ) -> Self {
        FacadeRegistry { bluetooth, wifi, uwb }
    }

    pub fn facade(&self, kind: ChipKind) -> &Arc<dyn RadioFacade> {
        match kind {
            ChipKind::Bluetooth => &self.bluetooth,
            ChipKind::Wifi => &self.wifi,
            ChipKind::Uwb => &self.uwb,
        }
    }

    pub fn add(&self, kind: ChipKind, chip_id: ChipId) -> FacadeId {
        self.facade(kind).add(chip_id)
    }

    pub fn remove(&self, kind: ChipKind, facade_id: FacadeId) {
        self.facade(kind).remove(facade_id)
    }

    pub fn reset(&self, kind: ChipKind, facade_id: FacadeId) {
        self.facade(kind).reset(facade_id)
    }

    pub fn patch(&self, kind: ChipKind, facade_id: FacadeId, patch: &ChipRadioPatch) {
        self.facade(kind).patch(facade_id, patch)
    }

    pub fn get(&self, kind: ChipKind, facade_id: FacadeId) -> Option<ChipRadio> {
        self.facade(kind).get(facade_id)
    }

    pub fn handle_request(
        &self,
        kind: ChipKind,
        facade_id: FacadeId,
        packet: &Bytes,
        packet_type: HciPacketType,
    ) {
        self.facade(kind).handle_request(facade_id, packet, packet_type)
    }
}
