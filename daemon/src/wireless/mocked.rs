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

//! A mocked radio facade for scene and hub tests.

use crate::devices::ids::IdFactory;
use crate::wireless::RadioFacade;
use bytes::Bytes;
use radiosim_model::patch::ChipRadioPatch;
use radiosim_model::snapshot::{ChipRadio, RadioSnapshot};
use radiosim_model::{ChipId, FacadeId, HciPacketType, RadioState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

/// Records facade calls so tests can assert on the lifecycle.
pub struct MockRadioFacade {
    ids: IdFactory,
    chips: RwLock<HashMap<FacadeId, ChipId>>,
    pub removes: AtomicU32,
    pub resets: AtomicU32,
    pub patches: AtomicU32,
    pub requests: AtomicU32,
}

impl MockRadioFacade {
    pub fn new() -> Self {
        MockRadioFacade {
            ids: IdFactory::new(),
            chips: RwLock::new(HashMap::new()),
            removes: AtomicU32::new(0),
            resets: AtomicU32::new(0),
            patches: AtomicU32::new(0),
            requests: AtomicU32::new(0),
        }
    }

    pub fn chip_count(&self) -> usize {
        self.chips.read().unwrap().len()
    }
}

impl Default for MockRadioFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioFacade for MockRadioFacade {
    fn add(&self, chip_id: ChipId) -> FacadeId {
        let facade_id = self.ids.next_id();
        self.chips.write().unwrap().insert(facade_id, chip_id);
        facade_id
    }

    fn remove(&self, facade_id: FacadeId) {
        self.chips.write().unwrap().remove(&facade_id);
        self.removes.fetch_add(1, Ordering::SeqCst);
    }

    fn reset(&self, _facade_id: FacadeId) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn patch(&self, _facade_id: FacadeId, _patch: &ChipRadioPatch) {
        self.patches.fetch_add(1, Ordering::SeqCst);
    }

    fn get(&self, facade_id: FacadeId) -> Option<ChipRadio> {
        self.chips.read().unwrap().get(&facade_id)?;
        Some(ChipRadio::Wifi(RadioSnapshot {
            state: RadioState::On,
            tx_count: 0,
            rx_count: 0,
        }))
    }

    fn handle_request(&self, _facade_id: FacadeId, _packet: &Bytes, _packet_type: HciPacketType) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}
