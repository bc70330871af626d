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

//! The UWB facade: radio state, counters and plumbing into a UCI service.
//!
//! Link-layer modelling lives in the external ranging service; without one
//! the facade keeps state and counters only.

use crate::devices::ids::IdFactory;
use crate::wireless::RadioFacade;
use bytes::Bytes;
use log::{debug, info, warn};
use radiosim_model::patch::ChipRadioPatch;
use radiosim_model::snapshot::{ChipRadio, RadioSnapshot};
use radiosim_model::{ChipId, FacadeId, HciPacketType, RadioState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// The external UCI ranging service collaborator.
pub trait UwbService: Send + Sync {
    fn submit(&self, facade_id: FacadeId, packet: &Bytes);
}

struct ChipState {
    chip_id: ChipId,
    state: Mutex<RadioState>,
    tx_count: AtomicU64,
    rx_count: AtomicU64,
}

pub struct UwbFacade {
    ids: IdFactory,
    chips: RwLock<HashMap<FacadeId, Arc<ChipState>>>,
    service: Option<Arc<dyn UwbService>>,
}

impl UwbFacade {
    pub fn new(service: Option<Arc<dyn UwbService>>) -> Self {
        UwbFacade { ids: IdFactory::new(), chips: RwLock::new(HashMap::new()), service }
    }
}

impl RadioFacade for UwbFacade {
    fn add(&self, chip_id: ChipId) -> FacadeId {
        let facade_id = self.ids.next_id();
        self.chips.write().unwrap().insert(
            facade_id,
            Arc::new(ChipState {
                chip_id,
                state: Mutex::new(RadioState::On),
                tx_count: AtomicU64::new(0),
                rx_count: AtomicU64::new(0),
            }),
        );
        info!("uwb chip created, facade_id: {facade_id} chip_id: {chip_id}");
        facade_id
    }

    fn remove(&self, facade_id: FacadeId) {
        match self.chips.write().unwrap().remove(&facade_id) {
            Some(chip) => info!("removing uwb chip {} facade {facade_id}", chip.chip_id),
            None => warn!("uwb remove: unknown facade_id {facade_id}"),
        }
    }

    fn reset(&self, facade_id: FacadeId) {
        let Some(chip) = self.chips.read().unwrap().get(&facade_id).cloned() else {
            warn!("uwb reset: unknown facade_id {facade_id}");
            return;
        };
        *chip.state.lock().unwrap() = RadioState::On;
        chip.tx_count.store(0, Ordering::Relaxed);
        chip.rx_count.store(0, Ordering::Relaxed);
    }

    fn patch(&self, facade_id: FacadeId, patch: &ChipRadioPatch) {
        let ChipRadioPatch::Uwb { state: Some(request) } = patch else {
            if !matches!(patch, ChipRadioPatch::Uwb { .. }) {
                warn!("uwb patch: wrong patch kind for facade_id {facade_id}");
            }
            return;
        };
        if *request == RadioState::Unknown {
            return;
        }
        let Some(chip) = self.chips.read().unwrap().get(&facade_id).cloned() else {
            warn!("uwb patch: unknown facade_id {facade_id}");
            return;
        };
        let mut state = chip.state.lock().unwrap();
        if *state != *request {
            *state = *request;
        }
    }

    fn get(&self, facade_id: FacadeId) -> Option<ChipRadio> {
        let chip = self.chips.read().unwrap().get(&facade_id).cloned()?;
        let state = *chip.state.lock().unwrap();
        Some(ChipRadio::Uwb(RadioSnapshot {
            state,
            tx_count: chip.tx_count.load(Ordering::Relaxed),
            rx_count: chip.rx_count.load(Ordering::Relaxed),
        }))
    }

    fn handle_request(&self, facade_id: FacadeId, packet: &Bytes, _packet_type: HciPacketType) {
        let Some(chip) = self.chips.read().unwrap().get(&facade_id).cloned() else {
            warn!("uwb handle_request: unknown facade_id {facade_id}");
            return;
        };
        if !chip.state.lock().unwrap().is_on() {
            debug!("uwb handle_request: radio off, dropping frame for {facade_id}");
            return;
        }
        chip.tx_count.fetch_add(1, Ordering::Relaxed);
        if let Some(service) = &self.service {
            service.submit(facade_id, packet);
        }
    }
}
