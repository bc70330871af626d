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

//! The WiFi facade: per-chip radio state, counters and broadcast fan-out.
//!
//! Frame handling is delegated to a shared WiFi service modelling a
//! hostapd and a user-space IP stack. Without a service the facade only
//! keeps state and counters; submitted frames go nowhere.

use crate::devices::ids::IdFactory;
use crate::hub::ResponseSink;
use crate::wireless::RadioFacade;
use bytes::Bytes;
use log::{debug, info, warn};
use radiosim_model::patch::ChipRadioPatch;
use radiosim_model::snapshot::{ChipRadio, RadioSnapshot};
use radiosim_model::{ChipId, ChipKind, FacadeId, HciPacketType, RadioState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// The shared WiFi service collaborator. Frames submitted by chips come
/// back through the receiver callback, on any of the service's threads.
pub trait WifiService: Send + Sync {
    fn register_receiver(&self, receiver: Box<dyn Fn(&Bytes) + Send + Sync>);
    fn submit(&self, facade_id: FacadeId, packet: &Bytes);
}

struct ChipState {
    chip_id: ChipId,
    state: Mutex<RadioState>,
    tx_count: AtomicU64,
    rx_count: AtomicU64,
}

pub struct WifiFacade {
    ids: IdFactory,
    chips: RwLock<HashMap<FacadeId, Arc<ChipState>>>,
    service: Option<Arc<dyn WifiService>>,
    sink: Arc<dyn ResponseSink>,
}

impl WifiFacade {
    pub fn new(service: Option<Arc<dyn WifiService>>, sink: Arc<dyn ResponseSink>) -> Arc<Self> {
        let facade = Arc::new(WifiFacade {
            ids: IdFactory::new(),
            chips: RwLock::new(HashMap::new()),
            service,
            sink,
        });
        if let Some(service) = &facade.service {
            let weak = Arc::downgrade(&facade);
            service.register_receiver(Box::new(move |packet| {
                if let Some(facade) = weak.upgrade() {
                    facade.broadcast(packet);
                }
            }));
        }
        facade
    }

    /// Service receive path: deliver to every chip whose radio is ON.
    fn broadcast(&self, packet: &Bytes) {
        let chips: Vec<(FacadeId, Arc<ChipState>)> =
            self.chips.read().unwrap().iter().map(|(id, chip)| (*id, chip.clone())).collect();
        for (facade_id, chip) in chips {
            if !chip.state.lock().unwrap().is_on() {
                continue;
            }
            chip.rx_count.fetch_add(1, Ordering::Relaxed);
            self.sink.handle_response(
                ChipKind::Wifi,
                facade_id,
                packet,
                HciPacketType::Unspecified,
            );
        }
    }
}

impl RadioFacade for WifiFacade {
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
        info!("wifi chip created, facade_id: {facade_id} chip_id: {chip_id}");
        facade_id
    }

    fn remove(&self, facade_id: FacadeId) {
        match self.chips.write().unwrap().remove(&facade_id) {
            Some(chip) => info!("removing wifi chip {} facade {facade_id}", chip.chip_id),
            None => warn!("wifi remove: unknown facade_id {facade_id}"),
        }
    }

    fn reset(&self, facade_id: FacadeId) {
        let Some(chip) = self.chips.read().unwrap().get(&facade_id).cloned() else {
            warn!("wifi reset: unknown facade_id {facade_id}");
            return;
        };
        *chip.state.lock().unwrap() = RadioState::On;
        chip.tx_count.store(0, Ordering::Relaxed);
        chip.rx_count.store(0, Ordering::Relaxed);
    }

    fn patch(&self, facade_id: FacadeId, patch: &ChipRadioPatch) {
        let ChipRadioPatch::Wifi { state: Some(request) } = patch else {
            if !matches!(patch, ChipRadioPatch::Wifi { .. }) {
                warn!("wifi patch: wrong patch kind for facade_id {facade_id}");
            }
            return;
        };
        if *request == RadioState::Unknown {
            return;
        }
        let Some(chip) = self.chips.read().unwrap().get(&facade_id).cloned() else {
            warn!("wifi patch: unknown facade_id {facade_id}");
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
        Some(ChipRadio::Wifi(RadioSnapshot {
            state,
            tx_count: chip.tx_count.load(Ordering::Relaxed),
            rx_count: chip.rx_count.load(Ordering::Relaxed),
        }))
    }

    fn handle_request(&self, facade_id: FacadeId, packet: &Bytes, _packet_type: HciPacketType) {
        let Some(chip) = self.chips.read().unwrap().get(&facade_id).cloned() else {
            warn!("wifi handle_request: unknown facade_id {facade_id}");
            return;
        };
        if !chip.state.lock().unwrap().is_on() {
            debug!("wifi handle_request: radio off, dropping frame for {facade_id}");
            return;
        }
        // TX counts before the frame is offered to the service.
        chip.tx_count.fetch_add(1, Ordering::Relaxed);
        if let Some(service) = &self.service {
            service.submit(facade_id, packet);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test::EchoWifiService;
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingSink {
        responses: StdMutex<Vec<(ChipKind, FacadeId, Vec<u8>)>>,
    }

    impl ResponseSink for RecordingSink {
        fn handle_response(
            &self,
            kind: ChipKind,
            facade_id: FacadeId,
            packet: &Bytes,
            _packet_type: HciPacketType,
        ) {
            self.responses.lock().unwrap().push((kind, facade_id, packet.to_vec()));
        }
    }

    fn wifi_snapshot(facade: &WifiFacade, facade_id: FacadeId) -> RadioSnapshot {
        match facade.get(facade_id) {
            Some(ChipRadio::Wifi(snapshot)) => snapshot,
            _ => panic!("missing wifi snapshot"),
        }
    }

    #[test]
    fn test_broadcast_reaches_on_chips_only() {
        let sink = Arc::new(RecordingSink::default());
        let service = Arc::new(EchoWifiService::default());
        let facade = WifiFacade::new(Some(service), sink.clone());
        let a = facade.add(1);
        let b = facade.add(2);
        facade.patch(b, &ChipRadioPatch::Wifi { state: Some(RadioState::Off) });

        facade.handle_request(a, &Bytes::from_static(&[1, 2, 3]), HciPacketType::Unspecified);

        // The echo service reflected the frame: a receives, b is off.
        let responses = sink.responses.lock().unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0], (ChipKind::Wifi, a, vec![1, 2, 3]));
        drop(responses);

        assert_eq!(wifi_snapshot(&facade, a).tx_count, 1);
        assert_eq!(wifi_snapshot(&facade, a).rx_count, 1);
        assert_eq!(wifi_snapshot(&facade, b).rx_count, 0);
    }

    #[test]
    fn test_request_dropped_when_off() {
        let sink = Arc::new(RecordingSink::default());
        let facade = WifiFacade::new(Some(Arc::new(EchoWifiService::default())), sink.clone());
        let a = facade.add(1);
        facade.patch(a, &ChipRadioPatch::Wifi { state: Some(RadioState::Off) });
        facade.handle_request(a, &Bytes::from_static(&[9]), HciPacketType::Unspecified);
        assert_eq!(wifi_snapshot(&facade, a).tx_count, 0);
        assert!(sink.responses.lock().unwrap().is_empty());
    }

    #[test]
    fn test_patch_unknown_is_noop_and_idempotent() {
        let sink = Arc::new(RecordingSink::default());
        let facade = WifiFacade::new(None, sink);
        let a = facade.add(1);
        facade.patch(a, &ChipRadioPatch::Wifi { state: Some(RadioState::Unknown) });
        assert_eq!(wifi_snapshot(&facade, a).state, RadioState::On);
        facade.patch(a, &ChipRadioPatch::Wifi { state: Some(RadioState::Off) });
        facade.patch(a, &ChipRadioPatch::Wifi { state: Some(RadioState::Off) });
        assert_eq!(wifi_snapshot(&facade, a).state, RadioState::Off);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let sink = Arc::new(RecordingSink::default());
        let service = Arc::new(EchoWifiService::default());
        let facade = WifiFacade::new(Some(service), sink);
        let a = facade.add(1);
        facade.handle_request(a, &Bytes::from_static(&[1]), HciPacketType::Unspecified);
        facade.patch(a, &ChipRadioPatch::Wifi { state: Some(RadioState::Off) });
        facade.reset(a);
        let snapshot = wifi_snapshot(&facade, a);
        assert_eq!(snapshot.state, RadioState::On);
        assert_eq!(snapshot.tx_count, 0);
        assert_eq!(snapshot.rx_count, 0);
    }

    #[test]
    fn test_no_service_counts_but_drops() {
        let sink = Arc::new(RecordingSink::default());
        let facade = WifiFacade::new(None, sink.clone());
        let a = facade.add(1);
        facade.handle_request(a, &Bytes::from_static(&[5]), HciPacketType::Unspecified);
        assert_eq!(wifi_snapshot(&facade, a).tx_count, 1);
        assert!(sink.responses.lock().unwrap().is_empty());
    }
}
