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

//! The packet hub routes frames between stream sessions and radio facades.
//!
//! The hub is a pure dispatcher: it taps the capture observer on both
//! directions and never parses packet contents. Inbound frames go to the
//! facade for the chip kind; outbound frames go to the session registered
//! under `(kind, facade_id)` and are dropped with a warning when the
//! session is gone.

use crate::captures::capture::Captures;
use crate::captures::pcap::PacketDirection;
use crate::transport::session::SessionWriter;
use crate::wireless::FacadeRegistry;
use bytes::Bytes;
use log::{error, warn};
use radiosim_model::{ChipKind, DeviceId, FacadeId, HciPacketType};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Facades emit controller-to-host frames through this capability.
pub trait ResponseSink: Send + Sync {
    fn handle_response(
        &self,
        kind: ChipKind,
        facade_id: FacadeId,
        packet: &Bytes,
        packet_type: HciPacketType,
    );
}

/// One routing table entry, installed by session setup.
pub struct Route {
    pub device_id: DeviceId,
    pub writer: SessionWriter,
}

/// The routing table: `(kind, facade_id)` to the owning session and device.
/// Written only by session setup and teardown; the device mapping is also
/// read by the bluetooth air model for spatial lookups.
pub struct Routes {
    entries: RwLock<HashMap<(ChipKind, FacadeId), Route>>,
}

impl Routes {
    pub fn new() -> Self {
        Routes { entries: RwLock::new(HashMap::new()) }
    }

    pub fn register(&self, kind: ChipKind, facade_id: FacadeId, route: Route) {
        if self.entries.write().unwrap().insert((kind, facade_id), route).is_some() {
            error!("register: route already present for {kind}/{facade_id}");
        }
    }

    pub fn unregister(&self, kind: ChipKind, facade_id: FacadeId) {
        self.entries.write().unwrap().remove(&(kind, facade_id));
    }

    /// The device owning a facade endpoint, for RSSI spatial lookups.
    pub fn device_for(&self, kind: ChipKind, facade_id: FacadeId) -> Option<DeviceId> {
        self.entries.read().unwrap().get(&(kind, facade_id)).map(|route| route.device_id)
    }

    fn writer_for(&self, kind: ChipKind, facade_id: FacadeId) -> Option<SessionWriter> {
        self.entries.read().unwrap().get(&(kind, facade_id)).map(|route| route.writer.clone())
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PacketHub {
    routes: Arc<Routes>,
    captures: Arc<Captures>,
    // Set once at the composition root, after the facades exist.
    registry: OnceLock<Arc<FacadeRegistry>>,
}

impl PacketHub {
    pub fn new(routes: Arc<Routes>, captures: Arc<Captures>) -> Self {
        PacketHub { routes, captures, registry: OnceLock::new() }
    }

    pub fn connect_registry(&self, registry: Arc<FacadeRegistry>) {
        if self.registry.set(registry).is_err() {
            error!("connect_registry: registry already connected");
        }
    }

    /// Host-to-controller dispatch, called by the session reader.
    pub fn handle_request(
        &self,
        kind: ChipKind,
        facade_id: FacadeId,
        packet: &Bytes,
        packet_type: HciPacketType,
    ) {
        self.captures.tap(kind, facade_id, packet, PacketDirection::HostToController, packet_type);
        match self.registry.get() {
            Some(registry) => registry.handle_request(kind, facade_id, packet, packet_type),
            None => warn!("handle_request: no facade registry connected"),
        }
    }
}

impl ResponseSink for PacketHub {
    /// Controller-to-host dispatch, called by facades.
    fn handle_response(
        &self,
        kind: ChipKind,
        facade_id: FacadeId,
        packet: &Bytes,
        packet_type: HciPacketType,
    ) {
        self.captures.tap(kind, facade_id, packet, PacketDirection::ControllerToHost, packet_type);
        match self.routes.writer_for(kind, facade_id) {
            Some(writer) => {
                if !writer.write(packet_type, packet.clone()) {
                    warn!("handle_response: session closed for {kind}/{facade_id}, dropping");
                }
            }
            None => warn!("handle_response: no session for {kind}/{facade_id}, dropping"),
        }
    }
}
