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

//! Interface to the HCI controller library.
//!
//! The controller library owns an event loop; every call into it is
//! marshalled onto that loop through [`Scheduler::synchronize`]. Callbacks
//! out of the controller run on the controller thread and must not block.

use crate::hub::ResponseSink;
use bytes::Bytes;
use log::{info, warn};
use radiosim_model::{ChipKind, HciPacketType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;

use super::phy::SimPhy;

/// Identifier the controller library assigns to a connection. The facade
/// uses it as the chip's facade id.
pub type ControllerId = u32;

/// The two simulated phys. Ordinals are stable: BR/EDR is 0, LE is 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhyKind {
    BrEdr,
    LowEnergy,
}

impl PhyKind {
    pub fn index(&self) -> usize {
        match self {
            PhyKind::BrEdr => 0,
            PhyKind::LowEnergy => 1,
        }
    }
}

/// Controller quirks configured at model creation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControllerProperties {
    /// Emit a hardware-error event when HCI commands arrive before an HCI
    /// Reset. A peer restoring from a snapshot reconnects with a fresh
    /// controller but an initialized stack; the error event triggers the
    /// stack's reset path.
    pub hardware_error_before_reset: bool,
}

type Task = Box<dyn FnOnce() + Send>;

/// Handle to the controller event loop: a closure queue drained by a
/// dedicated thread.
#[derive(Clone)]
pub struct Scheduler {
    tx: Sender<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        let (tx, rx) = channel::<Task>();
        let _ = thread::Builder::new().name("bt_controller_loop".to_string()).spawn(move || {
            info!("controller loop started");
            while let Ok(task) = rx.recv() {
                task();
            }
            info!("controller loop finished");
        });
        Scheduler { tx }
    }

    /// Run a closure on the controller loop, in queue order.
    pub fn synchronize(&self, task: Task) {
        if self.tx.send(task).is_err() {
            warn!("controller loop stopped, dropping task");
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Callbacks the controller library registers on a transport.
pub struct TransportCallbacks {
    /// Host-to-controller packet delivery, invoked on the controller loop.
    pub packet: Box<dyn Fn(HciPacketType, Bytes) + Send + Sync>,
    /// Teardown notification from the controller side.
    pub close: Box<dyn Fn() + Send + Sync>,
}

/// Connects HCI packets between the packet hub and the controller library.
///
/// The facade injects peer frames with [`request`](Self::request); the
/// library emits controller frames with [`send`](Self::send). Controller
/// callbacks after [`close`](Self::close) are ignored.
pub struct HciPacketTransport {
    scheduler: Scheduler,
    sink: Arc<dyn ResponseSink>,
    controller_id: OnceLock<ControllerId>,
    callbacks: Mutex<Option<Arc<TransportCallbacks>>>,
    closed: AtomicBool,
}

impl HciPacketTransport {
    pub fn new(scheduler: Scheduler, sink: Arc<dyn ResponseSink>) -> Self {
        HciPacketTransport {
            scheduler,
            sink,
            controller_id: OnceLock::new(),
            callbacks: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Bind the transport to its controller id. Called once by the facade
    /// after `add_connection` returns.
    pub fn connect(&self, controller_id: ControllerId) {
        if self.controller_id.set(controller_id).is_err() {
            warn!("hci transport: already connected");
        }
    }

    /// Called once by the controller library.
    pub fn register(&self, callbacks: TransportCallbacks) {
        *self.callbacks.lock().unwrap() = Some(Arc::new(callbacks));
    }

    /// Controller-to-host frame, forwarded to the packet hub.
    pub fn send(&self, packet_type: HciPacketType, packet: Bytes) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        match self.controller_id.get() {
            Some(id) => self.sink.handle_response(ChipKind::Bluetooth, *id, &packet, packet_type),
            None => warn!("hci transport: response with no device"),
        }
    }

    /// Host-to-controller frame, delivered to the registered packet
    /// callback under the controller loop.
    pub fn request(&self, packet_type: HciPacketType, packet: Bytes) {
        if self.closed.load(Ordering::SeqCst) {
            warn!("hci transport: request after close");
            return;
        }
        let callbacks = self.callbacks.lock().unwrap().clone();
        match callbacks {
            Some(callbacks) => self
                .scheduler
                .synchronize(Box::new(move || (callbacks.packet)(packet_type, packet))),
            None => warn!("hci transport: request before register"),
        }
    }

    /// Idempotent teardown from either side. Later controller callbacks
    /// are ignored.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            *self.callbacks.lock().unwrap() = None;
        }
    }
}

/// The surface of the controller library consumed by the facade.
pub trait ControllerModel: Send + Sync {
    /// Create a controller wired to `transport` and return its id.
    fn add_connection(&self, transport: Arc<HciPacketTransport>) -> ControllerId;

    /// Remove a controller. The library closes the transport.
    fn remove_device(&self, controller_id: ControllerId);

    fn add_device_to_phy(&self, controller_id: ControllerId, phy: PhyKind);

    fn remove_device_from_phy(&self, controller_id: ControllerId, phy: PhyKind);
}

/// Constructs the controller model with the facade-provided pieces: the
/// event loop, the two interposed phys and the controller quirks.
pub trait ControllerFactory: Send + Sync {
    fn create(
        &self,
        scheduler: Scheduler,
        phys: [Arc<SimPhy>; 2],
        properties: ControllerProperties,
    ) -> Arc<dyn ControllerModel>;
}
