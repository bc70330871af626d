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

//! The composition root.
//!
//! All long-lived components are constructed here and passed by handle;
//! nothing in the core is a process-wide singleton, so tests build their
//! own `SimulationContext` with their own controller and service doubles.

use crate::captures::capture::Captures;
use crate::config::Config;
use crate::devices::pose::PoseStore;
use crate::devices::SceneController;
use crate::hub::{PacketHub, Routes};
use crate::notify::NotifyBus;
use crate::transport::server::run_stream_server;
use crate::wireless::bluetooth::controller::ControllerFactory;
use crate::wireless::bluetooth::BluetoothFacade;
use crate::wireless::uwb::{UwbFacade, UwbService};
use crate::wireless::wifi::{WifiFacade, WifiService};
use crate::wireless::{FacadeRegistry, RadioFacade};
use anyhow::Context;
use log::{error, info};
use radiosim_common::util::ini_file::{create_ini, remove_ini};
use std::sync::Arc;

/// Handles to every long-lived component of the simulator core.
pub struct SimulationContext {
    pub scene: Arc<SceneController>,
    pub hub: Arc<PacketHub>,
    pub routes: Arc<Routes>,
    pub registry: Arc<FacadeRegistry>,
    pub captures: Arc<Captures>,
    pub notify: Arc<NotifyBus>,
    pub pose: Arc<PoseStore>,
}

impl SimulationContext {
    /// Wire the core together. The bluetooth controller library and the
    /// wifi/uwb services are collaborators supplied by the caller.
    pub fn new(
        config: &Config,
        controller: &dyn ControllerFactory,
        wifi_service: Option<Arc<dyn WifiService>>,
        uwb_service: Option<Arc<dyn UwbService>>,
    ) -> Arc<Self> {
        let pose = Arc::new(PoseStore::new());
        let notify = Arc::new(NotifyBus::new());
        let routes = Arc::new(Routes::new());
        let captures = Arc::new(Captures::new(
            config.capture_dir.clone(),
            config.capture_at_startup,
        ));
        let hub = Arc::new(PacketHub::new(routes.clone(), captures.clone()));

        let bluetooth: Arc<dyn RadioFacade> = Arc::new(BluetoothFacade::new(
            controller,
            routes.clone(),
            pose.clone(),
            hub.clone(),
        ));
        let wifi: Arc<dyn RadioFacade> = WifiFacade::new(wifi_service, hub.clone());
        let uwb: Arc<dyn RadioFacade> = Arc::new(UwbFacade::new(uwb_service));
        let registry = Arc::new(FacadeRegistry::new(bluetooth, wifi, uwb));
        hub.connect_registry(registry.clone());

        let scene = Arc::new(SceneController::new(
            registry.clone(),
            pose.clone(),
            captures.clone(),
            notify.clone(),
        ));

        Arc::new(SimulationContext { scene, hub, routes, registry, captures, notify, pose })
    }
}

/// Run the stream server until the acceptor exits. Advertises the bound
/// port in the discovery file and removes it on the way out.
pub fn run(ctx: Arc<SimulationContext>, instance_num: u16, port: u16) -> anyhow::Result<()> {
    let (port, acceptor) =
        run_stream_server(ctx, port).context("unable to start the stream server")?;

    if let Err(err) = create_ini(instance_num, port) {
        error!("failed to write discovery file: {err}");
    }
    info!("radiosimd instance {instance_num} serving on port {port}");

    let _ = acceptor.join();

    if let Err(err) = remove_ini(instance_num) {
        error!("failed to remove discovery file: {err}");
    }
    Ok(())
}
