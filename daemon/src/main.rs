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

//! Wireless network simulator for emulated devices.

use clap::Parser;
use log::{error, info};
use radiosim_common::system::radiosimd_temp_dir;
use radiosim_common::util::logger;
use radiosim_common::util::os_utils::{get_instance, get_stream_port};
use radiosim_daemon::args::RadiosimdArgs;
use radiosim_daemon::config::Config;
use radiosim_daemon::service::{run, SimulationContext};
use radiosim_daemon::version::get_version;
use radiosim_daemon::wireless::bluetooth::loopback::LoopbackFactory;

fn main() {
    let args = RadiosimdArgs::parse();
    if args.version {
        println!("Radiosimd Version: {}", get_version());
        return;
    }
    logger::init("radiosimd", args.verbose);

    info!("radiosim artifacts path: {:?}", radiosimd_temp_dir());
    info!("{:#?}", args);

    let instance_num = get_instance(args.instance);
    let port = get_stream_port(args.port, instance_num);
    let config = Config::new(args.capture);

    // No vendor HCI controller library is linked into this binary; the
    // loopback model stands in. Wifi and uwb run without their services.
    let controller = LoopbackFactory::new();
    let ctx = SimulationContext::new(&config, &controller, None, None);

    if let Err(err) = run(ctx, instance_num, port) {
        error!("radiosimd stopped: {err:?}");
    }
}
