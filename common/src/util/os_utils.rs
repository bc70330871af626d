//
//  Copyright 2024 Google, Inc.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at:
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! # os utility functions

use std::path::PathBuf;

use log::warn;

const DEFAULT_STREAM_PORT: u16 = 7800;
const DEFAULT_INSTANCE: u16 = 1;

struct DiscoveryDir {
    root_env: &'static str,
    subdir: &'static str,
}

#[cfg(target_os = "linux")]
const DISCOVERY: DiscoveryDir = DiscoveryDir { root_env: "XDG_RUNTIME_DIR", subdir: "" };
#[cfg(target_os = "macos")]
const DISCOVERY: DiscoveryDir =
    DiscoveryDir { root_env: "HOME", subdir: "Library/Caches/TemporaryItems" };
#[cfg(target_os = "windows")]
const DISCOVERY: DiscoveryDir = DiscoveryDir { root_env: "LOCALAPPDATA", subdir: "Temp" };
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
compile_error!("radiosim only supports linux, Mac, and Windows");

/// Get the directory holding discovery files.
pub fn get_discovery_directory() -> PathBuf {
    // $TMPDIR is the temp directory on buildbots
    if let Ok(test_env_p) = std::env::var("TMPDIR") {
        return PathBuf::from(test_env_p);
    }
    let mut path = match std::env::var(DISCOVERY.root_env) {
        Ok(env_p) => PathBuf::from(env_p),
        Err(_) => {
            warn!("No discovery env for {}, using /tmp", DISCOVERY.root_env);
            PathBuf::from("/tmp")
        }
    };
    path.push(DISCOVERY.subdir);
    path
}

/// Get the simulator instance number which is always > 0.
///
/// The following priorities are used to determine the instance number:
///
/// 1. The environment variable `RADIOSIM_INSTANCE`.
/// 2. The CLI flag `--instance`.
/// 3. The default value `DEFAULT_INSTANCE`.
pub fn get_instance(instance_flag: Option<u16>) -> u16 {
    let instance_env: Option<u16> =
        std::env::var("RADIOSIM_INSTANCE").ok().and_then(|i| i.parse().ok());
    match (instance_env, instance_flag) {
        (Some(i), _) if i > 0 => i,
        (_, Some(i)) if i > 0 => i,
        (_, _) => DEFAULT_INSTANCE,
    }
}

/// Get the packet stream port for a simulator instance.
///
/// The following priorities are used to determine the port number:
///
/// 1. The CLI flag `--port`.
/// 2. The environment variable `RADIOSIM_STREAM_PORT`.
/// 3. The default value `DEFAULT_STREAM_PORT + instance`.
pub fn get_stream_port(port_flag: Option<u16>, instance: u16) -> u16 {
    if let Some(port) = port_flag {
        return port;
    }
    if let Ok(port) = std::env::var("RADIOSIM_STREAM_PORT") {
        match port.parse::<u16>() {
            Ok(port) => return port,
            Err(err) => warn!("Ignoring invalid RADIOSIM_STREAM_PORT: {err}"),
        }
    }
    DEFAULT_STREAM_PORT + instance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::ENV_MUTEX;
    use std::env;

    #[test]
    fn test_get_instance() {
        let _locked = ENV_MUTEX.lock();
        env::remove_var("RADIOSIM_INSTANCE");
        assert_eq!(get_instance(None), 1);
        assert_eq!(get_instance(Some(0)), 1);
        assert_eq!(get_instance(Some(3)), 3);
        env::set_var("RADIOSIM_INSTANCE", "2");
        assert_eq!(get_instance(Some(3)), 2);
        env::remove_var("RADIOSIM_INSTANCE");
    }

    #[test]
    fn test_get_stream_port() {
        let _locked = ENV_MUTEX.lock();
        env::remove_var("RADIOSIM_STREAM_PORT");
        assert_eq!(get_stream_port(None, 1), DEFAULT_STREAM_PORT + 1);
        assert_eq!(get_stream_port(Some(9000), 1), 9000);
        env::set_var("RADIOSIM_STREAM_PORT", "8123");
        assert_eq!(get_stream_port(None, 1), 8123);
        env::remove_var("RADIOSIM_STREAM_PORT");
    }
}
