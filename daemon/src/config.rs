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

//! Daemon configuration, resolved once at startup from the CLI args.

use std::path::PathBuf;

pub struct Config {
    /// Open a capture sink for every chip as it attaches.
    pub capture_at_startup: bool,
    /// Directory holding per-chip capture files.
    pub capture_dir: PathBuf,
}

impl Config {
    pub fn new(capture_at_startup: bool) -> Self {
        Config {
            capture_at_startup,
            capture_dir: radiosim_common::system::radiosimd_temp_dir().join("captures"),
        }
    }
}
