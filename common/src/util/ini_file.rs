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

//! # The discovery file
//!
//! A simple `key=value` file, one pair per line with whitespace trimmed.
//! Running simulators advertise their listen port here so peers and tools
//! can find them.

use std::collections::HashMap;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, Result};
use std::path::PathBuf;

use crate::util::os_utils::get_discovery_directory;

/// In-memory copy of one ini file.
pub struct IniFile {
    data: HashMap<String, String>,
    filepath: PathBuf,
}

impl IniFile {
    pub fn new(filepath: PathBuf) -> IniFile {
        IniFile { data: HashMap::new(), filepath }
    }

    /// Reads data into IniFile from the backing file, overwriting any
    /// existing data. Lines without a `=` are skipped.
    pub fn read(&mut self) -> Result<()> {
        self.data.clear();

        let mut f = File::open(self.filepath.clone())?;
        let reader = BufReader::new(&mut f);

        for line in reader.lines() {
            let line = line?;
            if let Some((key, value)) = line.split_once('=') {
                self.data.insert(key.trim().to_owned(), value.trim().to_owned());
            }
        }

        Ok(())
    }

    /// Writes the current IniFile to the backing file.
    pub fn write(&self) -> Result<()> {
        let mut f = File::create(self.filepath.clone())?;
        for (key, value) in &self.data {
            writeln!(&mut f, "{}={}", key, value)?;
        }
        f.flush()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|v| v.as_str())
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_owned(), value.to_owned());
    }
}

/// Path of the discovery file for a simulator instance.
pub fn ini_filepath(instance_num: u16) -> PathBuf {
    let mut discovery_dir = get_discovery_directory();
    discovery_dir.push(format!("radiosim_{instance_num}.ini"));
    discovery_dir
}

/// Write the discovery file advertising the stream server port.
pub fn create_ini(instance_num: u16, port: u16) -> Result<()> {
    let mut ini_file = IniFile::new(ini_filepath(instance_num));
    ini_file.insert("grpc.port", &port.to_string());
    ini_file.write()
}

/// Remove the discovery file on shutdown.
pub fn remove_ini(instance_num: u16) -> Result<()> {
    std::fs::remove_file(ini_filepath(instance_num))
}

/// Read the server address of a running simulator from the discovery file.
pub fn get_server_address(instance_num: u16) -> Option<String> {
    let filepath = ini_filepath(instance_num);
    if !filepath.exists() {
        return None;
    }
    let mut ini_file = IniFile::new(filepath);
    if ini_file.read().is_err() {
        return None;
    }
    ini_file.get("grpc.port").map(|port| format!("localhost:{}", port))
}
