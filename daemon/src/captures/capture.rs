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

//! Per-chip packet capture sinks and the tap invoked by the packet hub.
//!
//! Each chip owns at most one open capture file. The tap writes a record
//! iff the chip's capture is ON at the moment of the tap; a failed write
//! closes the sink and turns capture off for that chip.

use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::Result;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use log::{info, warn};
use radiosim_model::{ChipId, ChipKind, FacadeId, HciPacketType};

use super::pcap::{append_record, wrap_bt_packet, write_pcap_header, LinkType, PacketDirection};

/// Capture state of one chip.
pub struct CaptureInfo {
    chip_id: ChipId,
    chip_kind: ChipKind,
    facade_id: FacadeId,
    device_guid: String,
    /// Some(file) while capture is ON and the file is open.
    file: Option<File>,
    /// Size in bytes of the current capture file.
    pub size: usize,
    /// Number of packet records written.
    pub records: u32,
}

impl CaptureInfo {
    fn new(chip_id: ChipId, chip_kind: ChipKind, facade_id: FacadeId, device_guid: String) -> Self {
        CaptureInfo {
            chip_id,
            chip_kind,
            facade_id,
            device_guid,
            file: None,
            size: 0,
            records: 0,
        }
    }

    fn link_type(&self) -> LinkType {
        match self.chip_kind {
            ChipKind::Bluetooth => LinkType::BluetoothHciH4WithPhdr,
            ChipKind::Wifi => LinkType::Ieee80211RadioTap,
            ChipKind::Uwb => LinkType::FiraUci,
        }
    }

    // Capture file name: <dir>/<device-guid>-<kind-suffix>.pcap, with a
    // -N suffix when the name is already taken.
    fn capture_path(&self, dir: &PathBuf) -> PathBuf {
        let stem = format!("{}-{}", self.device_guid, self.chip_kind.capture_suffix());
        let mut path = dir.join(format!("{stem}.pcap"));
        let mut suffix = 0;
        while path.exists() {
            suffix += 1;
            path = dir.join(format!("{stem}-{suffix}.pcap"));
        }
        path
    }

    /// Open a fresh capture file with a pcap header.
    fn start_capture(&mut self, dir: &PathBuf) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        std::fs::create_dir_all(dir)?;
        let path = self.capture_path(dir);
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        self.size = write_pcap_header(self.link_type(), &mut file)?;
        self.records = 0;
        self.file = Some(file);
        info!("capture started for chip {} at {}", self.chip_id, path.display());
        Ok(())
    }

    /// Close the capture file by dropping ownership of it.
    fn stop_capture(&mut self) {
        self.file = None;
    }

    fn append(&mut self, packet: &[u8]) -> Result<()> {
        if let Some(ref mut file) = self.file {
            let timestamp =
                SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
            let size = append_record(timestamp, file, packet)?;
            self.size += size;
            self.records += 1;
        }
        Ok(())
    }
}

/// All capture sinks, addressable by chip for lifecycle and state changes
/// and by `(kind, facade_id)` for the packet hub tap.
pub struct Captures {
    chip_id_to_capture: RwLock<BTreeMap<ChipId, Arc<Mutex<CaptureInfo>>>>,
    facade_key_to_capture: RwLock<HashMap<(ChipKind, FacadeId), Arc<Mutex<CaptureInfo>>>>,
    dir: PathBuf,
    capture_at_startup: bool,
}

impl Captures {
    /// `capture_at_startup` opens a sink for every chip as it attaches,
    /// the equivalent of starting the daemon with captures enabled.
    pub fn new(dir: PathBuf, capture_at_startup: bool) -> Self {
        Captures {
            chip_id_to_capture: RwLock::new(BTreeMap::new()),
            facade_key_to_capture: RwLock::new(HashMap::new()),
            dir,
            capture_at_startup,
        }
    }

    /// Track a newly attached chip. Must not be called under the scene lock
    /// because startup captures open files.
    pub fn insert(&self, chip_id: ChipId, kind: ChipKind, facade_id: FacadeId, guid: &str) {
        let mut capture = CaptureInfo::new(chip_id, kind, facade_id, guid.to_string());
        if self.capture_at_startup {
            if let Err(err) = capture.start_capture(&self.dir) {
                warn!("startup capture failed for chip {chip_id}: {err}");
            }
        }
        let capture = Arc::new(Mutex::new(capture));
        self.chip_id_to_capture.write().unwrap().insert(chip_id, capture.clone());
        self.facade_key_to_capture.write().unwrap().insert((kind, facade_id), capture);
    }

    /// Stop and forget the capture of a removed chip.
    pub fn remove(&self, chip_id: ChipId) {
        let removed = self.chip_id_to_capture.write().unwrap().remove(&chip_id);
        if let Some(capture) = removed {
            let key = {
                let mut capture = capture.lock().unwrap();
                capture.stop_capture();
                (capture.chip_kind, capture.facade_id)
            };
            self.facade_key_to_capture.write().unwrap().remove(&key);
        }
    }

    /// Turn the capture of a chip on or off.
    pub fn set_state(&self, chip_id: ChipId, on: bool) -> crate::error::Result<()> {
        let capture = self
            .chip_id_to_capture
            .read()
            .unwrap()
            .get(&chip_id)
            .cloned()
            .ok_or(crate::error::Error::NotFound(format!("capture for chip {chip_id}")))?;
        let mut capture = capture.lock().unwrap();
        if on {
            capture.start_capture(&self.dir)?;
        } else {
            capture.stop_capture();
        }
        Ok(())
    }

    /// True while a capture file is open for the chip.
    pub fn is_on(&self, chip_id: ChipId) -> bool {
        self.chip_id_to_capture
            .read()
            .unwrap()
            .get(&chip_id)
            .map(|capture| capture.lock().unwrap().file.is_some())
            .unwrap_or(false)
    }

    /// Release every open sink (scene reset).
    pub fn stop_all(&self) {
        for capture in self.chip_id_to_capture.read().unwrap().values() {
            capture.lock().unwrap().stop_capture();
        }
    }

    /// The packet hub tap. Writes one record when the chip's capture is ON.
    /// Bluetooth frames carry the direction pseudo-header and packet
    /// indicator, other kinds are recorded raw.
    pub fn tap(
        &self,
        kind: ChipKind,
        facade_id: FacadeId,
        packet: &Bytes,
        direction: PacketDirection,
        packet_type: HciPacketType,
    ) {
        let capture =
            self.facade_key_to_capture.read().unwrap().get(&(kind, facade_id)).cloned();
        let Some(capture) = capture else { return };
        let mut capture = capture.lock().unwrap();
        if capture.file.is_none() {
            return;
        }
        let result = match kind {
            ChipKind::Bluetooth => {
                let wrapped = wrap_bt_packet(direction, packet_type.to_u8(), packet);
                capture.append(&wrapped)
            }
            _ => capture.append(packet),
        };
        if let Err(err) = result {
            // A failed write closes the sink and turns capture off.
            warn!("capture write failed for chip {}: {err}", capture.chip_id);
            capture.stop_capture();
        }
    }
}
