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

//! A utility module for writing pcap files
//!
//! This module writes the pcap global header for the assigned link type
//! and appends per-frame records with the classic
//! `{ts_sec, ts_usec, incl_len, orig_len}` record header.

use std::{
    io::{Result, Write},
    time::Duration,
};

macro_rules! be_vec {
    ( $( $x:expr ),* ) => {
         Vec::<u8>::new().iter().copied()
         $( .chain($x.to_be_bytes()) )*
         .collect()
       };
    }

/// The direction of a tapped packet, relative to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketDirection {
    HostToController = 0,
    ControllerToHost = 1,
}

/// Supported LinkTypes for packet capture
/// https://www.tcpdump.org/linktypes.html
#[derive(Clone, Copy)]
pub enum LinkType {
    /// Radiotap link-layer information followed by an 802.11 header.
    Ieee80211RadioTap = 127,
    /// Bluetooth HCI UART transport layer with direction pseudo-header.
    BluetoothHciH4WithPhdr = 201,
    /// UWB UCI frames, recorded with the FiRa UCI link type.
    FiraUci = 299,
}

/// Returns the number of bytes written for the header of the pcap file.
pub fn write_pcap_header<W: Write>(link_type: LinkType, output: &mut W) -> Result<usize> {
    // https://tools.ietf.org/id/draft-gharris-opsawg-pcap-00.html#name-file-header
    let header: Vec<u8> = be_vec![
        0xa1b2c3d4u32, // magic number
        2u16,          // major version
        4u16,          // minor version
        0u32,          // reserved 1
        0u32,          // reserved 2
        u32::MAX,      // snaplen
        link_type as u32
    ];

    output.write_all(&header)?;
    Ok(header.len())
}

/// The BluetoothHciH4WithPhdr frame contains a 4-byte direction
/// field, followed by an HCI packet indicator byte, followed by an
/// HCI packet of the specified packet type.
pub fn wrap_bt_packet(
    packet_direction: PacketDirection,
    packet_type: u8,
    packet: &[u8],
) -> Vec<u8> {
    let header: Vec<u8> = be_vec![packet_direction as u32, packet_type];
    let mut bytes = Vec::<u8>::with_capacity(header.len() + packet.len());
    bytes.extend(&header);
    bytes.extend(packet);
    bytes
}

/// Returns the number of bytes written for a single packet record.
pub fn append_record<W: Write>(
    timestamp: Duration,
    output: &mut W,
    packet: &[u8],
) -> Result<usize> {
    // https://tools.ietf.org/id/draft-gharris-opsawg-pcap-00.html#name-packet-record
    let length = packet.len();
    let header: Vec<u8> = be_vec![
        timestamp.as_secs() as u32, // seconds
        timestamp.subsec_micros(),  // microseconds
        length as u32,              // Captured Packet Length
        length as u32               // Original Packet Length
    ];
    let mut bytes = Vec::<u8>::with_capacity(header.len() + length);
    bytes.extend(&header);
    bytes.extend(packet);
    output.write_all(&bytes)?;
    output.flush()?;
    Ok(header.len() + length)
}
