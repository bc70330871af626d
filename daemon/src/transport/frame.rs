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

//! Wire framing of the streaming session protocol.
//!
//! Every message is a length-prefixed envelope holding exactly one tagged
//! variant. The session layer matches on the tag in one place and hands
//! payload bytes to the packet hub unparsed.
//!
//! ```text
//! frame    := len:u32le body
//! body     := tag:u8 payload
//! tag 1    := initial_info  kind:u8 name:str chip_id:str manufacturer:str product:str
//! tag 2    := hci_packet    packet_type:u8 packet:bytes
//! tag 3    := packet        bytes
//! str      := len:u16le utf8-bytes
//! ```

use bytes::Bytes;
use radiosim_model::{ChipKind, HciPacketType};
use std::io::{Read, Write};

const TAG_INITIAL_INFO: u8 = 1;
const TAG_HCI_PACKET: u8 = 2;
const TAG_PACKET: u8 = 3;

// Frames larger than this are a protocol violation, not traffic.
const MAX_FRAME_LEN: u32 = 4 * 1024 * 1024;

#[derive(Debug)]
pub enum FrameError {
    IoError(std::io::Error),
    InvalidTag(u8),
    InvalidKind(u8),
    InvalidPacketType(u8),
    Oversized(u32),
    Truncated,
    InvalidString,
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::IoError(err) => write!(f, "io error: {err}"),
            FrameError::InvalidTag(tag) => write!(f, "invalid envelope tag {tag}"),
            FrameError::InvalidKind(kind) => write!(f, "invalid chip kind {kind}"),
            FrameError::InvalidPacketType(t) => write!(f, "invalid hci packet type {t}"),
            FrameError::Oversized(len) => write!(f, "oversized frame of {len} bytes"),
            FrameError::Truncated => write!(f, "truncated frame"),
            FrameError::InvalidString => write!(f, "string field is not utf-8"),
        }
    }
}

/// The peer-supplied description of a chip in the handshake.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipInfo {
    pub kind: ChipKind,
    pub id: String,
    pub manufacturer: String,
    pub product_name: String,
}

/// The first peer-to-simulator message.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialInfo {
    pub name: String,
    pub chip: ChipInfo,
}

/// One envelope, either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketFrame {
    InitialInfo(InitialInfo),
    Hci { packet_type: HciPacketType, packet: Bytes },
    Raw(Bytes),
}

fn kind_to_u8(kind: ChipKind) -> u8 {
    match kind {
        ChipKind::Bluetooth => 1,
        ChipKind::Wifi => 2,
        ChipKind::Uwb => 3,
    }
}

fn kind_from_u8(value: u8) -> Result<ChipKind, FrameError> {
    match value {
        1 => Ok(ChipKind::Bluetooth),
        2 => Ok(ChipKind::Wifi),
        3 => Ok(ChipKind::Uwb),
        _ => Err(FrameError::InvalidKind(value)),
    }
}

fn take<'a>(buf: &mut &'a [u8], n: usize) -> Result<&'a [u8], FrameError> {
    if buf.len() < n {
        return Err(FrameError::Truncated);
    }
    let (head, rest) = buf.split_at(n);
    *buf = rest;
    Ok(head)
}

fn take_u8(buf: &mut &[u8]) -> Result<u8, FrameError> {
    Ok(take(buf, 1)?[0])
}

fn take_string(buf: &mut &[u8]) -> Result<String, FrameError> {
    let len = take(buf, 2)?;
    let len = u16::from_le_bytes([len[0], len[1]]) as usize;
    let bytes = take(buf, len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| FrameError::InvalidString)
}

fn put_string(body: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    body.extend((bytes.len() as u16).to_le_bytes());
    body.extend(bytes);
}

/// Read one envelope, blocking until a full frame or EOF.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<PacketFrame, FrameError> {
    let mut len = [0u8; 4];
    reader.read_exact(&mut len).map_err(FrameError::IoError)?;
    let len = u32::from_le_bytes(len);
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(FrameError::Oversized(len));
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).map_err(FrameError::IoError)?;

    let mut buf = body.as_slice();
    match take_u8(&mut buf)? {
        TAG_INITIAL_INFO => {
            let kind = kind_from_u8(take_u8(&mut buf)?)?;
            let name = take_string(&mut buf)?;
            let id = take_string(&mut buf)?;
            let manufacturer = take_string(&mut buf)?;
            let product_name = take_string(&mut buf)?;
            Ok(PacketFrame::InitialInfo(InitialInfo {
                name,
                chip: ChipInfo { kind, id, manufacturer, product_name },
            }))
        }
        TAG_HCI_PACKET => {
            let raw_type = take_u8(&mut buf)?;
            let packet_type = HciPacketType::from_u8(raw_type)
                .ok_or(FrameError::InvalidPacketType(raw_type))?;
            Ok(PacketFrame::Hci { packet_type, packet: Bytes::copy_from_slice(buf) })
        }
        TAG_PACKET => Ok(PacketFrame::Raw(Bytes::copy_from_slice(buf))),
        tag => Err(FrameError::InvalidTag(tag)),
    }
}

/// Write one envelope.
pub fn write_frame<W: Write>(writer: &mut W, frame: &PacketFrame) -> std::io::Result<()> {
    let mut body = Vec::new();
    match frame {
        PacketFrame::InitialInfo(info) => {
            body.push(TAG_INITIAL_INFO);
            body.push(kind_to_u8(info.chip.kind));
            put_string(&mut body, &info.name);
            put_string(&mut body, &info.chip.id);
            put_string(&mut body, &info.chip.manufacturer);
            put_string(&mut body, &info.chip.product_name);
        }
        PacketFrame::Hci { packet_type, packet } => {
            body.push(TAG_HCI_PACKET);
            body.push(packet_type.to_u8());
            body.extend_from_slice(packet);
        }
        PacketFrame::Raw(packet) => {
            body.push(TAG_PACKET);
            body.extend_from_slice(packet);
        }
    }
    writer.write_all(&(body.len() as u32).to_le_bytes())?;
    writer.write_all(&body)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip(frame: PacketFrame) -> PacketFrame {
        let mut encoded = Vec::new();
        write_frame(&mut encoded, &frame).unwrap();
        read_frame(&mut Cursor::new(encoded)).unwrap()
    }

    #[test]
    fn test_initial_info_frame() {
        let frame = PacketFrame::InitialInfo(InitialInfo {
            name: "Pixel_XL_3".to_string(),
            chip: ChipInfo {
                kind: ChipKind::Bluetooth,
                id: "bt-0".to_string(),
                manufacturer: "Google".to_string(),
                product_name: "Pixel".to_string(),
            },
        });
        assert_eq!(round_trip(frame.clone()), frame);
    }

    #[test]
    fn test_hci_frame() {
        let frame = PacketFrame::Hci {
            packet_type: HciPacketType::Command,
            packet: Bytes::from_static(&[0x03, 0x0c, 0x00]),
        };
        assert_eq!(round_trip(frame.clone()), frame);
    }

    #[test]
    fn test_raw_frame() {
        let frame = PacketFrame::Raw(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(round_trip(frame.clone()), frame);
    }

    #[test]
    fn test_empty_payloads() {
        assert_eq!(
            round_trip(PacketFrame::Raw(Bytes::new())),
            PacketFrame::Raw(Bytes::new())
        );
    }

    #[test]
    fn test_eof_in_length() {
        let result = read_frame(&mut Cursor::new(vec![1u8, 0]));
        assert!(matches!(result, Err(FrameError::IoError(_))));
    }

    #[test]
    fn test_eof_in_body() {
        let mut encoded = Vec::new();
        encoded.extend(8u32.to_le_bytes());
        encoded.push(TAG_PACKET);
        let result = read_frame(&mut Cursor::new(encoded));
        assert!(matches!(result, Err(FrameError::IoError(_))));
    }

    #[test]
    fn test_invalid_tag() {
        let mut encoded = Vec::new();
        encoded.extend(1u32.to_le_bytes());
        encoded.push(9);
        let result = read_frame(&mut Cursor::new(encoded));
        assert!(matches!(result, Err(FrameError::InvalidTag(9))));
    }

    #[test]
    fn test_invalid_packet_type() {
        let mut encoded = Vec::new();
        encoded.extend(2u32.to_le_bytes());
        encoded.push(TAG_HCI_PACKET);
        encoded.push(77);
        let result = read_frame(&mut Cursor::new(encoded));
        assert!(matches!(result, Err(FrameError::InvalidPacketType(77))));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let mut encoded = Vec::new();
        encoded.extend((MAX_FRAME_LEN + 1).to_le_bytes());
        let result = read_frame(&mut Cursor::new(encoded));
        assert!(matches!(result, Err(FrameError::Oversized(_))));
    }

    #[test]
    fn test_truncated_initial_info() {
        let mut encoded = Vec::new();
        encoded.extend(2u32.to_le_bytes());
        encoded.push(TAG_INITIAL_INFO);
        encoded.push(1); // kind present, strings missing
        let result = read_frame(&mut Cursor::new(encoded));
        assert!(matches!(result, Err(FrameError::Truncated)));
    }
}
