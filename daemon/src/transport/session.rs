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

//! One streaming session per connected peer.
//!
//! AwaitingInitialInfo -> Streaming -> Closed. The first frame must carry
//! `initial_info`; the session then registers the chip and its route and
//! pumps frames into the packet hub. A dedicated writer thread serializes
//! outbound frames through a bounded queue. Teardown erases the routing
//! entry before the chip is removed, so a response racing with teardown is
//! a clean drop.

use crate::devices::chip::CreateParams;
use crate::service::SimulationContext;
use crate::transport::frame::{read_frame, write_frame, FrameError, PacketFrame};
use bytes::Bytes;
use log::{info, warn};
use radiosim_model::{ChipKind, HciPacketType};
use std::io::{BufReader, ErrorKind};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread;

// Outbound frames queued per session before the facade side blocks.
const WRITE_QUEUE_DEPTH: usize = 128;

/// An outbound frame queued for a session's writer thread.
pub struct ResponsePacket {
    pub packet: Bytes,
    pub packet_type: HciPacketType,
}

/// Write half of a session, shared with the routing table.
///
/// Writes after close report failure instead of panicking; the hub logs
/// and drops.
#[derive(Clone)]
pub struct SessionWriter {
    tx: SyncSender<ResponsePacket>,
    closed: Arc<AtomicBool>,
}

impl SessionWriter {
    pub fn new(tx: SyncSender<ResponsePacket>) -> Self {
        SessionWriter { tx, closed: Arc::new(AtomicBool::new(false)) }
    }

    /// Queue one frame. Returns false when the session is closed.
    pub fn write(&self, packet_type: HciPacketType, packet: Bytes) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        if self.tx.send(ResponsePacket { packet, packet_type }).is_err() {
            self.closed.store(true, Ordering::SeqCst);
            return false;
        }
        true
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    // The closed flag alone, for the writer thread. Holding a full clone
    // there would keep the queue's sender half alive forever.
    fn closed_handle(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

/// Serve one peer connection to completion. Runs on the per-session
/// reader thread.
pub fn handle_peer(ctx: &SimulationContext, stream: TcpStream) {
    let peer = match stream.peer_addr() {
        Ok(addr) => addr.to_string(),
        Err(err) => {
            warn!("session: no peer address: {err}");
            return;
        }
    };
    let reader_stream = match stream.try_clone() {
        Ok(clone) => clone,
        Err(err) => {
            warn!("session {peer}: clone failed: {err}");
            return;
        }
    };
    let mut reader = BufReader::new(reader_stream);

    // AwaitingInitialInfo: read exactly one message.
    let info = match read_frame(&mut reader) {
        Ok(PacketFrame::InitialInfo(info)) => info,
        Ok(_) => {
            // Dropping the stream closes it; the peer observes the
            // disconnect as INVALID_ARGUMENT.
            warn!("session {peer}: first frame missing initial_info, closing");
            return;
        }
        Err(err) => {
            warn!("session {peer}: handshake read failed: {err}");
            return;
        }
    };

    let kind = info.chip.kind;
    let params = CreateParams {
        kind,
        name: (!info.chip.id.is_empty()).then(|| info.chip.id.clone()),
        manufacturer: info.chip.manufacturer.clone(),
        product_name: info.chip.product_name.clone(),
    };
    let result = ctx.scene.add_chip(&peer, &info.name, &params);
    info!(
        "session {peer}: streaming chip_id: {} kind: {kind} facade_id: {}",
        result.chip_id, result.facade_id
    );

    let (tx, rx) = sync_channel::<ResponsePacket>(WRITE_QUEUE_DEPTH);
    let writer = SessionWriter::new(tx);
    ctx.routes.register(
        kind,
        result.facade_id,
        crate::hub::Route { device_id: result.device_id, writer: writer.clone() },
    );
    spawn_writer(stream, kind, result.facade_id, rx, writer.closed_handle());

    // Streaming: frames are delivered to the facade in receive order.
    loop {
        match read_frame(&mut reader) {
            Ok(PacketFrame::Hci { packet_type, packet }) if kind == ChipKind::Bluetooth => {
                ctx.hub.handle_request(kind, result.facade_id, &packet, packet_type);
            }
            Ok(PacketFrame::Raw(packet)) if kind != ChipKind::Bluetooth => {
                ctx.hub.handle_request(
                    kind,
                    result.facade_id,
                    &packet,
                    HciPacketType::Unspecified,
                );
            }
            Ok(_) => {
                // Shape mismatch is logged and skipped, the session stays open.
                warn!("session {peer}: frame shape does not match kind {kind}, dropping");
            }
            Err(FrameError::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => {
                info!("session {peer}: peer closed the stream");
                break;
            }
            Err(err) => {
                warn!("session {peer}: read failed: {err}");
                break;
            }
        }
    }

    // Closed: the route goes first so a racing response is a clean drop.
    ctx.routes.unregister(kind, result.facade_id);
    writer.close();
    if let Err(err) = ctx.scene.remove_chip(result.device_id, result.chip_id) {
        warn!("session {peer}: {err}");
    }
    info!("session {peer}: closed, removed chip_id: {}", result.chip_id);
}

// The writer thread drains the queue and owns the write half. A write
// failure closes the session; the reader observes EOF after shutdown.
fn spawn_writer(
    mut stream: TcpStream,
    kind: ChipKind,
    facade_id: radiosim_model::FacadeId,
    rx: Receiver<ResponsePacket>,
    closed: Arc<AtomicBool>,
) {
    let _ = thread::Builder::new().name(format!("session_writer_{facade_id}")).spawn(move || {
        while let Ok(response) = rx.recv() {
            let frame = match kind {
                ChipKind::Bluetooth => PacketFrame::Hci {
                    packet_type: response.packet_type,
                    packet: response.packet,
                },
                _ => PacketFrame::Raw(response.packet),
            };
            if let Err(err) = write_frame(&mut stream, &frame) {
                warn!("session_writer_{facade_id}: write failed: {err}");
                closed.store(true, Ordering::SeqCst);
                let _ = stream.shutdown(Shutdown::Both);
                break;
            }
        }
    });
}
