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

//! End-to-end stream sessions over a local TCP server.

use bytes::Bytes;
use radiosim_daemon::config::Config;
use radiosim_daemon::service::SimulationContext;
use radiosim_daemon::transport::frame::{
    read_frame, write_frame, ChipInfo, FrameError, InitialInfo, PacketFrame,
};
use radiosim_daemon::transport::server::run_stream_server;
use radiosim_daemon::wireless::bluetooth::loopback::LoopbackFactory;
use radiosim_daemon::wireless::wifi::WifiService;
use radiosim_model::{ChipKind, HciPacketType};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const HCI_RESET: [u8; 3] = [0x03, 0x0c, 0x00];

fn start_server(
    wifi_service: Option<Arc<dyn WifiService>>,
) -> (Arc<SimulationContext>, u16) {
    let config = Config {
        capture_at_startup: false,
        capture_dir: std::env::temp_dir()
            .join(format!("radiosim-session-test-{:?}", std::thread::current().id())),
    };
    let factory = LoopbackFactory::new();
    let ctx = SimulationContext::new(&config, &factory, wifi_service, None);
    let (port, _handle) = run_stream_server(ctx.clone(), 0).unwrap();
    (ctx, port)
}

fn connect(port: u16) -> TcpStream {
    let stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream
}

fn initial_info(kind: ChipKind, name: &str, chip_id: &str) -> PacketFrame {
    PacketFrame::InitialInfo(InitialInfo {
        name: name.to_string(),
        chip: ChipInfo {
            kind,
            id: chip_id.to_string(),
            manufacturer: "Google".to_string(),
            product_name: "Pixel".to_string(),
        },
    })
}

// Spin until the scene settles into the expected device count.
fn wait_for_devices(ctx: &SimulationContext, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if ctx.scene.list().len() == count {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("scene never reached {count} devices: {:?}", ctx.scene.list().len());
}

#[test]
fn test_handshake_registers_chip() {
    let (ctx, port) = start_server(None);
    let mut stream = connect(port);

    write_frame(&mut stream, &initial_info(ChipKind::Bluetooth, "Pixel_XL_3", "bt-0")).unwrap();
    wait_for_devices(&ctx, 1);

    let devices = ctx.scene.list();
    assert_eq!(devices[0].name, "Pixel_XL_3");
    assert_eq!(devices[0].chips.len(), 1);
    assert_eq!(devices[0].chips[0].id, 1);
    assert_eq!(devices[0].chips[0].facade_id, 1);
    assert_eq!(devices[0].chips[0].kind, ChipKind::Bluetooth);
    assert_eq!(devices[0].chips[0].name, "bt-0");
}

#[test]
fn test_hci_reset_gets_command_complete() {
    let (ctx, port) = start_server(None);
    let mut stream = connect(port);
    write_frame(&mut stream, &initial_info(ChipKind::Bluetooth, "Pixel_XL_3", "bt-0")).unwrap();
    wait_for_devices(&ctx, 1);

    write_frame(
        &mut stream,
        &PacketFrame::Hci {
            packet_type: HciPacketType::Command,
            packet: Bytes::from_static(&HCI_RESET),
        },
    )
    .unwrap();

    match read_frame(&mut stream).unwrap() {
        PacketFrame::Hci { packet_type, packet } => {
            assert_eq!(packet_type, HciPacketType::Event);
            // Command Complete for the reset opcode.
            assert_eq!(packet.as_ref(), &[0x0e, 0x04, 0x01, 0x03, 0x0c, 0x00]);
        }
        frame => panic!("unexpected frame {frame:?}"),
    }
}

#[test]
fn test_command_before_reset_triggers_hardware_error() {
    let (ctx, port) = start_server(None);
    let mut stream = connect(port);
    write_frame(&mut stream, &initial_info(ChipKind::Bluetooth, "Pixel_XL_3", "bt-0")).unwrap();
    wait_for_devices(&ctx, 1);

    // Read Local Version Information before any HCI Reset.
    write_frame(
        &mut stream,
        &PacketFrame::Hci {
            packet_type: HciPacketType::Command,
            packet: Bytes::from_static(&[0x01, 0x10, 0x00]),
        },
    )
    .unwrap();

    match read_frame(&mut stream).unwrap() {
        PacketFrame::Hci { packet_type, packet } => {
            assert_eq!(packet_type, HciPacketType::Event);
            // Hardware Error event forces the stack's reset path.
            assert_eq!(packet.as_ref(), &[0x10, 0x01, 0x00]);
        }
        frame => panic!("unexpected frame {frame:?}"),
    }
}

#[test]
fn test_handshake_rejected_without_initial_info() {
    let (ctx, port) = start_server(None);
    let mut stream = connect(port);

    // First frame is an hci packet, not initial_info.
    write_frame(
        &mut stream,
        &PacketFrame::Hci {
            packet_type: HciPacketType::Command,
            packet: Bytes::from_static(&HCI_RESET),
        },
    )
    .unwrap();

    // The simulator closes the stream and registers nothing.
    match read_frame(&mut stream) {
        Err(FrameError::IoError(_)) => {}
        other => panic!("expected a closed stream, got {other:?}"),
    }
    assert!(ctx.scene.list().is_empty());
}

#[test]
fn test_shape_mismatch_keeps_session_open() {
    let (ctx, port) = start_server(None);
    let mut stream = connect(port);
    write_frame(&mut stream, &initial_info(ChipKind::Bluetooth, "Pixel_XL_3", "bt-0")).unwrap();
    wait_for_devices(&ctx, 1);

    // A raw frame on a bluetooth session is logged and skipped.
    write_frame(&mut stream, &PacketFrame::Raw(Bytes::from_static(&[1, 2, 3]))).unwrap();

    // The session still works afterwards.
    write_frame(
        &mut stream,
        &PacketFrame::Hci {
            packet_type: HciPacketType::Command,
            packet: Bytes::from_static(&HCI_RESET),
        },
    )
    .unwrap();
    assert!(matches!(read_frame(&mut stream), Ok(PacketFrame::Hci { .. })));
    assert_eq!(ctx.scene.list().len(), 1);
}

#[test]
fn test_close_cleans_up_chip_and_routes() {
    let (ctx, port) = start_server(None);
    let stream = connect(port);
    {
        let mut stream = stream.try_clone().unwrap();
        write_frame(&mut stream, &initial_info(ChipKind::Bluetooth, "Pixel_XL_3", "bt-0"))
            .unwrap();
    }
    wait_for_devices(&ctx, 1);
    let facade_id = ctx.scene.list()[0].chips[0].facade_id;

    drop(stream);
    wait_for_devices(&ctx, 0);
    assert_eq!(ctx.routes.device_for(ChipKind::Bluetooth, facade_id), None);

    // A response racing with teardown is a logged drop, not a panic.
    use radiosim_daemon::hub::ResponseSink;
    ctx.hub.handle_response(
        ChipKind::Bluetooth,
        facade_id,
        &Bytes::from_static(&[0x0e]),
        HciPacketType::Event,
    );
}

#[test]
fn test_wifi_peer_round_trip() {
    struct EchoService {
        receiver: Mutex<Option<Box<dyn Fn(&Bytes) + Send + Sync>>>,
    }
    impl WifiService for EchoService {
        fn register_receiver(&self, receiver: Box<dyn Fn(&Bytes) + Send + Sync>) {
            *self.receiver.lock().unwrap() = Some(receiver);
        }
        fn submit(&self, _facade_id: radiosim_model::FacadeId, packet: &Bytes) {
            if let Some(receiver) = self.receiver.lock().unwrap().as_ref() {
                receiver(packet);
            }
        }
    }

    let service = Arc::new(EchoService { receiver: Mutex::new(None) });
    let (ctx, port) = start_server(Some(service));
    let mut stream = connect(port);
    write_frame(&mut stream, &initial_info(ChipKind::Wifi, "Pixel_XL_3", "wifi-0")).unwrap();
    wait_for_devices(&ctx, 1);

    write_frame(&mut stream, &PacketFrame::Raw(Bytes::from_static(&[0xca, 0xfe]))).unwrap();
    match read_frame(&mut stream).unwrap() {
        PacketFrame::Raw(packet) => assert_eq!(packet.as_ref(), &[0xca, 0xfe]),
        frame => panic!("unexpected frame {frame:?}"),
    }

    let devices = ctx.scene.list();
    match &devices[0].chips[0].radio {
        radiosim_model::snapshot::ChipRadio::Wifi(snapshot) => {
            assert_eq!(snapshot.tx_count, 1);
            assert_eq!(snapshot.rx_count, 1);
        }
        _ => panic!("expected a wifi chip"),
    }
}
