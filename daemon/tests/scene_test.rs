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

//! Scene controller behavior against a full simulation context.

use radiosim_daemon::config::Config;
use radiosim_daemon::devices::chip::CreateParams;
use radiosim_daemon::error::Error;
use radiosim_daemon::service::SimulationContext;
use radiosim_daemon::wireless::bluetooth::controller::PhyKind;
use radiosim_daemon::wireless::bluetooth::loopback::{LoopbackFactory, LoopbackModel};
use radiosim_model::patch::{BluetoothPatch, ChipPatch, ChipRadioPatch, DevicePatch};
use radiosim_model::pose::{Orientation, Position};
use radiosim_model::snapshot::ChipRadio;
use radiosim_model::{ChipKind, RadioState};
use std::sync::Arc;

fn new_context() -> (Arc<SimulationContext>, Arc<LoopbackModel>) {
    let config = Config {
        capture_at_startup: false,
        capture_dir: std::env::temp_dir()
            .join(format!("radiosim-scene-test-{:?}", std::thread::current().id())),
    };
    let factory = LoopbackFactory::new();
    let ctx = SimulationContext::new(&config, &factory, None, None);
    let model = factory.model().expect("controller model was created");
    (ctx, model)
}

fn bt_params(name: &str) -> CreateParams {
    CreateParams {
        kind: ChipKind::Bluetooth,
        name: Some(name.to_string()),
        manufacturer: "radiosim".to_string(),
        product_name: "radiosim_bt".to_string(),
    }
}

fn bt_snapshot(
    ctx: &SimulationContext,
    device_name: &str,
    chip_name: &str,
) -> (radiosim_model::snapshot::RadioSnapshot, radiosim_model::snapshot::RadioSnapshot) {
    let devices = ctx.scene.list();
    let device = devices.iter().find(|d| d.name == device_name).expect("device listed");
    let chip = device.chips.iter().find(|c| c.name == chip_name).expect("chip listed");
    match &chip.radio {
        ChipRadio::Bluetooth { low_energy, classic } => (*low_energy, *classic),
        _ => panic!("expected a bluetooth chip"),
    }
}

#[test]
fn test_first_chip_gets_initial_ids() {
    let (ctx, _) = new_context();
    let result = ctx.scene.add_chip("peer", "Pixel_XL_3", &bt_params("bt-0"));
    assert_eq!(result.device_id, 1);
    assert_eq!(result.chip_id, 1);
    assert_eq!(result.facade_id, 1);

    let devices = ctx.scene.list();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].name, "Pixel_XL_3");
    assert!(devices[0].visible);
    assert_eq!(devices[0].chips.len(), 1);
    let chip = &devices[0].chips[0];
    assert_eq!(chip.id, 1);
    assert_eq!(chip.facade_id, 1);
    assert_eq!(chip.kind, ChipKind::Bluetooth);
    assert_eq!(chip.name, "bt-0");
}

#[test]
fn test_device_name_defaults_from_guid_pool() {
    let (ctx, _) = new_context();
    ctx.scene.add_chip("peer", "", &bt_params("bt-0"));
    let devices = ctx.scene.list();
    // The pool name is stable for a guid across calls.
    let expected = radiosim_daemon::devices::device::default_name("peer");
    assert_eq!(devices[0].name, expected);
}

#[test]
fn test_same_guid_shares_device() {
    let (ctx, _) = new_context();
    let bt = ctx.scene.add_chip("guid-1", "dev", &bt_params("bt-0"));
    let wifi = ctx.scene.add_chip(
        "guid-1",
        "dev",
        &CreateParams {
            kind: ChipKind::Wifi,
            name: Some("wifi-0".to_string()),
            manufacturer: String::new(),
            product_name: String::new(),
        },
    );
    assert_eq!(bt.device_id, wifi.device_id);
    assert_ne!(bt.chip_id, wifi.chip_id);
    let devices = ctx.scene.list();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].chips.len(), 2);
}

#[test]
fn test_duplicate_chip_names_coexist() {
    let (ctx, _) = new_context();
    let a = ctx.scene.add_chip("guid-1", "dev", &bt_params("bt-0"));
    let b = ctx.scene.add_chip("guid-1", "dev", &bt_params("bt-0"));
    assert_ne!(a.chip_id, b.chip_id);
    assert_eq!(ctx.scene.list()[0].chips.len(), 2);
}

#[test]
fn test_patch_position_and_orientation() {
    let (ctx, _) = new_context();
    ctx.scene.add_chip("peer", "Pixel_XL_3", &bt_params("bt-0"));

    ctx.scene
        .patch_device(&DevicePatch {
            name: Some("Pixel_XL_3".to_string()),
            position: Some(Position::new(1.1, 2.2, 3.3)),
            orientation: Some(Orientation::new(45.0, 0.0, 0.0)),
            visible: Some(false),
            ..Default::default()
        })
        .unwrap();

    let devices = ctx.scene.list();
    assert_eq!(devices[0].position, Position::new(1.1, 2.2, 3.3));
    assert_eq!(devices[0].orientation, Orientation::new(45.0, 0.0, 0.0));
    assert!(!devices[0].visible);

    let err = ctx
        .scene
        .patch_device(&DevicePatch {
            name: Some("no-such-device".to_string()),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_patch_matches_guid_after_name() {
    let (ctx, _) = new_context();
    ctx.scene.add_chip("guid-9", "named", &bt_params("bt-0"));
    ctx.scene
        .patch_device(&DevicePatch {
            guid: Some("guid-9".to_string()),
            visible: Some(false),
            ..Default::default()
        })
        .unwrap();
    assert!(!ctx.scene.list()[0].visible);
}

#[test]
fn test_radio_toggle_updates_phy_membership() {
    let (ctx, model) = new_context();
    let result = ctx.scene.add_chip("peer", "Pixel_XL_3", &bt_params("bt-0"));
    assert!(model.phy(PhyKind::BrEdr).contains(result.facade_id));
    assert!(model.phy(PhyKind::LowEnergy).contains(result.facade_id));

    let patch = DevicePatch {
        name: Some("Pixel_XL_3".to_string()),
        chips: vec![ChipPatch {
            radio: Some(ChipRadioPatch::Bluetooth(BluetoothPatch {
                classic: Some(RadioState::Off),
                low_energy: None,
            })),
            ..Default::default()
        }],
        ..Default::default()
    };
    ctx.scene.patch_device(&patch).unwrap();

    assert!(!model.phy(PhyKind::BrEdr).contains(result.facade_id));
    assert!(model.phy(PhyKind::LowEnergy).contains(result.facade_id));
    let (le, classic) = bt_snapshot(&ctx, "Pixel_XL_3", "bt-0");
    assert_eq!(classic.state, RadioState::Off);
    assert_eq!(le.state, RadioState::On);
    assert_eq!(classic.tx_count, 0);

    // Patching the same state twice changes nothing.
    ctx.scene.patch_device(&patch).unwrap();
    assert!(!model.phy(PhyKind::BrEdr).contains(result.facade_id));

    // An UNKNOWN radio state is a no-op.
    ctx.scene
        .patch_device(&DevicePatch {
            name: Some("Pixel_XL_3".to_string()),
            chips: vec![ChipPatch {
                radio: Some(ChipRadioPatch::Bluetooth(BluetoothPatch {
                    classic: Some(RadioState::Unknown),
                    low_energy: None,
                })),
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap();
    let (_, classic) = bt_snapshot(&ctx, "Pixel_XL_3", "bt-0");
    assert_eq!(classic.state, RadioState::Off);
}

#[test]
fn test_chip_patch_matches_by_kind_position() {
    let (ctx, model) = new_context();
    let first = ctx.scene.add_chip("guid-1", "dev", &bt_params("bt-0"));
    let second = ctx.scene.add_chip("guid-1", "dev", &bt_params("bt-1"));

    // Two bluetooth patches in order: the second turns bt-1 classic off.
    ctx.scene
        .patch_device(&DevicePatch {
            name: Some("dev".to_string()),
            chips: vec![
                ChipPatch {
                    radio: Some(ChipRadioPatch::Bluetooth(BluetoothPatch::default())),
                    ..Default::default()
                },
                ChipPatch {
                    radio: Some(ChipRadioPatch::Bluetooth(BluetoothPatch {
                        classic: Some(RadioState::Off),
                        low_energy: None,
                    })),
                    ..Default::default()
                },
            ],
            ..Default::default()
        })
        .unwrap();

    assert!(model.phy(PhyKind::BrEdr).contains(first.facade_id));
    assert!(!model.phy(PhyKind::BrEdr).contains(second.facade_id));
}

#[test]
fn test_reset_restores_defaults() {
    let (ctx, model) = new_context();
    let result = ctx.scene.add_chip("peer", "Pixel_XL_3", &bt_params("bt-0"));

    ctx.scene
        .patch_device(&DevicePatch {
            name: Some("Pixel_XL_3".to_string()),
            position: Some(Position::new(10.0, 20.0, 30.0)),
            visible: Some(false),
            chips: vec![ChipPatch {
                radio: Some(ChipRadioPatch::Bluetooth(BluetoothPatch {
                    classic: Some(RadioState::Off),
                    low_energy: Some(RadioState::Off),
                })),
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap();
    assert!(!model.phy(PhyKind::LowEnergy).contains(result.facade_id));

    ctx.scene.reset();

    let devices = ctx.scene.list();
    assert!(devices[0].visible);
    assert_eq!(devices[0].position, Position::default());
    assert_eq!(devices[0].orientation, Orientation::default());
    let (le, classic) = bt_snapshot(&ctx, "Pixel_XL_3", "bt-0");
    assert_eq!(le.state, RadioState::On);
    assert_eq!(classic.state, RadioState::On);
    assert_eq!(le.tx_count, 0);
    assert_eq!(classic.rx_count, 0);
    assert!(model.phy(PhyKind::BrEdr).contains(result.facade_id));
    assert!(model.phy(PhyKind::LowEnergy).contains(result.facade_id));
}

#[test]
fn test_remove_chip_removes_empty_device() {
    let (ctx, model) = new_context();
    let result = ctx.scene.add_chip("peer", "Pixel_XL_3", &bt_params("bt-0"));
    ctx.scene.remove_chip(result.device_id, result.chip_id).unwrap();
    assert!(ctx.scene.list().is_empty());
    assert!(!model.phy(PhyKind::LowEnergy).contains(result.facade_id));

    let err = ctx.scene.remove_chip(result.device_id, result.chip_id).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_ids_are_not_reused_after_removal() {
    let (ctx, _) = new_context();
    let first = ctx.scene.add_chip("guid-1", "dev1", &bt_params("bt-0"));
    ctx.scene.remove_chip(first.device_id, first.chip_id).unwrap();
    let second = ctx.scene.add_chip("guid-2", "dev2", &bt_params("bt-0"));
    assert!(second.device_id > first.device_id);
    assert!(second.chip_id > first.chip_id);
    assert!(second.facade_id > first.facade_id);
}

#[test]
fn test_get_distance() {
    let (ctx, _) = new_context();
    let a = ctx.scene.add_chip("guid-a", "a", &bt_params("bt-0"));
    let b = ctx.scene.add_chip("guid-b", "b", &bt_params("bt-0"));

    ctx.scene
        .patch_device(&DevicePatch {
            name: Some("b".to_string()),
            position: Some(Position::new(1.0, 2.0, 2.0)),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(ctx.scene.get_distance(a.device_id, b.device_id), Some(3.0));
    assert_eq!(ctx.scene.get_distance(b.device_id, a.device_id), Some(3.0));
    assert_eq!(ctx.scene.get_distance(a.device_id, a.device_id), Some(0.0));
    assert_eq!(ctx.scene.get_distance(a.device_id, 999), None);
}

#[test]
fn test_capture_patch_opens_and_closes_sink() {
    let capture_dir = std::env::temp_dir()
        .join(format!("radiosim-scene-capture-{:?}", std::thread::current().id()));
    let _ = std::fs::remove_dir_all(&capture_dir);
    let config = Config { capture_at_startup: false, capture_dir: capture_dir.clone() };
    let factory = LoopbackFactory::new();
    let ctx = SimulationContext::new(&config, &factory, None, None);

    let result = ctx.scene.add_chip("guid-cap", "dev", &bt_params("bt-0"));
    assert!(!ctx.scene.list()[0].chips[0].capture);

    ctx.scene
        .patch_device(&DevicePatch {
            name: Some("dev".to_string()),
            chips: vec![ChipPatch {
                id: Some(result.chip_id),
                capture: Some(true),
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap();
    assert!(ctx.scene.list()[0].chips[0].capture);
    assert!(capture_dir.join("guid-cap-hci.pcap").exists());

    ctx.scene.patch_capture(result.chip_id, false).unwrap();
    assert!(!ctx.scene.list()[0].chips[0].capture);

    // Reset also releases open sinks.
    ctx.scene.patch_capture(result.chip_id, true).unwrap();
    ctx.scene.reset();
    assert!(!ctx.scene.list()[0].chips[0].capture);

    let _ = std::fs::remove_dir_all(&capture_dir);
}

#[test]
fn test_notify_fires_on_mutations() {
    let (ctx, _) = new_context();
    let count = Arc::new(std::sync::atomic::AtomicU32::new(0));
    let count_clone = count.clone();
    ctx.notify.register(Box::new(move || {
        count_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }));

    let result = ctx.scene.add_chip("peer", "dev", &bt_params("bt-0"));
    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 1);
    ctx.scene.reset();
    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 2);
    ctx.scene.remove_chip(result.device_id, result.chip_id).unwrap();
    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 3);
}
