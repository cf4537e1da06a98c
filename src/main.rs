//! Touch the tablet, watch the log.
//!
//! Uses the Wacom driver when built with it, and falls back to a scripted virtual device otherwise (or with
//! `--virtual`). Set `RUST_LOG=debug` for more.

use feeltouch::device::{Capability, CapabilityFlags, DeviceType};
use feeltouch::events::raw::Finger;
use feeltouch::events::Phase;
use feeltouch::{Builder, Session, VirtualSdk};

const FRAME: std::time::Duration = std::time::Duration::from_millis(16);

fn finger(id: i32, phase: Phase, x: f32, y: f32) -> Finger {
    Finger {
        id,
        position: [x, y],
        size: [0.02, 0.02],
        sensitivity: 0,
        orientation: 0.0,
        confidence: true,
        phase: phase as i32,
    }
}

/// One finger swiping left to right, then lifting.
fn scripted(sdk: &VirtualSdk, frame: u32) {
    #[allow(clippy::cast_precision_loss)]
    let x = frame as f32 / 60.0;
    let phase = match frame {
        0 => Phase::Down,
        1..=59 => Phase::Hold,
        60 => Phase::Up,
        _ => return,
    };
    sdk.send(1, frame, &[finger(0, phase, x, 0.5)]);
}

fn open_virtual() -> (Session, VirtualSdk) {
    let sdk = VirtualSdk::new();
    sdk.attach(Capability {
        device: 1,
        device_type: DeviceType::Opaque,
        logical_origin: [0.0; 2],
        logical_size: [0.0; 2],
        physical_size: [216.0, 135.0],
        reported_size: [60, 40],
        finger_max: 10,
        blob_max: 0,
        flags: CapabilityFlags::SENSITIVITY,
    });
    let session = Builder::new().build_virtual(sdk.clone());
    (session, sdk)
}

fn main() {
    env_logger::init();
    let force_virtual = std::env::args().any(|arg| arg == "--virtual");

    #[cfg(feel_mt)]
    let (mut session, scripted_sdk) = if force_virtual {
        let (session, sdk) = open_virtual();
        (session, Some(sdk))
    } else {
        (Builder::new().build_feel(), None)
    };
    #[cfg(not(feel_mt))]
    let (mut session, scripted_sdk) = {
        if !force_virtual {
            log::info!("Built without the Wacom driver, using a virtual device");
        }
        let (session, sdk) = open_virtual();
        (session, Some(sdk))
    };

    if let Err(e) = session.init() {
        log::error!("Unable to start touch session: {e}");
        std::process::exit(1);
    }
    log::info!("Running on {:?}", session.backend());
    if let Err(e) = session.list_attached_devices() {
        log::warn!("Unable to list devices: {e}");
    }

    for frame in 0u32.. {
        if let Some(sdk) = &scripted_sdk {
            if frame > 60 {
                break;
            }
            scripted(sdk, frame);
        }
        for (id, event) in session.poll() {
            log::info!(
                "finger {id} {} at ({:.3}, {:.3})",
                event.phase.as_ref(),
                event.position[0],
                event.position[1]
            );
        }
        std::thread::sleep(FRAME);
    }
}
