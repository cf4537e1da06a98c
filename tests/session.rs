use std::sync::{Arc, Mutex};

use feeltouch::device::{Capability, CapabilityFlags, DeviceId, DeviceType};
use feeltouch::events::raw::Finger;
use feeltouch::events::{Phase, TouchEvent};
use feeltouch::{Backend, Builder, SdkError, SessionError, TouchHooks, VirtualSdk};

fn device(device: DeviceId) -> Capability {
    Capability {
        device,
        device_type: DeviceType::Integrated,
        logical_origin: [0.0, 0.0],
        logical_size: [1920.0, 1080.0],
        physical_size: [344.0, 194.0],
        reported_size: [4096, 2304],
        finger_max: 10,
        blob_max: 0,
        flags: CapabilityFlags::SENSITIVITY,
    }
}

fn finger(id: i32, phase: i32, x: f32, y: f32) -> Finger {
    Finger {
        id,
        position: [x, y],
        size: [0.01, 0.02],
        sensitivity: 300,
        orientation: 15.0,
        confidence: true,
        phase,
    }
}

const DOWN: i32 = Phase::Down as i32;
const HOLD: i32 = Phase::Hold as i32;
const UP: i32 = Phase::Up as i32;

#[test]
fn init_fails_without_driver() {
    let mut session = Builder::new().build_virtual(VirtualSdk::unavailable());
    assert_eq!(
        session.init(),
        Err(SessionError::Sdk(SdkError::DriverNotFound))
    );
}

#[test]
fn listing_requires_init() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let session = Builder::new().build_virtual(sdk);
    assert_eq!(
        session.list_attached_devices(),
        Err(SessionError::Sdk(SdkError::NotInitialized))
    );
}

#[test]
fn lists_attached_devices() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    sdk.attach(device(4));
    let mut session = Builder::new().build_virtual(sdk);
    session.init().unwrap();

    assert_eq!(session.backend(), Backend::Virtual);
    let listed = session.list_attached_devices().unwrap();
    assert_eq!(listed, [device(1), device(4)]);
    // Listing is a pure read.
    assert_eq!(session.devices(), [device(1), device(4)]);
}

#[test]
fn lifecycle_through_driver() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new().build_virtual(sdk.clone());
    session.init().unwrap();

    sdk.send(1, 0, &[finger(3, DOWN, 0.2, 0.2)]);
    // Moved before the consumer saw the Down.
    sdk.send(1, 1, &[finger(3, HOLD, 0.3, 0.3)]);

    let snapshot = session.poll();
    let event = snapshot[&3];
    assert_eq!(event.phase, Phase::Down);
    assert_eq!(event.position, [0.2, 0.2]);
    assert_eq!(event.device, 1);
    assert_eq!(event.frame, 0);
    assert_eq!(event.finger_count, 1);
    assert_eq!(event.sensitivity, 300);

    sdk.send(1, 2, &[finger(3, HOLD, 0.5, 0.5)]);
    let snapshot = session.poll();
    assert_eq!(snapshot[&3].phase, Phase::Hold);
    assert_eq!(snapshot[&3].position, [0.5, 0.5]);
    assert_eq!(snapshot[&3].frame, 2);

    sdk.send(1, 3, &[finger(3, UP, 0.5, 0.5)]);
    let snapshot = session.poll();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[&3].phase, Phase::Up);

    assert!(session.poll().is_empty());
}

#[test]
fn batch_reports_finger_count() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new().build_virtual(sdk.clone());
    session.init().unwrap();

    sdk.send(
        1,
        0,
        &[finger(0, DOWN, 0.1, 0.1), finger(1, DOWN, 0.9, 0.9)],
    );
    let snapshot = session.poll();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.values().all(|event| event.finger_count == 2));
}

#[test]
fn too_many_devices() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    sdk.attach(device(2));
    let mut session = Builder::new().max_devices(1).build_virtual(sdk.clone());

    assert_eq!(
        session.init(),
        Err(SessionError::TooManyDevices {
            found: 2,
            capacity: 1
        })
    );
    // No finger callbacks were registered.
    sdk.send(1, 0, &[finger(0, DOWN, 0.5, 0.5)]);
    assert!(session.poll().is_empty());

    // Attach and detach still are.
    assert_eq!(session.devices().len(), 2);
    sdk.detach(2);
    assert_eq!(session.devices(), [device(1)]);
}

#[test]
fn unrecognized_phase_is_dropped() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new().build_virtual(sdk.clone());
    session.init().unwrap();

    sdk.send(1, 0, &[finger(0, 42, 0.5, 0.5), finger(1, DOWN, 0.1, 0.1)]);
    let snapshot = session.poll();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains_key(&1));
}

#[test]
fn none_phase_is_dropped() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new().build_virtual(sdk.clone());
    session.init().unwrap();

    sdk.send(1, 0, &[finger(0, Phase::None as i32, 0.5, 0.5)]);
    assert!(session.poll().is_empty());
}

#[test]
fn stray_hold_and_up_are_ignored() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new().build_virtual(sdk.clone());
    session.init().unwrap();

    sdk.send(1, 0, &[finger(6, HOLD, 0.5, 0.5), finger(7, UP, 0.5, 0.5)]);
    assert!(session.poll().is_empty());
}

#[test]
fn low_confidence_rejection() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new()
        .reject_low_confidence(true)
        .build_virtual(sdk.clone());
    session.init().unwrap();

    let palm = Finger {
        confidence: false,
        ..finger(2, DOWN, 0.5, 0.5)
    };
    sdk.send(1, 0, &[palm, finger(5, DOWN, 0.1, 0.1)]);
    let snapshot = session.poll();
    assert_eq!(snapshot.len(), 1);
    assert!(snapshot.contains_key(&5));

    // The palm's later records have nothing to act on.
    sdk.send(1, 1, &[Finger { phase: UP, ..palm }]);
    assert!(!session.poll().contains_key(&2));
}

#[test]
fn rejected_touch_still_reaches_hooks() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new()
        .reject_low_confidence(true)
        .hooks(Recorder(seen.clone()))
        .build_virtual(sdk.clone());
    session.init().unwrap();

    let palm = Finger {
        confidence: false,
        ..finger(2, DOWN, 0.5, 0.5)
    };
    sdk.send(1, 0, &[palm]);
    assert!(session.poll().is_empty());
    sdk.send(1, 1, &[Finger { phase: HOLD, ..palm }]);
    sdk.send(1, 2, &[Finger { phase: UP, ..palm }]);
    assert!(session.poll().is_empty());

    assert_eq!(
        *seen.lock().unwrap(),
        [
            Seen::Attached(1),
            Seen::Touch(2, Phase::Down),
            Seen::Touch(2, Phase::Hold),
            Seen::Touch(2, Phase::Up),
        ]
    );
}

#[test]
fn low_confidence_kept_by_default() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new().build_virtual(sdk.clone());
    session.init().unwrap();

    let palm = Finger {
        confidence: false,
        ..finger(2, DOWN, 0.5, 0.5)
    };
    sdk.send(1, 0, &[palm]);
    let snapshot = session.poll();
    assert!(!snapshot[&2].confidence);
}

#[test]
fn late_devices_are_listed_but_not_read() {
    let sdk = VirtualSdk::new();
    let mut session = Builder::new().build_virtual(sdk.clone());
    session.init().unwrap();
    assert!(session.devices().is_empty());

    sdk.attach(device(9));
    assert_eq!(session.devices(), [device(9)]);
    sdk.send(9, 0, &[finger(0, DOWN, 0.5, 0.5)]);
    assert!(session.poll().is_empty());
}

#[derive(Debug, PartialEq)]
enum Seen {
    Attached(DeviceId),
    Detached(DeviceId),
    Touch(i32, Phase),
}

struct Recorder(Arc<Mutex<Vec<Seen>>>);
impl TouchHooks for Recorder {
    fn on_touch_down(&mut self, event: &TouchEvent) {
        self.0.lock().unwrap().push(Seen::Touch(event.id, event.phase));
    }
    fn on_touch_hold(&mut self, event: &TouchEvent) {
        self.0.lock().unwrap().push(Seen::Touch(event.id, event.phase));
    }
    fn on_touch_up(&mut self, event: &TouchEvent) {
        self.0.lock().unwrap().push(Seen::Touch(event.id, event.phase));
    }
    fn on_device_attached(&mut self, capability: &Capability) {
        self.0.lock().unwrap().push(Seen::Attached(capability.device));
    }
    fn on_device_detached(&mut self, device: DeviceId) {
        self.0.lock().unwrap().push(Seen::Detached(device));
    }
}

#[test]
fn hooks_receive_pushes() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new()
        .hooks(Recorder(seen.clone()))
        .build_virtual(sdk.clone());
    session.init().unwrap();

    sdk.send(1, 0, &[finger(0, DOWN, 0.5, 0.5)]);
    sdk.send(1, 1, &[finger(0, HOLD, 0.6, 0.6)]);
    sdk.send(1, 2, &[finger(0, UP, 0.6, 0.6)]);
    sdk.detach(1);

    assert_eq!(
        *seen.lock().unwrap(),
        [
            Seen::Attached(1),
            Seen::Touch(0, Phase::Down),
            Seen::Touch(0, Phase::Hold),
            Seen::Touch(0, Phase::Up),
            Seen::Detached(1),
        ]
    );
    // Polling is unaffected by pushes: the Hold arrived before the Down was polled.
    let snapshot = session.poll();
    assert_eq!(snapshot[&0].phase, Phase::Up);
    assert_eq!(snapshot[&0].position, [0.5, 0.5]);
}

#[test]
fn repeated_init_registers_once() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new()
        .hooks(Recorder(seen.clone()))
        .build_virtual(sdk.clone());
    session.init().unwrap();
    session.init().unwrap();

    sdk.send(1, 0, &[finger(0, DOWN, 0.5, 0.5)]);
    assert_eq!(
        *seen.lock().unwrap(),
        [Seen::Attached(1), Seen::Touch(0, Phase::Down)]
    );
    assert_eq!(session.devices(), [device(1)]);
    assert_eq!(session.poll()[&0].phase, Phase::Down);
}

#[test]
fn init_again_reads_late_devices() {
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new().build_virtual(sdk.clone());
    session.init().unwrap();

    sdk.attach(device(9));
    session.init().unwrap();
    sdk.send(1, 0, &[finger(0, DOWN, 0.1, 0.1)]);
    sdk.send(9, 0, &[finger(1, DOWN, 0.9, 0.9)]);

    let snapshot = session.poll();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[&0].device, 1);
    assert_eq!(snapshot[&1].device, 9);
    assert_eq!(session.devices(), [device(1), device(9)]);
}

#[test]
fn dropped_session_stops_listening() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sdk = VirtualSdk::new();
    sdk.attach(device(1));
    let mut session = Builder::new()
        .hooks(Recorder(seen.clone()))
        .build_virtual(sdk.clone());
    session.init().unwrap();
    drop(session);

    sdk.send(1, 0, &[finger(0, DOWN, 0.5, 0.5)]);
    sdk.detach(1);
    assert_eq!(*seen.lock().unwrap(), [Seen::Attached(1)]);
}
