//! Driver-shaped finger records - the form in which backends hand batches to the session,
//! before the phase is interpreted and they're converted to [`TouchEvent`]s.
//!
//! This is also the form fingers are fed to a [`VirtualSdk`](crate::VirtualSdk) in, phase and all.

use smallvec::SmallVec;

use super::{FingerId, Phase, TouchEvent};
use crate::device::DeviceId;

/// A single finger as reported by the driver. `phase` is left uninterpreted, see [`Phase`] for known values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Finger {
    pub id: FingerId,
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub sensitivity: u16,
    pub orientation: f32,
    pub confidence: bool,
    pub phase: i32,
}

/// One callback's worth of fingers.
#[derive(Clone, Debug)]
pub(crate) struct FingerCollection {
    pub device: DeviceId,
    pub frame: u32,
    // Ten fingers is what every Wacom touch device on the market tops out at.
    pub fingers: SmallVec<[Finger; 10]>,
}

impl FingerCollection {
    /// Convert one record of this collection, given its already-interpreted phase.
    pub(crate) fn event(&self, finger: &Finger, phase: Phase) -> TouchEvent {
        TouchEvent {
            id: finger.id,
            phase,
            device: self.device,
            frame: self.frame,
            position: finger.position,
            size: finger.size,
            orientation: finger.orientation,
            sensitivity: finger.sensitivity,
            confidence: finger.confidence,
            finger_count: self.fingers.len(),
        }
    }
}
