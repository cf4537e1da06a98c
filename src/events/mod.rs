//! Per-finger touch samples.
//!
//! Every finger record delivered by the driver becomes one [`TouchEvent`], tagged with the [`Phase`] the
//! hardware reported. These are handed to the [`Tracker`](crate::tracker::Tracker), which reconciles them into
//! a consistent per-finger lifecycle, and to any [push hooks](crate::tracker::TouchHooks).

pub mod raw;

use crate::device::DeviceId;

/// Hardware-assigned handle of a contact point. Stable for as long as the finger stays on the surface,
/// and recycled by the hardware once it is lifted.
pub type FingerId = i32;

/// Lifecycle tag of a touch sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::FromRepr, strum::AsRefStr)]
#[repr(i32)]
pub enum Phase {
    /// The record carries no lifecycle information.
    None = 0,
    /// The finger just made contact.
    Down = 1,
    /// The finger remains in contact, possibly having moved.
    Hold = 2,
    /// The finger was lifted.
    Up = 3,
}

/// One hardware sample for one finger at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchEvent {
    pub id: FingerId,
    pub phase: Phase,
    /// The device this finger is touching.
    pub device: DeviceId,
    /// Driver frame counter of the batch this sample arrived in.
    pub frame: u32,
    /// X, Y position, normalized `0..=1` across the device surface.
    pub position: [f32; 2],
    /// Width and height of the contact ellipse.
    pub size: [f32; 2],
    /// Rotation of the contact ellipse, in degrees.
    pub orientation: f32,
    /// Raw signal strength, if the device advertises
    /// [`SENSITIVITY`](crate::device::CapabilityFlags::SENSITIVITY). Zero otherwise.
    pub sensitivity: u16,
    /// If true, the driver believes this is a genuine finger. If false, it may be
    /// an accidental touch, forearm, or palm.
    pub confidence: bool,
    /// Total number of fingers reported alongside this one.
    pub finger_count: usize,
}
