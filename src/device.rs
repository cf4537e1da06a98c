//! # Devices
//!
//! A device is a touch-sensitive surface known to the driver. It may be *integrated*, where touches land
//! directly on a display (e.g. a *Cintiq Pro*), or *opaque*, where the surface is separate from any display
//! (e.g. an *Intuos Pro*) and positions are relative to the pad itself.
//!
//! Devices are reported once when callbacks are registered, and again whenever one is plugged in.
//! Their IDs are assigned by the driver and lose meaning once the device is detached.

/// Driver-assigned device handle.
pub type DeviceId = i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::AsRefStr)]
pub enum DeviceType {
    /// The touch surface is separate from any display.
    Opaque,
    /// The touch surface is a display.
    Integrated,
    /// The driver reported a type this crate doesn't know about.
    Unknown(i32),
}
impl DeviceType {
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Opaque,
            1 => Self::Integrated,
            other => Self::Unknown(other),
        }
    }
}

bitflags::bitflags! {
    /// Optional data streams a device can report, in addition to plain finger records.
    #[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
    pub struct CapabilityFlags: u32 {
        const RAW = 1;
        const BLOB = 2;
        const SENSITIVITY = 4;
    }
}

/// Capability report for a single device.
///
/// # Quirks
/// Some opaque devices report a zero logical size until a touch has occured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capability {
    pub device: DeviceId,
    pub device_type: DeviceType,
    /// Top left of the device in logical (screen) units. Only meaningful for integrated devices.
    pub logical_origin: [f32; 2],
    /// Size of the device in logical (screen) units.
    pub logical_size: [f32; 2],
    /// Physical size of the touch surface, in millimeters.
    pub physical_size: [f32; 2],
    /// Resolution of the touch scan grid, in sensor cells.
    pub reported_size: [i32; 2],
    /// Maximum number of concurrently reported fingers.
    pub finger_max: u32,
    pub blob_max: u32,
    pub flags: CapabilityFlags,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Device ID: {} Type: {} Max Fingers: {} Scan size: {}, {}",
            self.device,
            self.device_type.as_ref(),
            self.finger_max,
            self.reported_size[0],
            self.reported_size[1]
        )
    }
}
