//! Builder-style configuration for a touch [`Session`].
//!
//! For a default configuration, `Builder::new().build_{feel, virtual}` is all you need!

use crate::platform::{virt, Sdk};
use crate::tracker::TouchHooks;
use crate::{Session, VirtualSdk};

/// How many attached devices a session will register with, unless configured otherwise.
pub const MAX_ATTACHED_DEVICES: usize = 10;

/// How the driver shares finger data between its clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::AsRefStr)]
pub enum ProcessingMode {
    /// Receive fingers, and let the OS also turn them into gestures and mouse events.
    #[default]
    None,
    /// Receive fingers without consuming them.
    Observer,
    /// Receive fingers, with the OS only acting on those passed back as unhandled.
    PassThrough,
}
impl ProcessingMode {
    pub(crate) fn as_raw(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Observer => 1,
            Self::PassThrough => 2,
        }
    }
}

/// A rectangle in logical (screen) units. Fingers outside of it are not reported.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRect {
    pub origin: [f32; 2],
    pub size: [f32; 2],
}

/// Pre-construction configuration for a [`Session`].
pub struct Builder {
    max_devices: usize,
    processing_mode: ProcessingMode,
    hit_rect: Option<HitRect>,
    reject_low_confidence: bool,
    hooks: Option<Box<dyn TouchHooks + Send>>,
}
impl Default for Builder {
    fn default() -> Self {
        Self {
            max_devices: MAX_ATTACHED_DEVICES,
            processing_mode: ProcessingMode::default(),
            hit_rect: None,
            reject_low_confidence: false,
            hooks: None,
        }
    }
}

/// # Configuration
impl Builder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Capacity of the device buffer. If more devices than this are attached at [`Session::init`],
    /// initialization fails with [`SessionError::TooManyDevices`](crate::SessionError::TooManyDevices).
    /// Default [`MAX_ATTACHED_DEVICES`].
    #[must_use]
    pub fn max_devices(self, max_devices: usize) -> Self {
        Self {
            max_devices,
            ..self
        }
    }
    /// Default [`ProcessingMode::None`].
    #[must_use]
    pub fn processing_mode(self, processing_mode: ProcessingMode) -> Self {
        Self {
            processing_mode,
            ..self
        }
    }
    /// Only report fingers within this rectangle. Default `None`, the whole device.
    #[must_use]
    pub fn hit_rect(self, hit_rect: Option<HitRect>) -> Self {
        Self { hit_rect, ..self }
    }
    /// Drop fingers the driver isn't confident about (palms, forearms) when they touch down. Their later
    /// motion and release are then never tracked. Default `false`.
    ///
    /// This does not affect push hooks, which see every record.
    #[must_use]
    pub fn reject_low_confidence(self, reject_low_confidence: bool) -> Self {
        Self {
            reject_low_confidence,
            ..self
        }
    }
    /// Receive callbacks as they arrive, in addition to polling.
    #[must_use]
    pub fn hooks(self, hooks: impl TouchHooks + Send + 'static) -> Self {
        Self {
            hooks: Some(Box::new(hooks)),
            ..self
        }
    }
}

/// # Finishing
impl Builder {
    /// Build a session on the Wacom Feel Multi-Touch driver. The driver is not contacted until [`Session::init`].
    #[cfg(feel_mt)]
    #[must_use]
    pub fn build_feel(self) -> Session {
        self.build(Sdk::from(crate::platform::feel::Sdk::new()))
    }
    /// Build a session on an in-process [`VirtualSdk`], which may be driven by the caller.
    #[must_use]
    pub fn build_virtual(self, sdk: VirtualSdk) -> Session {
        self.build(Sdk::from(virt::Sdk::new(sdk)))
    }
    fn build(self, sdk: Sdk) -> Session {
        let Self {
            max_devices,
            processing_mode,
            hit_rect,
            reject_low_confidence,
            hooks,
        } = self;
        Session::new(
            sdk,
            crate::session::Options {
                max_devices,
                processing_mode,
                hit_rect,
                reject_low_confidence,
            },
            hooks,
        )
    }
}
