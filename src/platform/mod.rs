// Conditionally include each backend...
#[cfg(feel_mt)]
pub(crate) mod feel;
pub(crate) mod virt;

use std::sync::Arc;

use crate::builder::{HitRect, ProcessingMode};
use crate::device::{Capability, DeviceId};
use crate::session::Dispatcher;

/// Errors reported by the multi-touch driver, or while locating it.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkError {
    /// The driver library couldn't be loaded. Typically no Wacom driver is installed.
    #[error("multi-touch library not found")]
    LibraryNotFound,
    /// The driver library is missing an entry point. Likely a very old driver.
    #[error("multi-touch library has no `{0}`")]
    MissingSymbol(&'static str),
    /// The library loaded, but no touch driver is running.
    #[error("touch driver not found")]
    DriverNotFound,
    #[error("driver does not support the requested API version")]
    BadVersion,
    #[error("driver API is outdated")]
    ApiOutdated,
    #[error("invalid parameter")]
    InvalidParam,
    /// The driver is shutting down.
    #[error("driver has quit")]
    Quit,
    #[error("buffer too small")]
    BufferTooSmall,
    /// An operation was attempted before a successful initialization.
    #[error("not initialized")]
    NotInitialized,
    #[error("unknown driver error {0}")]
    Unknown(i32),
}
impl SdkError {
    /// Interpret a driver return code, where zero is success.
    pub(crate) fn check(code: i32) -> Result<(), Self> {
        Err(match code {
            0 => return Ok(()),
            1 => Self::DriverNotFound,
            2 => Self::BadVersion,
            3 => Self::ApiOutdated,
            4 => Self::InvalidParam,
            5 => Self::Quit,
            6 => Self::BufferTooSmall,
            other => Self::Unknown(other),
        })
    }
}

/// Trait that all backends implement, giving the [`Session`](crate::Session) access to the driver's
/// registration model. Callbacks are delivered to the given [`Dispatcher`], which the backend must keep alive
/// for as long as they may fire.
#[enum_dispatch::enum_dispatch]
pub(crate) trait SdkImpl {
    /// Bring up the driver connection. Calling this again after success is a no-op.
    fn initialize(&mut self) -> Result<(), SdkError>;
    /// Listen for attach and detach. The attach callback fires for every already-attached device
    /// immediately on registration.
    fn register_device_callbacks(&mut self, dispatcher: &Arc<Dispatcher>) -> Result<(), SdkError>;
    /// Fill `buffer` with attached device IDs, returning the *total* number attached. This may
    /// exceed the length of the buffer, in which case the excess is not written.
    fn attached_device_ids(&self, buffer: &mut [DeviceId]) -> Result<usize, SdkError>;
    fn capabilities(&self, device: DeviceId) -> Result<Capability, SdkError>;
    fn register_finger_callback(
        &mut self,
        device: DeviceId,
        hit_rect: Option<HitRect>,
        mode: ProcessingMode,
        dispatcher: &Arc<Dispatcher>,
    ) -> Result<(), SdkError>;
}

/// Static dispatch between compiled backends.
#[enum_dispatch::enum_dispatch(SdkImpl)]
pub(crate) enum Sdk {
    #[cfg(feel_mt)]
    Feel(feel::Sdk),
    Virtual(virt::Sdk),
}
