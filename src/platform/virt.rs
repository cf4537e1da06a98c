//! An in-process stand-in for the touch driver.
//!
//! Devices and fingers are injected by the owner of a [`VirtualSdk`] handle, and delivered synchronously to
//! every session built on it, exactly as the driver would deliver them from its own thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use smallvec::SmallVec;

use super::{SdkError, SdkImpl};
use crate::builder::{HitRect, ProcessingMode};
use crate::device::{Capability, DeviceId};
use crate::events::raw::{Finger, FingerCollection};
use crate::session::Dispatcher;

#[derive(Default)]
struct State {
    unavailable: bool,
    initialized: bool,
    devices: Vec<Capability>,
    device_listeners: Vec<Arc<Dispatcher>>,
    finger_listeners: Vec<(DeviceId, Arc<Dispatcher>)>,
}

/// Handle to a virtual touch driver. Clones refer to the same driver.
#[derive(Clone, Default)]
pub struct VirtualSdk {
    state: Arc<Mutex<State>>,
}
impl VirtualSdk {
    /// A running driver with no devices attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// A driver that fails to initialize, as on a machine without one installed.
    #[must_use]
    pub fn unavailable() -> Self {
        let sdk = Self::default();
        sdk.lock().unavailable = true;
        sdk
    }
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
    /// Plug in a device. Sessions listening for devices are notified.
    pub fn attach(&self, capability: Capability) {
        let listeners = {
            let mut state = self.lock();
            state.devices.retain(|known| known.device != capability.device);
            state.devices.push(capability);
            state.device_listeners.clone()
        };
        // Deliver outside the lock, callbacks are free to call back in.
        for listener in listeners {
            listener.device_attached(capability);
        }
    }
    /// Unplug a device. Finger registrations against it are dropped.
    pub fn detach(&self, device: DeviceId) {
        let listeners = {
            let mut state = self.lock();
            state.devices.retain(|known| known.device != device);
            state.finger_listeners.retain(|(id, _)| *id != device);
            state.device_listeners.clone()
        };
        for listener in listeners {
            listener.device_detached(device);
        }
    }
    /// Report a batch of fingers from the given device, to every session reading from it.
    pub fn send(&self, device: DeviceId, frame: u32, fingers: &[Finger]) {
        let listeners: Vec<_> = self
            .lock()
            .finger_listeners
            .iter()
            .filter(|(id, _)| *id == device)
            .map(|(_, listener)| listener.clone())
            .collect();
        if listeners.is_empty() {
            return;
        }
        let collection = FingerCollection {
            device,
            frame,
            fingers: SmallVec::from_slice(fingers),
        };
        for listener in listeners {
            listener.fingers(&collection);
        }
    }
    fn release(&self, dispatcher: &Arc<Dispatcher>) {
        let mut state = self.lock();
        state
            .device_listeners
            .retain(|listener| !Arc::ptr_eq(listener, dispatcher));
        state
            .finger_listeners
            .retain(|(_, listener)| !Arc::ptr_eq(listener, dispatcher));
    }
}

/// One session's connection to a [`VirtualSdk`].
pub(crate) struct Sdk {
    handle: VirtualSdk,
    /// The dispatcher this connection registered, to unregister on drop.
    registered: Option<Arc<Dispatcher>>,
}
impl Sdk {
    pub(crate) fn new(handle: VirtualSdk) -> Self {
        Self {
            handle,
            registered: None,
        }
    }
    fn initialized(&self) -> Result<(), SdkError> {
        if self.handle.lock().initialized {
            Ok(())
        } else {
            Err(SdkError::NotInitialized)
        }
    }
}

impl SdkImpl for Sdk {
    fn initialize(&mut self) -> Result<(), SdkError> {
        let mut state = self.handle.lock();
        if state.unavailable {
            return Err(SdkError::DriverNotFound);
        }
        state.initialized = true;
        Ok(())
    }
    fn register_device_callbacks(&mut self, dispatcher: &Arc<Dispatcher>) -> Result<(), SdkError> {
        self.initialized()?;
        let devices = {
            let mut state = self.handle.lock();
            state.device_listeners.push(dispatcher.clone());
            state.devices.clone()
        };
        self.registered = Some(dispatcher.clone());
        for device in devices {
            dispatcher.device_attached(device);
        }
        Ok(())
    }
    fn attached_device_ids(&self, buffer: &mut [DeviceId]) -> Result<usize, SdkError> {
        self.initialized()?;
        let state = self.handle.lock();
        for (slot, device) in buffer.iter_mut().zip(&state.devices) {
            *slot = device.device;
        }
        Ok(state.devices.len())
    }
    fn capabilities(&self, device: DeviceId) -> Result<Capability, SdkError> {
        self.initialized()?;
        self.handle
            .lock()
            .devices
            .iter()
            .find(|known| known.device == device)
            .copied()
            .ok_or(SdkError::InvalidParam)
    }
    fn register_finger_callback(
        &mut self,
        device: DeviceId,
        // Positions are already normalized, there's no screen to clip against.
        _: Option<HitRect>,
        _: ProcessingMode,
        dispatcher: &Arc<Dispatcher>,
    ) -> Result<(), SdkError> {
        self.initialized()?;
        let mut state = self.handle.lock();
        if !state.devices.iter().any(|known| known.device == device) {
            return Err(SdkError::InvalidParam);
        }
        state.finger_listeners.push((device, dispatcher.clone()));
        self.registered = Some(dispatcher.clone());
        Ok(())
    }
}

impl Drop for Sdk {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.registered.take() {
            self.handle.release(&dispatcher);
        }
    }
}
