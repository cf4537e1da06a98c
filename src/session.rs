//! # Sessions
//!
//! A [`Session`] owns the connection to the touch driver and the [`Tracker`] its callbacks feed.
//! Create one with a [`Builder`](crate::Builder), [`init`](Session::init) it, then [`poll`](Session::poll)
//! once per frame.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::builder::{HitRect, ProcessingMode};
use crate::device::{Capability, DeviceId};
use crate::events::{raw::FingerCollection, Phase};
use crate::platform::{Sdk, SdkError, SdkImpl};
use crate::tracker::{Snapshot, TouchHooks, Tracker};
use crate::Backend;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Sdk(#[from] SdkError),
    /// More devices are attached than the configured [capacity](crate::Builder::max_devices).
    #[error("{found} devices attached, more than would fit in the buffer of {capacity}")]
    TooManyDevices { found: usize, capacity: usize },
}

pub(crate) struct Options {
    pub max_devices: usize,
    pub processing_mode: ProcessingMode,
    pub hit_rect: Option<HitRect>,
    pub reject_low_confidence: bool,
}

/// State written by driver callbacks.
struct Shared {
    tracker: Tracker,
    devices: Vec<Capability>,
}

/// Receives callbacks from a backend. Shared between the [`Session`] and whichever thread
/// the driver calls back on.
pub(crate) struct Dispatcher {
    reject_low_confidence: bool,
    shared: Mutex<Shared>,
}
impl Dispatcher {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        // A panicking hook can poison this. Every tracker state is valid, so carry on.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
    pub(crate) fn device_attached(&self, capability: Capability) {
        log::info!("Device attached: {capability}");
        let mut shared = self.lock();
        shared.devices.retain(|known| known.device != capability.device);
        shared.devices.push(capability);
        shared.tracker.device_attached(&capability);
    }
    pub(crate) fn device_detached(&self, device: DeviceId) {
        log::info!("Device detached: {device}");
        let mut shared = self.lock();
        shared.devices.retain(|known| known.device != device);
        shared.tracker.device_detached(device);
    }
    pub(crate) fn fingers(&self, collection: &FingerCollection) {
        let mut shared = self.lock();
        for finger in &collection.fingers {
            let Some(phase) = Phase::from_repr(finger.phase) else {
                log::warn!(
                    "Dropping finger {} on device {} with unrecognized phase {}",
                    finger.id,
                    collection.device,
                    finger.phase
                );
                continue;
            };
            let event = collection.event(finger, phase);
            if phase == Phase::Down && self.reject_low_confidence && !finger.confidence {
                log::debug!("Rejecting low-confidence touch {}", finger.id);
                shared.tracker.touch_down_untracked(event);
                continue;
            }
            log::trace!("Finger {} {}", finger.id, phase.as_ref());
            shared.tracker.dispatch(event);
        }
    }
}

/// A connection to the touch driver. See [module level docs](`crate::session`) for details.
pub struct Session {
    options: Options,
    dispatcher: Arc<Dispatcher>,
    /// Attach and detach callbacks are registered.
    listening: bool,
    /// Devices with a finger callback registered.
    reading: Vec<DeviceId>,
    sdk: Sdk,
}
impl Session {
    pub(crate) fn new(
        sdk: Sdk,
        options: Options,
        hooks: Option<Box<dyn TouchHooks + Send>>,
    ) -> Self {
        let tracker = hooks.map_or_else(Tracker::new, Tracker::with_hooks);
        let dispatcher = Arc::new(Dispatcher {
            reject_low_confidence: options.reject_low_confidence,
            shared: Mutex::new(Shared {
                tracker,
                devices: Vec::new(),
            }),
        });
        Self {
            options,
            dispatcher,
            listening: false,
            reading: Vec::new(),
            sdk,
        }
    }
    /// Connect to the driver, listen for devices coming and going, and start receiving fingers from every
    /// device attached right now.
    ///
    /// On [`SessionError::TooManyDevices`] the session stays connected and keeps tracking attach and detach,
    /// but no fingers will be received. Devices attached later are not read from.
    ///
    /// Calling this again is harmless: callbacks are never registered twice, and devices attached since the last
    /// call start being read from.
    #[allow(clippy::missing_errors_doc)]
    pub fn init(&mut self) -> Result<(), SessionError> {
        self.sdk.initialize()?;
        log::info!("Successfully initialized the multi-touch driver");

        if !self.listening {
            self.sdk.register_device_callbacks(&self.dispatcher)?;
            self.listening = true;
        }

        for device in self.attached_device_ids()? {
            if self.reading.contains(&device) {
                continue;
            }
            match self.sdk.register_finger_callback(
                device,
                self.options.hit_rect,
                self.options.processing_mode,
                &self.dispatcher,
            ) {
                Ok(()) => {
                    log::debug!("Reading fingers from device {device}");
                    self.reading.push(device);
                }
                Err(e) => log::warn!("Unable to read fingers from device {device}: {e}"),
            }
        }
        Ok(())
    }
    /// Query every attached device for its capabilities, logging each. Devices that fail to report are skipped.
    #[allow(clippy::missing_errors_doc)]
    pub fn list_attached_devices(&self) -> Result<Vec<Capability>, SessionError> {
        let ids = self.attached_device_ids()?;
        let mut capabilities = Vec::with_capacity(ids.len());
        for device in ids {
            match self.sdk.capabilities(device) {
                Ok(capability) => {
                    log::info!("{capability}");
                    capabilities.push(capability);
                }
                Err(e) => log::warn!("Unable to query capabilities of device {device}: {e}"),
            }
        }
        Ok(capabilities)
    }
    fn attached_device_ids(&self) -> Result<Vec<DeviceId>, SessionError> {
        let capacity = self.options.max_devices;
        let mut ids = vec![0; capacity];
        let found = self.sdk.attached_device_ids(&mut ids)?;
        if found > capacity {
            log::error!("{found} devices connected, more than would fit in the buffer of {capacity}");
            return Err(SessionError::TooManyDevices { found, capacity });
        }
        ids.truncate(found);
        Ok(ids)
    }
    /// Take a copy of every active finger. Call exactly once per frame, see [`Tracker::poll`].
    #[must_use = "each finger's Down and Up is only reported once"]
    pub fn poll(&mut self) -> Snapshot {
        self.dispatcher.lock().tracker.poll()
    }
    /// Devices seen by the attach callback and not since detached.
    #[must_use]
    pub fn devices(&self) -> Vec<Capability> {
        self.dispatcher.lock().devices.clone()
    }
    /// Query the driver backend this session runs on.
    #[must_use]
    pub fn backend(&self) -> Backend {
        match self.sdk {
            #[cfg(feel_mt)]
            Sdk::Feel(_) => Backend::WacomFeelMultiTouch,
            Sdk::Virtual(_) => Backend::Virtual,
        }
    }
}
