//! # Touch state tracking
//!
//! Hardware finger callbacks arrive at the driver's cadence, which has nothing to do with the rate a UI
//! consumes them at. The [`Tracker`] sits between the two: callbacks write into a table of active fingers,
//! and the consumer reads a copy of that table once per frame with [`Tracker::poll`].
//!
//! Each finger goes through `Down -> Hold -> Up`, with two guarantees to the polling side:
//! * Every `Down` is observed exactly once, at the position it was first reported at. Motion reported before
//!   the consumer has seen the `Down` is discarded.
//! * Every `Up` is observed exactly once, after which the finger is gone from the table.
//!
//! For example, with `D`/`H`/`U` as hardware callbacks and `poll` as reads:
//! <pre>
//!   D(3 @ 0.2)     -> table {3: Down @ 0.2}
//!   H(3 @ 0.3)     -> ignored, Down not yet observed
//!   poll           -> {3: Down @ 0.2}, table now {3: Hold @ 0.2}
//!   H(3 @ 0.5)     -> table {3: Hold @ 0.5}
//!   U(3)           -> table {3: Up @ 0.5}
//!   poll           -> {3: Up @ 0.5}, table now {}
//! </pre>

use std::collections::BTreeMap;

use crate::device::{Capability, DeviceId};
use crate::events::{FingerId, Phase, TouchEvent};

/// A copy of the active finger table, as returned by [`Tracker::poll`].
pub type Snapshot = BTreeMap<FingerId, TouchEvent>;

/// Push-style delivery, for consumers that would rather react to callbacks than poll.
///
/// Hooks are called synchronously from the driver's callback, before the tracker's own bookkeeping, and
/// receive every record of their phase whether or not the tracker acts on it. This may be on a driver-owned
/// thread, so keep them short!
#[allow(unused_variables)]
pub trait TouchHooks {
    fn on_touch_down(&mut self, event: &TouchEvent) {}
    fn on_touch_hold(&mut self, event: &TouchEvent) {}
    fn on_touch_up(&mut self, event: &TouchEvent) {}
    fn on_device_attached(&mut self, capability: &Capability) {}
    fn on_device_detached(&mut self, device: DeviceId) {}
}

/// See [module level docs](`crate::tracker`) for details.
#[derive(Default)]
pub struct Tracker {
    /// Fingers reported `Down` and not yet polled past their `Up`.
    active: BTreeMap<FingerId, TouchEvent>,
    hooks: Option<Box<dyn TouchHooks + Send>>,
}

impl Tracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn with_hooks(hooks: Box<dyn TouchHooks + Send>) -> Self {
        Self {
            active: BTreeMap::new(),
            hooks: Some(hooks),
        }
    }
    /// Route an event to the handler for its phase. `Phase::None` carries no transition and is ignored.
    pub fn dispatch(&mut self, event: TouchEvent) {
        match event.phase {
            Phase::None => (),
            Phase::Down => self.touch_down(event),
            Phase::Hold => self.touch_hold(event),
            Phase::Up => self.touch_up(event),
        }
    }
    /// A finger made contact. Always (re)starts tracking of this id, at `Down`.
    pub fn touch_down(&mut self, mut event: TouchEvent) {
        event.phase = Phase::Down;
        if let Some(hooks) = &mut self.hooks {
            hooks.on_touch_down(&event);
        }
        self.active.insert(event.id, event);
    }
    /// A finger made contact, but isn't to be tracked. Hooks still see it, the table doesn't.
    pub(crate) fn touch_down_untracked(&mut self, mut event: TouchEvent) {
        event.phase = Phase::Down;
        if let Some(hooks) = &mut self.hooks {
            hooks.on_touch_down(&event);
        }
    }
    /// A finger moved. Only takes effect once the finger's `Down` has been polled.
    pub fn touch_hold(&mut self, mut event: TouchEvent) {
        event.phase = Phase::Hold;
        if let Some(hooks) = &mut self.hooks {
            hooks.on_touch_hold(&event);
        }
        if let Some(entry) = self.active.get_mut(&event.id) {
            if entry.phase == Phase::Hold {
                *entry = event;
            }
        }
    }
    /// A finger was lifted. Geometry stays at the last accepted sample.
    pub fn touch_up(&mut self, mut event: TouchEvent) {
        event.phase = Phase::Up;
        if let Some(hooks) = &mut self.hooks {
            hooks.on_touch_up(&event);
        }
        // Not tracked - e.g. a low-confidence touch that was never accepted as a `Down`.
        if let Some(entry) = self.active.get_mut(&event.id) {
            entry.phase = Phase::Up;
        }
    }
    /// Take a copy of every active finger, as of now.
    ///
    /// This is also what ages the table: fingers returned as `Down` become `Hold`, and fingers returned as `Up`
    /// are forgotten. Call this exactly once per consumer frame.
    #[must_use = "each finger's Down and Up is only reported once"]
    pub fn poll(&mut self) -> Snapshot {
        let snapshot = self.active.clone();
        self.active.retain(|_, entry| match entry.phase {
            Phase::Up => false,
            Phase::Down => {
                entry.phase = Phase::Hold;
                true
            }
            Phase::Hold | Phase::None => true,
        });
        snapshot
    }
    pub(crate) fn device_attached(&mut self, capability: &Capability) {
        if let Some(hooks) = &mut self.hooks {
            hooks.on_device_attached(capability);
        }
    }
    pub(crate) fn device_detached(&mut self, device: DeviceId) {
        if let Some(hooks) = &mut self.hooks {
            hooks.on_device_detached(device);
        }
    }
}

// Manual impl since `hooks` is !Debug
impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("active", &self.active)
            .field("hooks", &self.hooks.as_ref().map(|_| "..."))
            .finish()
    }
}
