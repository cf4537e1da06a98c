//! # Per-finger touch tracking for [Wacom](device) tablets 🖐️
//!
//! Wraps the Wacom Feel Multi-Touch API, which reports fingers through callbacks on a driver-owned thread, and
//! turns those into something a UI can read once per frame: a [snapshot](tracker::Snapshot) of every finger
//! currently on the surface, each in a well-defined [`Down -> Hold -> Up`](events::Phase) lifecycle.
//!
//! To get started, create a [`Builder`], build a [`Session`], [`init`](Session::init) it, and call
//! [`poll`](Session::poll) every frame. Consumers that prefer callbacks can register [`TouchHooks`] instead,
//! or as well.
//!
//! Without a Wacom driver (or off Windows), a [`VirtualSdk`] stands in for it, with devices and fingers
//! injected by hand.
//!
//! **Note:** Hardware reports are passed along as-is. Positions are normalized to the device, not the screen,
//! and no gesture recognition or palm filtering is done beyond the driver's own
//! [confidence](events::TouchEvent::confidence) flag.

#![warn(clippy::pedantic)]
#![forbid(unsafe_op_in_unsafe_fn)]

pub mod builder;
pub mod device;
pub mod events;
mod platform;
pub mod session;
pub mod tracker;
pub use builder::Builder;
pub use platform::virt::VirtualSdk;
pub use platform::SdkError;
pub use session::{Session, SessionError};
pub use tracker::{Snapshot, TouchHooks, Tracker};

/// The driver a [`Session`] talks to, as reported by [`Session::backend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// [Wacom Feel Multi-Touch](https://developer-docs.wacom.com/docs/multi-touch/)
    #[cfg(feel_mt)]
    WacomFeelMultiTouch,
    /// An in-process [`VirtualSdk`].
    Virtual,
}
