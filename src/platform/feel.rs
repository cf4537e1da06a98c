//! Implementation details for the Wacom Feel Multi-Touch API.
//!
//! Within this module, it is sound to assume `cfg(feel_mt) == true`
//! (compiling for a windows target + has deps, or is building docs).
//!
//! The API lives in `WacomMT.dll`, installed alongside the Wacom driver. It's loaded at [`SdkImpl::initialize`]
//! rather than linked, so that machines without a driver get an error instead of a failure to launch.

use std::ffi::c_void;
use std::sync::Arc;

use windows::core::{s, w};
use windows::Win32::Foundation::HMODULE;
use windows::Win32::System::LibraryLoader::{FreeLibrary, GetProcAddress, LoadLibraryW};

use super::{SdkError, SdkImpl};
use crate::builder::{HitRect, ProcessingMode};
use crate::device::{Capability, CapabilityFlags, DeviceId, DeviceType};
use crate::events::raw::{Finger, FingerCollection};
use crate::session::Dispatcher;

/// `WACOM_MULTI_TOUCH_API_VERSION`
const API_VERSION: i32 = 4;

// Mirrors of the C structures. Field order and types must match `WacomMultiTouchTypes.h` exactly.

#[repr(C)]
#[derive(Clone, Copy, Default)]
#[allow(non_snake_case, dead_code)]
struct RawCapability {
    Version: i32,
    DeviceID: i32,
    Type: i32,
    LogicalOriginX: f32,
    LogicalOriginY: f32,
    LogicalWidth: f32,
    LogicalHeight: f32,
    PhysicalSizeX: f32,
    PhysicalSizeY: f32,
    ReportedSizeX: i32,
    ReportedSizeY: i32,
    ScanSizeX: i32,
    ScanSizeY: i32,
    FingerMax: i32,
    BlobMax: i32,
    BlobPointsMax: i32,
    CapabilityFlags: i32,
}
impl From<RawCapability> for Capability {
    // Flags are reinterpreted bitwise.
    #[allow(clippy::cast_sign_loss)]
    fn from(raw: RawCapability) -> Self {
        // Negative maximums are garbage, treat as none.
        let non_negative = |v: i32| u32::try_from(v).unwrap_or(0);
        Self {
            device: raw.DeviceID,
            device_type: DeviceType::from_raw(raw.Type),
            logical_origin: [raw.LogicalOriginX, raw.LogicalOriginY],
            logical_size: [raw.LogicalWidth, raw.LogicalHeight],
            physical_size: [raw.PhysicalSizeX, raw.PhysicalSizeY],
            reported_size: [raw.ReportedSizeX, raw.ReportedSizeY],
            finger_max: non_negative(raw.FingerMax),
            blob_max: non_negative(raw.BlobMax),
            // Unknown bits dropped.
            flags: CapabilityFlags::from_bits_truncate(raw.CapabilityFlags as u32),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(non_snake_case)]
struct RawFinger {
    FingerID: i32,
    X: f32,
    Y: f32,
    Width: f32,
    Height: f32,
    Sensitivity: u16,
    Orientation: f32,
    Confidence: bool,
    TouchState: i32,
}
impl From<&RawFinger> for Finger {
    fn from(raw: &RawFinger) -> Self {
        Self {
            id: raw.FingerID,
            position: [raw.X, raw.Y],
            size: [raw.Width, raw.Height],
            sensitivity: raw.Sensitivity,
            orientation: raw.Orientation,
            confidence: raw.Confidence,
            phase: raw.TouchState,
        }
    }
}

#[repr(C)]
#[allow(non_snake_case, dead_code)]
struct RawFingerCollection {
    Version: i32,
    DeviceID: i32,
    FrameNumber: i32,
    FingerCount: i32,
    Fingers: *mut RawFinger,
}

// Only ever read by the driver.
#[repr(C)]
#[allow(non_snake_case, dead_code)]
struct RawHitRect {
    originX: f32,
    originY: f32,
    width: f32,
    height: f32,
}

type AttachCallback = unsafe extern "system" fn(RawCapability, *mut c_void);
type DetachCallback = unsafe extern "system" fn(i32, *mut c_void);
type FingerCallback = unsafe extern "system" fn(*mut RawFingerCollection, *mut c_void) -> i32;

/// Entry points resolved from the dll.
struct Api {
    module: HMODULE,
    initialize: unsafe extern "system" fn(i32) -> i32,
    quit: unsafe extern "system" fn(),
    get_attached_device_ids: unsafe extern "system" fn(*mut i32, usize) -> i32,
    get_device_capabilities: unsafe extern "system" fn(i32, *mut RawCapability) -> i32,
    register_attach_callback: unsafe extern "system" fn(Option<AttachCallback>, *mut c_void) -> i32,
    register_detach_callback: unsafe extern "system" fn(Option<DetachCallback>, *mut c_void) -> i32,
    register_finger_read_callback:
        unsafe extern "system" fn(i32, *mut RawHitRect, i32, Option<FingerCallback>, *mut c_void) -> i32,
}
impl Api {
    fn load() -> Result<Self, SdkError> {
        // Safety: Loading the wacom library runs no initialization code of note.
        let module = unsafe { LoadLibraryW(w!("WacomMT.dll")) }.map_err(|_| SdkError::LibraryNotFound)?;

        macro_rules! resolve {
            ($name:literal) => {{
                // Safety: `module` is a live module handle for the duration of this fn.
                let Some(proc) = (unsafe { GetProcAddress(module, s!($name)) }) else {
                    // Safety: Nothing was resolved from it, so nothing can outlive it.
                    let _ = unsafe { FreeLibrary(module) };
                    return Err(SdkError::MissingSymbol($name));
                };
                // Safety: The signature is given by `WacomMultiTouch.h`, transcribed into the field this is assigned to.
                unsafe { std::mem::transmute(proc) }
            }};
        }

        Ok(Self {
            module,
            initialize: resolve!("WacomMTInitialize"),
            quit: resolve!("WacomMTQuit"),
            get_attached_device_ids: resolve!("WacomMTGetAttachedDeviceIDs"),
            get_device_capabilities: resolve!("WacomMTGetDeviceCapabilities"),
            register_attach_callback: resolve!("WacomMTRegisterAttachCallback"),
            register_detach_callback: resolve!("WacomMTRegisterDetachCallback"),
            register_finger_read_callback: resolve!("WacomMTRegisterFingerReadCallback"),
        })
    }
}

// Trampolines from the driver's thread into the dispatcher. `user` is always the pointer handed out by
// `Sdk::user_data`, which stays valid for as long as `Sdk::dispatcher` holds it.

unsafe extern "system" fn on_attached(info: RawCapability, user: *mut c_void) {
    // Safety: See above.
    let dispatcher = unsafe { &*user.cast_const().cast::<Dispatcher>() };
    dispatcher.device_attached(info.into());
}
unsafe extern "system" fn on_detached(device: i32, user: *mut c_void) {
    // Safety: See above.
    let dispatcher = unsafe { &*user.cast_const().cast::<Dispatcher>() };
    dispatcher.device_detached(device);
}
// Frame number is a wrapping counter, reinterpreted bitwise.
#[allow(clippy::cast_sign_loss)]
unsafe extern "system" fn on_fingers(packet: *mut RawFingerCollection, user: *mut c_void) -> i32 {
    // Safety: See above.
    let dispatcher = unsafe { &*user.cast_const().cast::<Dispatcher>() };
    // Safety: The driver owns the packet for the duration of the callback.
    let Some(packet) = (unsafe { packet.as_ref() }) else {
        return 0;
    };
    let count = usize::try_from(packet.FingerCount).unwrap_or(0);
    let fingers = if count == 0 || packet.Fingers.is_null() {
        &[][..]
    } else {
        // Safety: `Fingers` points to `FingerCount` records, owned by the driver for the duration of the callback.
        unsafe { std::slice::from_raw_parts(packet.Fingers, count) }
    };
    dispatcher.fingers(&FingerCollection {
        device: packet.DeviceID,
        frame: packet.FrameNumber as u32,
        fingers: fingers.iter().map(Finger::from).collect(),
    });
    0
}

pub(crate) struct Sdk {
    api: Option<Api>,
    /// Set once callbacks are registered. The driver holds a raw pointer into this until [`Api::quit`].
    dispatcher: Option<Arc<Dispatcher>>,
}
impl Sdk {
    pub(crate) fn new() -> Self {
        Self {
            api: None,
            dispatcher: None,
        }
    }
    fn api(&self) -> Result<&Api, SdkError> {
        self.api.as_ref().ok_or(SdkError::NotInitialized)
    }
    /// Remember the dispatcher and get the pointer to hand to the driver.
    fn user_data(&mut self, dispatcher: &Arc<Dispatcher>) -> *mut c_void {
        let kept = self.dispatcher.get_or_insert_with(|| dispatcher.clone());
        // Only ever one session per `Sdk`, so this is the same dispatcher every time.
        debug_assert!(Arc::ptr_eq(kept, dispatcher));
        Arc::as_ptr(kept).cast_mut().cast()
    }
}

impl SdkImpl for Sdk {
    fn initialize(&mut self) -> Result<(), SdkError> {
        if self.api.is_some() {
            return Ok(());
        }
        let api = Api::load()?;
        // Safety: Plain FFI call.
        if let Err(e) = SdkError::check(unsafe { (api.initialize)(API_VERSION) }) {
            // Safety: Init failed, nothing refers to the library.
            let _ = unsafe { FreeLibrary(api.module) };
            return Err(e);
        }
        self.api = Some(api);
        Ok(())
    }
    fn register_device_callbacks(&mut self, dispatcher: &Arc<Dispatcher>) -> Result<(), SdkError> {
        self.api()?;
        let user = self.user_data(dispatcher);
        let api = self.api()?;
        // Safety: `user` lives as long as `self.dispatcher`, which outlives the driver's use of it. See Drop.
        unsafe {
            SdkError::check((api.register_attach_callback)(Some(on_attached), user))?;
            SdkError::check((api.register_detach_callback)(Some(on_detached), user))?;
        }
        Ok(())
    }
    fn attached_device_ids(&self, buffer: &mut [DeviceId]) -> Result<usize, SdkError> {
        let api = self.api()?;
        // Size is in *bytes*.
        let bytes = std::mem::size_of_val(buffer);
        // Safety: `buffer` is valid for writes of `bytes` bytes.
        let count = unsafe { (api.get_attached_device_ids)(buffer.as_mut_ptr(), bytes) };
        Ok(usize::try_from(count).unwrap_or(0))
    }
    fn capabilities(&self, device: DeviceId) -> Result<Capability, SdkError> {
        let api = self.api()?;
        let mut raw = RawCapability::default();
        // Safety: `raw` is a valid, writable capability struct.
        SdkError::check(unsafe { (api.get_device_capabilities)(device, &mut raw) })?;
        Ok(raw.into())
    }
    fn register_finger_callback(
        &mut self,
        device: DeviceId,
        hit_rect: Option<HitRect>,
        mode: ProcessingMode,
        dispatcher: &Arc<Dispatcher>,
    ) -> Result<(), SdkError> {
        self.api()?;
        let user = self.user_data(dispatcher);
        let api = self.api()?;
        let mut rect = hit_rect.map(|rect| RawHitRect {
            originX: rect.origin[0],
            originY: rect.origin[1],
            width: rect.size[0],
            height: rect.size[1],
        });
        let rect_ptr = rect
            .as_mut()
            .map_or(std::ptr::null_mut(), std::ptr::from_mut);
        // Safety: The driver copies the rect during the call. `user` as in `register_device_callbacks`.
        SdkError::check(unsafe {
            (api.register_finger_read_callback)(device, rect_ptr, mode.as_raw(), Some(on_fingers), user)
        })
    }
}

impl Drop for Sdk {
    fn drop(&mut self) {
        if let Some(api) = self.api.take() {
            unsafe {
                // Safety: After quit returns, no more callbacks are made. Only then is it ok to let go of
                // the dispatcher and the library.
                (api.quit)();
                let _ = FreeLibrary(api.module);
            }
        }
        self.dispatcher = None;
    }
}
