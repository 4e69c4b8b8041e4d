//! Raw interface to the VideoCore host library (`libbcm_host.so`).
//!
//! Only the entry points the binding actually drives are declared here; the
//! vendor headers cover far more. Numeric codes and struct layouts must stay
//! exactly as the firmware expects them — the handles are opaque `u32`s and
//! every struct crosses the boundary by pointer.
//!
//! The `extern` block is only compiled when `build.rs` found the library
//! (`have_bcm_host`); the constants and structs are also used by the driver
//! seam and the mock, so they always build.

#[cfg(have_bcm_host)]
use libc::{c_int, c_void};

pub const TV_MAX_ATTACHED_DISPLAYS: usize = 16;

/// The "no handle" sentinel shared by every handle-returning call.
pub const DISPMANX_NO_HANDLE: u32 = 0;
pub const DISPMANX_PROTECTION_NONE: u32 = 0;
pub const DISPMANX_NO_ROTATE: u32 = 0;

/// Alpha is taken from the source pixels themselves.
pub const DISPMANX_FLAGS_ALPHA_FROM_SOURCE: u32 = 0;

// VC_IMAGE_TYPE_T codes for the formats the binding supports.
pub const VC_IMAGE_RGB565: u32 = 1;
pub const VC_IMAGE_RGB888: u32 = 5;
pub const VC_IMAGE_RGBA32: u32 = 15;
pub const VC_IMAGE_RGBA16: u32 = 18;
pub const VC_IMAGE_ARGB8888: u32 = 43;
pub const VC_IMAGE_XRGB8888: u32 = 44;
pub const VC_IMAGE_RGBX8888: u32 = 50;

/// `VC_RECT_T`. Source rectangles are expressed in 16.16 fixed point by the
/// element calls; destination rectangles are plain pixels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// `VC_DISPMANX_ALPHA_T`. `mask` is a resource handle (0 = none).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcAlpha {
    pub flags: u32,
    pub opacity: u32,
    pub mask: u32,
}

/// `TV_ATTACHED_DEVICES_T`, filled in by `vc_tv_get_attached_devices`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TvAttachedDevices {
    pub num_attached: i32,
    pub display_number: [u8; TV_MAX_ATTACHED_DISPLAYS],
}

impl Default for TvAttachedDevices {
    fn default() -> Self {
        Self {
            num_attached: 0,
            display_number: [0; TV_MAX_ATTACHED_DISPLAYS],
        }
    }
}

#[cfg(have_bcm_host)]
extern "C" {
    pub fn bcm_host_init();

    pub fn graphics_get_display_size(
        display_number: u16,
        width: *mut u32,
        height: *mut u32,
    ) -> i32;

    pub fn vc_tv_get_attached_devices(devices: *mut TvAttachedDevices) -> c_int;

    pub fn vc_dispmanx_display_open(device: u32) -> u32;

    pub fn vc_dispmanx_update_start(priority: i32) -> u32;

    pub fn vc_dispmanx_element_add(
        update: u32,
        display: u32,
        layer: i32,
        dest_rect: *const VcRect,
        src: u32,
        src_rect: *const VcRect,
        protection: u32,
        alpha: *const VcAlpha,
        clamp: *const c_void,
        transform: u32,
    ) -> u32;

    pub fn vc_dispmanx_update_submit_sync(update: u32) -> c_int;

    pub fn vc_dispmanx_resource_create(
        image_type: u32,
        width: u32,
        height: u32,
        native_image_handle: *mut u32,
    ) -> u32;

    pub fn vc_dispmanx_resource_write_data(
        handle: u32,
        src_type: u32,
        src_pitch: c_int,
        src_address: *const c_void,
        rect: *const VcRect,
    ) -> c_int;

    pub fn vc_dispmanx_element_remove(update: u32, element: u32) -> c_int;

    pub fn vc_dispmanx_resource_delete(res: u32) -> c_int;
}
