//! The real driver: thin unsafe calls into `libbcm_host`.

use crate::driver::DispmanxDriver;
use crate::ffi;
use crate::ffi::{TvAttachedDevices, VcAlpha, VcRect};
use log::debug;
use once_cell::sync::OnceCell;
use std::ptr;

/// Guards the process-wide `bcm_host_init()` call. The firmware must be
/// initialized at most once per process; `OnceCell` makes the first-use
/// check-and-set safe against concurrent callers.
static HOST_INIT: OnceCell<()> = OnceCell::new();

/// Driver backed by the VideoCore host library.
///
/// Stateless: every call goes straight to the native entry point. All
/// methods block the calling thread until the firmware responds.
#[derive(Debug, Default, Clone, Copy)]
pub struct VideoCoreDriver;

impl DispmanxDriver for VideoCoreDriver {
    fn init_host(&self) {
        HOST_INIT.get_or_init(|| {
            debug!("Initialized bcm_host");
            unsafe { ffi::bcm_host_init() }
        });
    }

    fn attached_devices(&self) -> (i32, TvAttachedDevices) {
        let mut devices = TvAttachedDevices::default();
        let status = unsafe { ffi::vc_tv_get_attached_devices(&mut devices) };
        (status, devices)
    }

    fn display_size(&self, device_id: u16) -> (i32, u32, u32) {
        let mut width = 0u32;
        let mut height = 0u32;
        let status =
            unsafe { ffi::graphics_get_display_size(device_id, &mut width, &mut height) };
        (status, width, height)
    }

    fn display_open(&self, device_id: u32) -> u32 {
        unsafe { ffi::vc_dispmanx_display_open(device_id) }
    }

    fn update_start(&self, priority: i32) -> u32 {
        unsafe { ffi::vc_dispmanx_update_start(priority) }
    }

    fn element_add(
        &self,
        update: u32,
        display: u32,
        layer: i32,
        dest_rect: &VcRect,
        resource: u32,
        src_rect: &VcRect,
        protection: u32,
        alpha: &VcAlpha,
        transform: u32,
    ) -> u32 {
        unsafe {
            ffi::vc_dispmanx_element_add(
                update,
                display,
                layer,
                dest_rect,
                resource,
                src_rect,
                protection,
                alpha,
                ptr::null(),
                transform,
            )
        }
    }

    fn update_submit_sync(&self, update: u32) -> i32 {
        unsafe { ffi::vc_dispmanx_update_submit_sync(update) }
    }

    fn resource_create(&self, image_type: u32, width: u32, height: u32) -> u32 {
        // The out-param receives the firmware-side image pointer; the
        // binding has no use for it.
        let mut native_image_handle = 0u32;
        unsafe {
            ffi::vc_dispmanx_resource_create(image_type, width, height, &mut native_image_handle)
        }
    }

    fn resource_write_data(
        &self,
        resource: u32,
        image_type: u32,
        pitch: i32,
        data: &[u8],
        rect: &VcRect,
    ) -> i32 {
        unsafe {
            ffi::vc_dispmanx_resource_write_data(
                resource,
                image_type,
                pitch,
                data.as_ptr() as *const libc::c_void,
                rect,
            )
        }
    }

    fn element_remove(&self, update: u32, element: u32) -> i32 {
        unsafe { ffi::vc_dispmanx_element_remove(update, element) }
    }

    fn resource_delete(&self, resource: u32) -> i32 {
        unsafe { ffi::vc_dispmanx_resource_delete(resource) }
    }
}
