//! DispmanxDriver trait - minimal seam over the native entry points.
//!
//! One method per native call, with raw status codes and raw handle values
//! as return types. All sentinel and status interpretation happens in the
//! session and enumeration code on top, which keeps that logic identical
//! whether it runs against the real firmware or the scripted mock.
//!
//! Implementations: [`VideoCoreDriver`](crate::drivers::vc::VideoCoreDriver)
//! calls into `libbcm_host`; [`MockDriver`](crate::drivers::mock::MockDriver)
//! records calls and plays back scripted results for tests.

use crate::ffi::{TvAttachedDevices, VcAlpha, VcRect};

/// Call-level interface to the DispmanX native surface.
///
/// Conventions carried over from the native API: handle-returning calls use
/// `0` as the "no handle" sentinel; status-returning calls use `0` for
/// success. `init_host` must be idempotent — it is invoked before every
/// enumeration and construction, and only the first call in the process may
/// do work.
pub trait DispmanxDriver {
    /// `bcm_host_init`, process-wide and idempotent.
    fn init_host(&self);

    /// `vc_tv_get_attached_devices`. Returns the status and the descriptor
    /// (only meaningful on zero status).
    fn attached_devices(&self) -> (i32, TvAttachedDevices);

    /// `graphics_get_display_size`. Returns status, width, height; a
    /// negative status means the query failed.
    fn display_size(&self, device_id: u16) -> (i32, u32, u32);

    /// `vc_dispmanx_display_open`.
    fn display_open(&self, device_id: u32) -> u32;

    /// `vc_dispmanx_update_start`.
    fn update_start(&self, priority: i32) -> u32;

    /// `vc_dispmanx_element_add`, binding `resource` into `display`'s
    /// composition stack within the open `update` transaction.
    #[allow(clippy::too_many_arguments)]
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
    ) -> u32;

    /// `vc_dispmanx_update_submit_sync`; blocks until the compositor has
    /// applied the transaction.
    fn update_submit_sync(&self, update: u32) -> i32;

    /// `vc_dispmanx_resource_create`.
    fn resource_create(&self, image_type: u32, width: u32, height: u32) -> u32;

    /// `vc_dispmanx_resource_write_data`, copying `data` into the resource
    /// with the given pitch for the region `rect`.
    fn resource_write_data(
        &self,
        resource: u32,
        image_type: u32,
        pitch: i32,
        data: &[u8],
        rect: &VcRect,
    ) -> i32;

    /// `vc_dispmanx_element_remove`, within the open `update` transaction.
    fn element_remove(&self, update: u32, element: u32) -> i32;

    /// `vc_dispmanx_resource_delete`.
    fn resource_delete(&self, resource: u32) -> i32;
}

// Every method takes &self, so a shared reference is itself a driver. Tests
// lean on this to keep a mock inspectable while a session owns the driver
// value.
impl<D: DispmanxDriver + ?Sized> DispmanxDriver for &D {
    fn init_host(&self) {
        (**self).init_host()
    }

    fn attached_devices(&self) -> (i32, TvAttachedDevices) {
        (**self).attached_devices()
    }

    fn display_size(&self, device_id: u16) -> (i32, u32, u32) {
        (**self).display_size(device_id)
    }

    fn display_open(&self, device_id: u32) -> u32 {
        (**self).display_open(device_id)
    }

    fn update_start(&self, priority: i32) -> u32 {
        (**self).update_start(priority)
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
        (**self).element_add(
            update, display, layer, dest_rect, resource, src_rect, protection, alpha, transform,
        )
    }

    fn update_submit_sync(&self, update: u32) -> i32 {
        (**self).update_submit_sync(update)
    }

    fn resource_create(&self, image_type: u32, width: u32, height: u32) -> u32 {
        (**self).resource_create(image_type, width, height)
    }

    fn resource_write_data(
        &self,
        resource: u32,
        image_type: u32,
        pitch: i32,
        data: &[u8],
        rect: &VcRect,
    ) -> i32 {
        (**self).resource_write_data(resource, image_type, pitch, data, rect)
    }

    fn element_remove(&self, update: u32, element: u32) -> i32 {
        (**self).element_remove(update, element)
    }

    fn resource_delete(&self, resource: u32) -> i32 {
        (**self).resource_delete(resource)
    }
}
