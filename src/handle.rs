//! Opaque native handle wrappers.
//!
//! Every DispmanX object is identified by a `u32` where zero doubles as the
//! "no handle" sentinel, so each wrapper holds a `NonZeroU32` and `from_raw`
//! turns a sentinel into `None` at the boundary. The wrappers are
//! deliberately neither `Copy` nor `Clone`: a live handle belongs to exactly
//! one session, and handing out duplicates would let two owners race the
//! native teardown calls.

use std::num::NonZeroU32;

macro_rules! native_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, PartialEq, Eq)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wraps a raw native return value; zero is the sentinel for
            /// "no handle" and yields `None`.
            pub fn from_raw(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            /// The raw value to pass back across the boundary.
            pub fn get(&self) -> u32 {
                self.0.get()
            }
        }
    };
}

native_handle! {
    /// An open display, from `vc_dispmanx_display_open`.
    DisplayHandle
}

native_handle! {
    /// An off-screen pixel resource, from `vc_dispmanx_resource_create`.
    ResourceHandle
}

native_handle! {
    /// A composited surface element, from `vc_dispmanx_element_add`.
    ElementHandle
}

native_handle! {
    /// An in-flight update transaction, from `vc_dispmanx_update_start`.
    UpdateHandle
}
