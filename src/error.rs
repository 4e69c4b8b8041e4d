//! Error types for the binding.

use crate::format::PixelFormat;
use std::fmt;

/// Everything that can go wrong when driving the compositor.
///
/// Errors come in two tiers. Configuration errors are caller mistakes caught
/// before (or instead of) touching native state; fix the arguments and try
/// again. Runtime errors are sentinel or status failures reported by the
/// native library itself — once one of those surfaces the compositor state
/// is suspect and the sane responses are tearing down or exiting. Nothing in
/// this crate retries a failed native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispmanxError {
    // --- configuration (recoverable) ---
    /// Pixel format name not in the supported set.
    UnknownPixelFormat(String),
    /// Buffer kind name not one of `auto`, `bytes`, `words`.
    UnknownBufferKind(String),
    /// A 16-bit word buffer was requested for a byte-oriented format.
    WordBufferUnavailable(PixelFormat),
    /// No attached display has the requested device id.
    NoSuchDisplay(u32),
    /// The session was destroyed; no further operations are possible.
    AlreadyDestroyed,

    // --- native runtime (irrecoverable) ---
    /// `vc_tv_get_attached_devices` reported failure.
    AttachedDevicesQuery,
    /// `graphics_get_display_size` reported failure for this device.
    DisplaySizeQuery(u32),
    /// The attached-device catalog is empty.
    NoDisplays,
    /// `vc_dispmanx_display_open` returned no handle for this device.
    DisplayOpen(u32),
    /// `vc_dispmanx_resource_create` returned no handle.
    ResourceCreate,
    /// `vc_dispmanx_element_add` returned no handle.
    ElementAdd,
    /// `vc_dispmanx_update_start` returned no handle.
    UpdateStart,
    /// `vc_dispmanx_update_submit_sync` reported failure.
    UpdateSubmit,
    /// `vc_dispmanx_resource_write_data` reported failure.
    WriteData,
    /// `vc_dispmanx_element_remove` reported failure during teardown.
    ElementRemove,
    /// `vc_dispmanx_resource_delete` reported failure during teardown.
    ResourceDelete,
}

impl DispmanxError {
    /// True for caller mistakes that left no native resources behind.
    ///
    /// Runtime errors (the `false` arm) mean the native layer itself failed;
    /// callers should destroy the session and/or exit rather than retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DispmanxError::UnknownPixelFormat(_)
                | DispmanxError::UnknownBufferKind(_)
                | DispmanxError::WordBufferUnavailable(_)
                | DispmanxError::NoSuchDisplay(_)
                | DispmanxError::AlreadyDestroyed
        )
    }
}

impl fmt::Display for DispmanxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispmanxError::UnknownPixelFormat(name) => {
                write!(f, "invalid pixel format: {}", name)
            }
            DispmanxError::UnknownBufferKind(name) => {
                write!(f, "invalid buffer kind: {}", name)
            }
            DispmanxError::WordBufferUnavailable(format) => {
                write!(f, "word buffer requested, but {} is byte-oriented", format)
            }
            DispmanxError::NoSuchDisplay(id) => {
                write!(f, "no display with device ID #{} found", id)
            }
            DispmanxError::AlreadyDestroyed => {
                write!(f, "session has already been destroyed")
            }
            DispmanxError::AttachedDevicesQuery => {
                write!(f, "error getting attached devices")
            }
            DispmanxError::DisplaySizeQuery(id) => {
                write!(f, "error getting display #{} size", id)
            }
            DispmanxError::NoDisplays => write!(f, "no displays found"),
            DispmanxError::DisplayOpen(id) => {
                write!(f, "error opening device ID #{}", id)
            }
            DispmanxError::ResourceCreate => write!(f, "error creating image resource"),
            DispmanxError::ElementAdd => write!(f, "couldn't create surface element"),
            DispmanxError::UpdateStart => write!(f, "couldn't get update handle"),
            DispmanxError::UpdateSubmit => write!(f, "error submitting update"),
            DispmanxError::WriteData => {
                write!(f, "error writing buffer to video memory")
            }
            DispmanxError::ElementRemove => write!(f, "couldn't remove surface element"),
            DispmanxError::ResourceDelete => write!(f, "error deleting image resource"),
        }
    }
}

impl std::error::Error for DispmanxError {}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, DispmanxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_recoverable() {
        assert!(DispmanxError::UnknownPixelFormat("BGRA".into()).is_recoverable());
        assert!(DispmanxError::NoSuchDisplay(7).is_recoverable());
        assert!(DispmanxError::AlreadyDestroyed.is_recoverable());
    }

    #[test]
    fn native_errors_are_not() {
        assert!(!DispmanxError::DisplayOpen(0).is_recoverable());
        assert!(!DispmanxError::UpdateSubmit.is_recoverable());
        assert!(!DispmanxError::ResourceDelete.is_recoverable());
    }

    #[test]
    fn display_names_the_device() {
        let message = DispmanxError::NoSuchDisplay(3).to_string();
        assert!(message.contains("#3"), "got: {}", message);
    }
}
