//! Display discovery.
//!
//! Displays are read-only catalog entries: a device id, a human-readable
//! label resolved from a fixed table, and the physical resolution. The
//! catalog order is whatever the compositor reports — it is not sorted.

use crate::driver::DispmanxDriver;
use crate::error::{DispmanxError, Result};
use crate::ffi::TV_MAX_ATTACHED_DISPLAYS;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Labels indexed by device number, per the vendor's tvservice table.
const DEVICE_NAMES: [&str; 9] = [
    "Main LCD",
    "Auxiliary LCD",
    "HDMI 0",
    "Composite",
    "Forced LCD",
    "Forced TV",
    "Forced Other",
    "HDMI 1",
    "Forced TV2",
];

const UNKNOWN_DEVICE_NAME: &str = "Unknown";

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One attached physical display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {
    /// Numeric device id, usable as a session's display selector.
    pub device_id: u32,
    /// Human-readable label, e.g. `"HDMI 0"` or `"Main LCD"`.
    pub name: String,
    /// Physical resolution.
    pub size: Size,
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({}) {}", self.device_id, self.name, self.size)
    }
}

/// The label for a device number; out-of-table numbers are "Unknown".
pub fn device_name(device_id: u8) -> &'static str {
    DEVICE_NAMES
        .get(usize::from(device_id))
        .copied()
        .unwrap_or(UNKNOWN_DEVICE_NAME)
}

/// Lists the attached displays, in native enumeration order.
pub fn list_displays_with<D: DispmanxDriver>(driver: &D) -> Result<Vec<Display>> {
    driver.init_host();

    let (status, devices) = driver.attached_devices();
    if status != 0 {
        return Err(DispmanxError::AttachedDevicesQuery);
    }

    let count = devices.num_attached.clamp(0, TV_MAX_ATTACHED_DISPLAYS as i32) as usize;
    let mut displays = Vec::with_capacity(count);
    for &device_id in &devices.display_number[..count] {
        let size = display_size_with(driver, u32::from(device_id))?;
        displays.push(Display {
            device_id: u32::from(device_id),
            name: device_name(device_id).to_string(),
            size,
        });
    }
    debug!("Enumerated {} attached display(s)", displays.len());
    Ok(displays)
}

/// The first display the compositor reports, used when no selector is given.
pub fn get_default_display_with<D: DispmanxDriver>(driver: &D) -> Result<Display> {
    let mut displays = list_displays_with(driver)?;
    if displays.is_empty() {
        return Err(DispmanxError::NoDisplays);
    }
    Ok(displays.swap_remove(0))
}

/// Queries a display's physical resolution.
pub fn display_size_with<D: DispmanxDriver>(driver: &D, device_id: u32) -> Result<Size> {
    driver.init_host();
    let (status, width, height) = driver.display_size(device_id as u16);
    if status < 0 {
        return Err(DispmanxError::DisplaySizeQuery(device_id));
    }
    Ok(Size { width, height })
}

/// Lists the attached displays via the VideoCore driver.
#[cfg(have_bcm_host)]
pub fn list_displays() -> Result<Vec<Display>> {
    list_displays_with(&crate::drivers::VideoCoreDriver)
}

/// The default display via the VideoCore driver.
#[cfg(have_bcm_host)]
pub fn get_default_display() -> Result<Display> {
    get_default_display_with(&crate::drivers::VideoCoreDriver)
}
