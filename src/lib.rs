//! Rust binding to the Raspberry Pi VideoCore "DispmanX" compositing API.
//!
//! DispmanX is the firmware-side compositor behind the Pi's legacy graphics
//! stack: you open a display, allocate an off-screen pixel resource, bind it
//! into the composition stack as a layered element, and push pixels at it.
//! This crate wraps that call sequence behind a safe session type:
//!
//! ```ignore
//! use dispmanx::DispmanX;
//!
//! let mut session = DispmanX::new()?;
//! session.buffer_mut()?.fill(0xFF);
//! session.update()?;
//! ```
//!
//! Everything is synchronous and blocking; [`DispmanX::update`] returns once
//! the compositor has applied the frame. Native failures are irrecoverable
//! ([`DispmanxError::is_recoverable`]): when one surfaces, destroy the
//! session and/or exit — nothing here retries.
//!
//! The crate builds on any host. The real driver and the convenience entry
//! points (`DispmanX::new`, `list_displays`) exist only where `build.rs`
//! found `libbcm_host`; elsewhere, sessions can still be driven through any
//! [`driver::DispmanxDriver`] implementation, which is how the test suite
//! runs.

pub mod display;
pub mod driver;
pub mod drivers;
pub mod error;
pub mod ffi;
pub mod format;
pub mod handle;
pub mod session;
pub mod update;

pub use display::{Display, Size};
#[cfg(have_bcm_host)]
pub use display::{get_default_display, list_displays};
pub use display::{get_default_display_with, list_displays_with};
pub use error::{DispmanxError, Result};
pub use format::{BufferKind, PixelBuffer, PixelFormat};
pub use session::{DispmanX, DisplaySelector, Options};
