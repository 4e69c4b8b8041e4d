//! The session core: one open display, one resource, one composited element.
//!
//! A [`DispmanX`] owns its three native handles end to end. Construction
//! acquires them in order (display, resource, element) and rolls back on
//! failure; [`DispmanX::update`] flushes the pixel buffer and re-presents;
//! [`DispmanX::destroy`] releases element then resource, in that order,
//! exactly once. After `destroy`, every operation fails fast — a destroyed
//! session never touches native state again.

use crate::display::{get_default_display_with, list_displays_with, Display, Size};
use crate::driver::DispmanxDriver;
use crate::error::{DispmanxError, Result};
use crate::ffi;
use crate::ffi::{VcAlpha, VcRect};
use crate::format::{BufferKind, PixelBuffer, PixelFormat};
use crate::handle::{DisplayHandle, ElementHandle, ResourceHandle};
use crate::update::Update;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

/// Which display a session binds to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplaySelector {
    /// The first display the compositor reports.
    #[default]
    Default,
    /// A specific device id; must match an attached display.
    Id(u32),
    /// An already-resolved display, used as-is.
    Display(Display),
}

impl From<u32> for DisplaySelector {
    fn from(device_id: u32) -> Self {
        DisplaySelector::Id(device_id)
    }
}

impl From<Display> for DisplaySelector {
    fn from(display: Display) -> Self {
        DisplaySelector::Display(display)
    }
}

/// Session configuration.
///
/// All fields default: layer 0, the default display, RGBA pixels, and the
/// automatic buffer representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Compositing order; lower layers draw behind higher ones. Passed
    /// through unvalidated — the Raspberry Pi OS console sits at -127,
    /// omxplayer at 0.
    pub layer: i32,
    pub display: DisplaySelector,
    pub pixel_format: PixelFormat,
    pub buffer_kind: BufferKind,
}

/// A live binding to one physical display.
///
/// The caller writes pixels into [`buffer_mut`](Self::buffer_mut) and calls
/// [`update`](Self::update) to push them to the screen. Dropping the session
/// destroys it; [`destroy`](Self::destroy) does the same eagerly and
/// surfaces teardown errors instead of logging them.
#[derive(Debug)]
pub struct DispmanX<D: DispmanxDriver> {
    driver: D,
    display: Display,
    layer: i32,
    pixel_format: PixelFormat,
    display_handle: DisplayHandle,
    resource_handle: ResourceHandle,
    element_handle: ElementHandle,
    dest_rect: VcRect,
    buffer: PixelBuffer,
    destroyed: bool,
}

#[cfg(have_bcm_host)]
impl DispmanX<crate::drivers::VideoCoreDriver> {
    /// Opens a session on the default display with default options.
    pub fn new() -> Result<Self> {
        Self::with_options(Options::default())
    }

    /// Opens a session on the VideoCore compositor with the given options.
    pub fn with_options(options: Options) -> Result<Self> {
        Self::with_driver(crate::drivers::VideoCoreDriver, options)
    }
}

impl<D: DispmanxDriver> DispmanX<D> {
    /// Opens a session through an explicit driver.
    ///
    /// Construction is all-or-nothing: any failure tears down whatever was
    /// already acquired before the error surfaces, so a failed constructor
    /// leaves no native resources behind.
    pub fn with_driver(driver: D, options: Options) -> Result<Self> {
        let Options {
            layer,
            display: selector,
            pixel_format,
            buffer_kind,
        } = options;

        // Caller mistakes surface before any native call.
        let buffer_kind = buffer_kind.resolve(pixel_format)?;

        driver.init_host();

        let display = match selector {
            DisplaySelector::Default => get_default_display_with(&driver)?,
            DisplaySelector::Id(device_id) => list_displays_with(&driver)?
                .into_iter()
                .find(|d| d.device_id == device_id)
                .ok_or(DispmanxError::NoSuchDisplay(device_id))?,
            DisplaySelector::Display(display) => display,
        };
        debug!(
            "Using device ID #{} with resolution {}",
            display.device_id, display.size
        );

        let display_handle = DisplayHandle::from_raw(driver.display_open(display.device_id))
            .ok_or(DispmanxError::DisplayOpen(display.device_id))?;
        debug!("Got display handle: {}", display_handle.get());

        let buffer = PixelBuffer::allocate(buffer_kind, pixel_format, display.size)?;
        debug!("Allocated buffer of size {} bytes", buffer.len_bytes());

        let resource_handle = ResourceHandle::from_raw(driver.resource_create(
            pixel_format.image_type(),
            display.size.width,
            display.size.height,
        ))
        .ok_or(DispmanxError::ResourceCreate)?;
        debug!("Created video resource handle: {}", resource_handle.get());

        let dest_rect = VcRect {
            x: 0,
            y: 0,
            width: display.size.width as i32,
            height: display.size.height as i32,
        };
        // Source rectangle in the native 16.16 fixed-point convention; the
        // destination stays in integer pixels.
        let src_rect = VcRect {
            x: 0,
            y: 0,
            width: (display.size.width << 16) as i32,
            height: (display.size.height << 16) as i32,
        };
        let alpha = VcAlpha {
            flags: ffi::DISPMANX_FLAGS_ALPHA_FROM_SOURCE,
            opacity: 255,
            mask: 0,
        };

        let added = Update::scope(&driver, |update| {
            ElementHandle::from_raw(driver.element_add(
                update.handle(),
                display_handle.get(),
                layer,
                &dest_rect,
                resource_handle.get(),
                &src_rect,
                ffi::DISPMANX_PROTECTION_NONE,
                &alpha,
                ffi::DISPMANX_NO_ROTATE,
            ))
            .ok_or(DispmanxError::ElementAdd)
        });
        let element_handle = match added {
            Ok(handle) => handle,
            Err(err) => {
                // Roll back so the failed construction leaves nothing
                // allocated.
                if driver.resource_delete(resource_handle.get()) != 0 {
                    warn!(
                        "Rollback of video resource {} failed",
                        resource_handle.get()
                    );
                }
                return Err(err);
            }
        };
        debug!("Got surface element handle: {}", element_handle.get());

        Ok(Self {
            driver,
            display,
            layer,
            pixel_format,
            display_handle,
            resource_handle,
            element_handle,
            dest_rect,
            buffer,
            destroyed: false,
        })
    }

    fn ensure_live(&self) -> Result<()> {
        if self.destroyed {
            Err(DispmanxError::AlreadyDestroyed)
        } else {
            Ok(())
        }
    }

    /// The display this session is bound to.
    pub fn display(&self) -> Result<&Display> {
        self.ensure_live()?;
        Ok(&self.display)
    }

    /// The display's resolution.
    pub fn size(&self) -> Result<Size> {
        self.ensure_live()?;
        Ok(self.display.size)
    }

    /// The display's width in pixels.
    pub fn width(&self) -> Result<u32> {
        self.ensure_live()?;
        Ok(self.display.size.width)
    }

    /// The display's height in pixels.
    pub fn height(&self) -> Result<u32> {
        self.ensure_live()?;
        Ok(self.display.size.height)
    }

    /// The session's pixel format.
    pub fn pixel_format(&self) -> Result<PixelFormat> {
        self.ensure_live()?;
        Ok(self.pixel_format)
    }

    /// The session's compositing layer.
    pub fn layer(&self) -> Result<i32> {
        self.ensure_live()?;
        Ok(self.layer)
    }

    /// The pixel buffer.
    pub fn buffer(&self) -> Result<&PixelBuffer> {
        self.ensure_live()?;
        Ok(&self.buffer)
    }

    /// The pixel buffer, for writing.
    pub fn buffer_mut(&mut self) -> Result<&mut PixelBuffer> {
        self.ensure_live()?;
        Ok(&mut self.buffer)
    }

    /// Pushes the buffer's current contents to the screen.
    ///
    /// Writes the whole buffer into the video resource, then submits an
    /// empty transaction so the compositor re-presents it. Blocks until the
    /// compositor acknowledges.
    pub fn update(&mut self) -> Result<()> {
        self.ensure_live()?;
        let pitch = self.display.size.width as i32 * self.pixel_format.bytes_per_pixel() as i32;
        let status = self.driver.resource_write_data(
            self.resource_handle.get(),
            self.pixel_format.image_type(),
            pitch,
            self.buffer.as_bytes(),
            &self.dest_rect,
        );
        if status != 0 {
            return Err(DispmanxError::WriteData);
        }
        Update::scope(&self.driver, |_| Ok(()))
    }

    /// Releases the native element and resource, in that order.
    ///
    /// Idempotent: the second and later calls are no-ops. The session is
    /// marked destroyed before teardown begins, so even when a teardown
    /// call fails no handle is ever released twice; a failure here means
    /// native state is in an unknown condition with no defined recovery.
    pub fn destroy(&mut self) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;

        Update::scope(&self.driver, |update| {
            if self
                .driver
                .element_remove(update.handle(), self.element_handle.get())
                != 0
            {
                return Err(DispmanxError::ElementRemove);
            }
            Ok(())
        })?;

        if self.driver.resource_delete(self.resource_handle.get()) != 0 {
            return Err(DispmanxError::ResourceDelete);
        }
        debug!("Destroyed session on device ID #{}", self.display.device_id);
        Ok(())
    }
}

impl<D: DispmanxDriver> Drop for DispmanX<D> {
    fn drop(&mut self) {
        if let Err(err) = self.destroy() {
            error!("Error destroying session during drop: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mock::{Call, Fault, MockDriver};

    fn session(driver: &MockDriver) -> DispmanX<&MockDriver> {
        DispmanX::with_driver(driver, Options::default()).unwrap()
    }

    #[test]
    fn construction_resolves_the_default_display() {
        let driver = MockDriver::new()
            .with_device(3, 720, 480)
            .with_device(0, 1920, 1080);
        let session = session(&driver);
        assert_eq!(session.display().unwrap().device_id, 3);
        assert_eq!(session.width().unwrap(), 720);
        assert_eq!(session.height().unwrap(), 480);
    }

    #[test]
    fn construction_by_id_matches_the_catalog() {
        let driver = MockDriver::new()
            .with_device(0, 1920, 1080)
            .with_device(7, 1280, 720);
        let options = Options {
            display: DisplaySelector::Id(7),
            ..Options::default()
        };
        let session = DispmanX::with_driver(&driver, options).unwrap();
        assert_eq!(session.display().unwrap().name, "HDMI 1");
        assert_eq!(session.size().unwrap().width, 1280);
    }

    #[test]
    fn unknown_display_id_fails_before_any_open() {
        let driver = MockDriver::new().with_device(0, 64, 64);
        let options = Options {
            display: DisplaySelector::Id(9),
            ..Options::default()
        };
        let err = DispmanX::with_driver(&driver, options).unwrap_err();
        assert_eq!(err, DispmanxError::NoSuchDisplay(9));
        assert!(err.is_recoverable());
        assert_eq!(
            driver.count_calls(|c| matches!(c, Call::DisplayOpen { .. })),
            0
        );
    }

    #[test]
    fn word_buffer_mismatch_fails_with_no_native_calls() {
        let driver = MockDriver::new().with_device(0, 64, 64);
        let options = Options {
            pixel_format: PixelFormat::Rgba,
            buffer_kind: BufferKind::Words,
            ..Options::default()
        };
        let err = DispmanX::with_driver(&driver, options).unwrap_err();
        assert_eq!(err, DispmanxError::WordBufferUnavailable(PixelFormat::Rgba));
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn source_rect_uses_sixteen_sixteen_fixed_point() {
        let driver = MockDriver::new().with_device(0, 640, 480);
        let _session = session(&driver);
        let (src_rect, dest_rect) = driver
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::ElementAdd {
                    src_rect,
                    dest_rect,
                    ..
                } => Some((src_rect, dest_rect)),
                _ => None,
            })
            .expect("element_add was called");
        assert_eq!(src_rect.width, 640 << 16);
        assert_eq!(src_rect.height, 480 << 16);
        assert_eq!(dest_rect.width, 640);
        assert_eq!(dest_rect.height, 480);
    }

    #[test]
    fn element_binding_carries_layer_and_alpha() {
        let driver = MockDriver::new().with_device(0, 32, 32);
        let options = Options {
            layer: -127,
            ..Options::default()
        };
        let _session = DispmanX::with_driver(&driver, options).unwrap();
        let calls = driver.calls();
        match calls
            .iter()
            .find(|c| matches!(c, Call::ElementAdd { .. }))
            .unwrap()
        {
            Call::ElementAdd {
                layer,
                alpha,
                protection,
                transform,
                ..
            } => {
                assert_eq!(*layer, -127);
                assert_eq!(alpha.flags, ffi::DISPMANX_FLAGS_ALPHA_FROM_SOURCE);
                assert_eq!(alpha.opacity, 255);
                assert_eq!(alpha.mask, 0);
                assert_eq!(*protection, ffi::DISPMANX_PROTECTION_NONE);
                assert_eq!(*transform, ffi::DISPMANX_NO_ROTATE);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn element_add_failure_rolls_back_and_still_submits() {
        let driver = MockDriver::new().with_device(0, 64, 64);
        driver.inject(Fault::ElementAdd);
        let err = DispmanX::with_driver(&driver, Options::default()).unwrap_err();
        assert_eq!(err, DispmanxError::ElementAdd);
        // The transaction is closed, not abandoned, and the resource is
        // rolled back.
        assert_eq!(
            driver.count_calls(|c| matches!(c, Call::UpdateSubmitSync { .. })),
            1
        );
        assert_eq!(
            driver.count_calls(|c| matches!(c, Call::ResourceDelete { .. })),
            1
        );
    }

    #[test]
    fn resource_create_failure_is_fatal() {
        let driver = MockDriver::new().with_device(0, 64, 64);
        driver.inject(Fault::ResourceCreate);
        let err = DispmanX::with_driver(&driver, Options::default()).unwrap_err();
        assert_eq!(err, DispmanxError::ResourceCreate);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn display_open_failure_is_fatal() {
        let driver = MockDriver::new().with_device(4, 64, 64);
        driver.inject(Fault::DisplayOpen);
        let err = DispmanX::with_driver(&driver, Options::default()).unwrap_err();
        assert_eq!(err, DispmanxError::DisplayOpen(4));
    }

    #[test]
    fn update_writes_with_the_format_pitch() {
        let driver = MockDriver::new().with_device(0, 10, 4);
        let options = Options {
            pixel_format: PixelFormat::Rgb,
            ..Options::default()
        };
        let mut session = DispmanX::with_driver(&driver, options).unwrap();
        session.update().unwrap();
        let (pitch, data_len) = driver
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::ResourceWriteData {
                    pitch, data_len, ..
                } => Some((pitch, data_len)),
                _ => None,
            })
            .unwrap();
        assert_eq!(pitch, 30); // 10 px * 3 bytes
        assert_eq!(data_len, 120); // 10 * 4 * 3 bytes
    }

    #[test]
    fn failed_write_opens_no_transaction() {
        let driver = MockDriver::new().with_device(0, 8, 8);
        let mut session = session(&driver);
        let starts_before = driver.count_calls(|c| matches!(c, Call::UpdateStart { .. }));
        driver.inject(Fault::WriteData);
        assert_eq!(session.update().unwrap_err(), DispmanxError::WriteData);
        let starts_after = driver.count_calls(|c| matches!(c, Call::UpdateStart { .. }));
        assert_eq!(starts_before, starts_after);
    }
}
