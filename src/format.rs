//! Pixel formats and the caller-visible pixel buffer.
//!
//! The format table is fixed: each format carries its byte width and the
//! native `VC_IMAGE_TYPE_T` code, dispatched by `match` rather than any
//! runtime lookup. The two 16-bit formats pack a whole pixel into one `u16`,
//! which is where the word-buffer representation comes from.

use crate::display::Size;
use crate::error::{DispmanxError, Result};
use crate::ffi;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported pixel formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PixelFormat {
    /// 24-bit red, green, blue.
    Rgb,
    /// 32-bit alpha, red, green, blue.
    Argb,
    /// 32-bit red, green, blue, alpha.
    #[default]
    Rgba,
    /// 32-bit red, green, blue and an unused byte.
    Rgbx,
    /// 32-bit unused byte, red, green, blue.
    Xrgb,
    /// 16-bit red, green, blue, alpha at 4 bits per channel.
    Rgba16,
    /// 16-bit 5-6-5 packed red, green, blue.
    Rgb565,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Argb | PixelFormat::Rgba | PixelFormat::Rgbx | PixelFormat::Xrgb => 4,
            PixelFormat::Rgba16 | PixelFormat::Rgb565 => 2,
        }
    }

    /// The native `VC_IMAGE_TYPE_T` code.
    pub fn image_type(self) -> u32 {
        match self {
            PixelFormat::Rgb => ffi::VC_IMAGE_RGB888,
            PixelFormat::Argb => ffi::VC_IMAGE_ARGB8888,
            PixelFormat::Rgba => ffi::VC_IMAGE_RGBA32,
            PixelFormat::Rgbx => ffi::VC_IMAGE_RGBX8888,
            PixelFormat::Xrgb => ffi::VC_IMAGE_XRGB8888,
            PixelFormat::Rgba16 => ffi::VC_IMAGE_RGBA16,
            PixelFormat::Rgb565 => ffi::VC_IMAGE_RGB565,
        }
    }

    /// True for the formats whose pixels fit a single `u16`.
    pub fn is_word_packed(self) -> bool {
        self.bytes_per_pixel() == 2
    }

    fn name(self) -> &'static str {
        match self {
            PixelFormat::Rgb => "RGB",
            PixelFormat::Argb => "ARGB",
            PixelFormat::Rgba => "RGBA",
            PixelFormat::Rgbx => "RGBX",
            PixelFormat::Xrgb => "XRGB",
            PixelFormat::Rgba16 => "RGBA16",
            PixelFormat::Rgb565 => "RGB565",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = DispmanxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "RGB" => Ok(PixelFormat::Rgb),
            "ARGB" => Ok(PixelFormat::Argb),
            "RGBA" => Ok(PixelFormat::Rgba),
            "RGBX" => Ok(PixelFormat::Rgbx),
            "XRGB" => Ok(PixelFormat::Xrgb),
            "RGBA16" => Ok(PixelFormat::Rgba16),
            "RGB565" => Ok(PixelFormat::Rgb565),
            _ => Err(DispmanxError::UnknownPixelFormat(s.to_string())),
        }
    }
}

/// How the session's pixel memory is represented.
///
/// `Words` exposes the buffer as `u16`s, one pixel per word; it only exists
/// for the word-packed formats. `Auto` picks `Words` for those formats and
/// `Bytes` for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferKind {
    #[default]
    Auto,
    Bytes,
    Words,
}

impl BufferKind {
    /// Resolves `Auto` against the format and rejects `Words` where no word
    /// representation exists. Never returns `Auto`.
    pub fn resolve(self, format: PixelFormat) -> Result<BufferKind> {
        match self {
            BufferKind::Auto if format.is_word_packed() => Ok(BufferKind::Words),
            BufferKind::Auto => Ok(BufferKind::Bytes),
            BufferKind::Bytes => Ok(BufferKind::Bytes),
            BufferKind::Words if format.is_word_packed() => Ok(BufferKind::Words),
            BufferKind::Words => Err(DispmanxError::WordBufferUnavailable(format)),
        }
    }
}

impl FromStr for BufferKind {
    type Err = DispmanxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BufferKind::Auto),
            "bytes" => Ok(BufferKind::Bytes),
            "words" => Ok(BufferKind::Words),
            _ => Err(DispmanxError::UnknownBufferKind(s.to_string())),
        }
    }
}

/// The caller-mutable pixel memory backing a session.
///
/// Sized exactly `width * height * bytes_per_pixel` at creation and never
/// resized. The session flushes the whole buffer on [`update`]; writes into
/// it are plain memory writes with no native calls involved.
///
/// [`update`]: crate::DispmanX::update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelBuffer {
    Bytes(Vec<u8>),
    Words(Vec<u16>),
}

impl PixelBuffer {
    /// Allocates a zeroed buffer for the display geometry and format.
    pub(crate) fn allocate(kind: BufferKind, format: PixelFormat, size: Size) -> Result<Self> {
        let pixels = size.width as usize * size.height as usize;
        match kind.resolve(format)? {
            BufferKind::Words => Ok(PixelBuffer::Words(vec![0u16; pixels])),
            // Bytes; Auto cannot survive resolve().
            _ => Ok(PixelBuffer::Bytes(vec![0u8; pixels * format.bytes_per_pixel()])),
        }
    }

    /// Buffer length in bytes.
    pub fn len_bytes(&self) -> usize {
        match self {
            PixelBuffer::Bytes(bytes) => bytes.len(),
            PixelBuffer::Words(words) => words.len() * 2,
        }
    }

    /// The raw bytes, regardless of representation.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PixelBuffer::Bytes(bytes) => bytes,
            PixelBuffer::Words(words) => {
                // One u16 is two bytes; alignment only loosens.
                unsafe {
                    std::slice::from_raw_parts(words.as_ptr() as *const u8, words.len() * 2)
                }
            }
        }
    }

    /// Mutable raw bytes, regardless of representation.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            PixelBuffer::Bytes(bytes) => bytes,
            PixelBuffer::Words(words) => unsafe {
                std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut u8, words.len() * 2)
            },
        }
    }

    /// The word view, if this is a word buffer.
    pub fn as_words(&self) -> Option<&[u16]> {
        match self {
            PixelBuffer::Bytes(_) => None,
            PixelBuffer::Words(words) => Some(words),
        }
    }

    /// Mutable word view, if this is a word buffer.
    pub fn as_words_mut(&mut self) -> Option<&mut [u16]> {
        match self {
            PixelBuffer::Bytes(_) => None,
            PixelBuffer::Words(words) => Some(words),
        }
    }

    /// Sets every byte of the buffer to `value`.
    pub fn fill(&mut self, value: u8) {
        match self {
            PixelBuffer::Bytes(bytes) => bytes.fill(value),
            PixelBuffer::Words(words) => words.fill(u16::from_ne_bytes([value, value])),
        }
    }
}
