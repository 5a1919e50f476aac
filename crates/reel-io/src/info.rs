//! Image metadata: dimensions, pixel layout, orientation, and tags.

use std::collections::BTreeMap;
use std::fmt;

use crate::binary::Endian;

/// Pixel component type and bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelType {
    /// 8-bit unsigned integer.
    U8,
    /// 10-bit unsigned integer, packed three to a 32-bit word (filled
    /// method A). The film scan standard.
    #[default]
    U10,
    /// 12-bit unsigned integer, stored in a 16-bit word.
    U12,
    /// 16-bit unsigned integer.
    U16,
    /// 16-bit float (half).
    F16,
    /// 32-bit float.
    F32,
}

impl PixelType {
    /// Returns the nominal bits per component.
    pub fn bits(self) -> u8 {
        match self {
            PixelType::U8 => 8,
            PixelType::U10 => 10,
            PixelType::U12 => 12,
            PixelType::U16 => 16,
            PixelType::F16 => 16,
            PixelType::F32 => 32,
        }
    }
}

/// Pixel storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLayout {
    /// Number of channels (1 = luminance, 3 = RGB, 4 = RGBA).
    pub channels: u8,
    /// Component type.
    pub pixel_type: PixelType,
    /// Byte order of the pixel payload.
    pub endian: Endian,
    /// Channels stored blue-first (Targa).
    pub bgr: bool,
}

impl PixelLayout {
    /// Creates a layout with native byte order, RGB channel order.
    pub fn new(channels: u8, pixel_type: PixelType) -> Self {
        Self {
            channels,
            pixel_type,
            endian: Endian::native(),
            bgr: false,
        }
    }

    /// Returns the storage bytes for one pixel.
    ///
    /// 10-bit pixels pack three components into one 32-bit word; every
    /// other type stores each component in its own 1-, 2-, or 4-byte slot.
    pub fn bytes_per_pixel(&self) -> usize {
        match self.pixel_type {
            PixelType::U10 => 4 * (usize::from(self.channels) / 3).max(1),
            PixelType::U8 => usize::from(self.channels),
            PixelType::U12 | PixelType::U16 | PixelType::F16 => 2 * usize::from(self.channels),
            PixelType::F32 => 4 * usize::from(self.channels),
        }
    }
}

impl Default for PixelLayout {
    fn default() -> Self {
        Self::new(3, PixelType::default())
    }
}

/// Image flips applied on load, decoded from header orientation fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mirror {
    /// Mirrored left-to-right.
    pub x: bool,
    /// Mirrored top-to-bottom.
    pub y: bool,
}

/// Per-image metadata decoded from a header.
///
/// Byte-count quantities are pure functions of width, height, and layout;
/// they are computed on demand and never stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Info {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel storage layout.
    pub layout: PixelLayout,
    /// Orientation flips.
    pub mirror: Mirror,
    /// Key/value metadata.
    pub tags: Tags,
}

impl Info {
    /// Creates an `Info` with the given dimensions and layout.
    pub fn new(width: u32, height: u32, layout: PixelLayout) -> Self {
        Self {
            width,
            height,
            layout,
            mirror: Mirror::default(),
            tags: Tags::default(),
        }
    }

    /// Returns the byte count of one scanline.
    pub fn scanline_bytes(&self) -> usize {
        self.width as usize * self.layout.bytes_per_pixel()
    }

    /// Returns the byte count of the whole pixel payload.
    pub fn data_bytes(&self) -> usize {
        self.scanline_bytes() * self.height as usize
    }
}

/// Well-known tag key: creation time.
pub const TAG_TIME: &str = "Time";
/// Well-known tag key: creator software or operator.
pub const TAG_CREATOR: &str = "Creator";
/// Well-known tag key: project name.
pub const TAG_PROJECT: &str = "Project";
/// Well-known tag key: copyright statement.
pub const TAG_COPYRIGHT: &str = "Copyright";
/// Well-known tag key: film keycode.
pub const TAG_KEYCODE: &str = "Keycode";
/// Well-known tag key: SMPTE timecode.
pub const TAG_TIMECODE: &str = "Timecode";
/// Well-known tag key: free-form description.
pub const TAG_DESCRIPTION: &str = "Description";
/// Well-known tag key: source file or device.
pub const TAG_SOURCE: &str = "Source";

/// Ordered key/value string metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a tag. Empty values are dropped so "tag absent" and "tag set
    /// to nothing" stay the same state.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.0.remove(key);
        } else {
            self.0.insert(key.to_string(), value);
        }
    }

    /// Returns a tag value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns true if no tags are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelLayout::new(3, PixelType::U8).bytes_per_pixel(), 3);
        assert_eq!(PixelLayout::new(3, PixelType::U10).bytes_per_pixel(), 4);
        assert_eq!(PixelLayout::new(3, PixelType::U16).bytes_per_pixel(), 6);
        assert_eq!(PixelLayout::new(4, PixelType::F32).bytes_per_pixel(), 16);
        assert_eq!(PixelLayout::new(1, PixelType::U8).bytes_per_pixel(), 1);
    }

    #[test]
    fn test_derived_byte_counts() {
        let info = Info::new(1920, 1080, PixelLayout::new(3, PixelType::U10));
        assert_eq!(info.scanline_bytes(), 1920 * 4);
        assert_eq!(info.data_bytes(), 1920 * 4 * 1080);
    }

    #[test]
    fn test_tags() {
        let mut tags = Tags::new();
        tags.set(TAG_CREATOR, "scanner");
        tags.set(TAG_TIME, "2004:06:01 12:00:00");
        assert_eq!(tags.get(TAG_CREATOR), Some("scanner"));
        assert_eq!(tags.len(), 2);

        tags.set(TAG_CREATOR, "");
        assert_eq!(tags.get(TAG_CREATOR), None);
    }
}
