//! Targa (TGA) header support.
//!
//! An 18-byte little-endian header, optionally followed by a free-form id
//! field, then the pixel payload. Truevision defined no magic number, so
//! Targa files are recognized by extension alone; the header is validated
//! by its image-type and pixel-depth codes instead. Color data is stored
//! blue-first. The simplest format in this family and the reference case
//! for the shared codec contract.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::trace;

use crate::binary::Endian;
use crate::info::{Info, Mirror, PixelLayout, PixelType};
use crate::profile::ColorProfile;
use crate::{IoError, IoResult};

/// Fixed header size in bytes.
pub const HEADER_BYTES: usize = 18;

/// Descriptor bit: columns run right to left.
const DESC_RIGHT_TO_LEFT: u8 = 0x10;
/// Descriptor bit: rows run top to bottom.
const DESC_TOP_TO_BOTTOM: u8 = 0x20;

/// Image type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    /// Color-mapped, raw.
    ColorMapped,
    /// True-color, raw.
    TrueColor,
    /// Grayscale, raw.
    Gray,
    /// Color-mapped, RLE.
    ColorMappedRle,
    /// True-color, RLE.
    TrueColorRle,
    /// Grayscale, RLE.
    GrayRle,
}

impl ImageType {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ImageType::ColorMapped),
            2 => Some(ImageType::TrueColor),
            3 => Some(ImageType::Gray),
            9 => Some(ImageType::ColorMappedRle),
            10 => Some(ImageType::TrueColorRle),
            11 => Some(ImageType::GrayRle),
            _ => None,
        }
    }

    /// Returns true for the RLE-compressed variants.
    pub fn is_rle(self) -> bool {
        matches!(
            self,
            ImageType::ColorMappedRle | ImageType::TrueColorRle | ImageType::GrayRle
        )
    }
}

/// The 18-byte Targa header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Id field length in bytes.
    pub id_size: u8,
    /// Colormap presence flag.
    pub colormap_type: u8,
    /// Image type code.
    pub image_type: u8,
    /// First colormap entry.
    pub colormap_start: u16,
    /// Colormap entry count.
    pub colormap_size: u16,
    /// Bits per colormap entry.
    pub colormap_bits: u8,
    /// X origin.
    pub x: u16,
    /// Y origin.
    pub y: u16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Bits per pixel.
    pub pixel_bits: u8,
    /// Orientation and alpha descriptor bits.
    pub descriptor: u8,
    /// Id field content, `id_size` bytes read after the fixed header.
    pub id: Vec<u8>,
}

impl Header {
    /// Creates a zeroed header. Targa reserves no sentinel patterns; zero
    /// is the unset state throughout.
    pub fn undefined() -> Self {
        Self {
            id_size: 0,
            colormap_type: 0,
            image_type: 0,
            colormap_start: 0,
            colormap_size: 0,
            colormap_bits: 0,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            pixel_bits: 0,
            descriptor: 0,
            id: Vec::new(),
        }
    }

    /// Swaps every multi-byte field in place. Its own inverse.
    pub fn convert_endian(&mut self) {
        self.colormap_start = self.colormap_start.swap_bytes();
        self.colormap_size = self.colormap_size.swap_bytes();
        self.x = self.x.swap_bytes();
        self.y = self.y.swap_bytes();
        self.width = self.width.swap_bytes();
        self.height = self.height.swap_bytes();
    }

    fn decode(buf: &[u8]) -> IoResult<Self> {
        let mut c = Cursor::new(buf);
        let mut h = Header::undefined();
        h.id_size = c.read_u8()?;
        h.colormap_type = c.read_u8()?;
        h.image_type = c.read_u8()?;
        h.colormap_start = c.read_u16::<LittleEndian>()?;
        h.colormap_size = c.read_u16::<LittleEndian>()?;
        h.colormap_bits = c.read_u8()?;
        h.x = c.read_u16::<LittleEndian>()?;
        h.y = c.read_u16::<LittleEndian>()?;
        h.width = c.read_u16::<LittleEndian>()?;
        h.height = c.read_u16::<LittleEndian>()?;
        h.pixel_bits = c.read_u8()?;
        h.descriptor = c.read_u8()?;
        Ok(h)
    }

    fn encode(&self) -> IoResult<Vec<u8>> {
        let mut buf = vec![0u8; HEADER_BYTES];
        let mut c = Cursor::new(&mut buf[..]);
        c.write_u8(self.id_size)?;
        c.write_u8(self.colormap_type)?;
        c.write_u8(self.image_type)?;
        c.write_u16::<LittleEndian>(self.colormap_start)?;
        c.write_u16::<LittleEndian>(self.colormap_size)?;
        c.write_u8(self.colormap_bits)?;
        c.write_u16::<LittleEndian>(self.x)?;
        c.write_u16::<LittleEndian>(self.y)?;
        c.write_u16::<LittleEndian>(self.width)?;
        c.write_u16::<LittleEndian>(self.height)?;
        c.write_u8(self.pixel_bits)?;
        c.write_u8(self.descriptor)?;
        Ok(buf)
    }
}

/// Reads and decodes a Targa header, including the trailing id field, so
/// the stream ends up positioned at the pixel data.
pub fn read<R: Read>(reader: &mut R) -> IoResult<(Header, Info, ColorProfile)> {
    let mut buf = [0u8; HEADER_BYTES];
    reader.read_exact(&mut buf)?;
    let mut header = Header::decode(&buf)?;

    let image_type = ImageType::from_code(header.image_type).ok_or_else(|| {
        IoError::Format(format!("unrecognized Targa image type: {}", header.image_type))
    })?;
    trace!(?image_type, "targa header");
    if matches!(image_type, ImageType::ColorMapped | ImageType::ColorMappedRle)
        || header.colormap_type != 0
    {
        return Err(IoError::Unsupported("color-mapped image".into()));
    }

    let channels = match header.pixel_bits {
        8 => 1u8,
        24 => 3,
        32 => 4,
        b => {
            return Err(IoError::Unsupported(format!("{} bits per pixel", b)));
        }
    };

    if header.id_size > 0 {
        let mut id = vec![0u8; header.id_size as usize];
        reader.read_exact(&mut id)?;
        header.id = id;
    }

    let mut layout = PixelLayout::new(channels, PixelType::U8);
    layout.endian = Endian::Little;
    layout.bgr = channels >= 3;
    let mut info = Info::new(header.width as u32, header.height as u32, layout);
    info.mirror = Mirror {
        x: header.descriptor & DESC_RIGHT_TO_LEFT != 0,
        y: header.descriptor & DESC_TOP_TO_BOTTOM == 0,
    };

    Ok((header, info, ColorProfile::Raw))
}

/// Encodes and writes a Targa header for `info`. Raw (uncompressed)
/// variants only.
pub fn write<W: Write>(writer: &mut W, info: &Info) -> IoResult<Header> {
    if info.layout.pixel_type != PixelType::U8 {
        return Err(IoError::Unsupported(format!(
            "{:?} pixels",
            info.layout.pixel_type
        )));
    }
    let (image_type, pixel_bits) = match info.layout.channels {
        1 => (3u8, 8u8),
        3 => (2, 24),
        4 => (2, 32),
        c => {
            return Err(IoError::Unsupported(format!("{} channels", c)));
        }
    };
    // Width and height are 16-bit fields.
    if info.width > u16::MAX as u32 || info.height > u16::MAX as u32 {
        return Err(IoError::Unsupported(format!(
            "{}x{} exceeds 16-bit dimensions",
            info.width, info.height
        )));
    }

    let mut header = Header::undefined();
    header.image_type = image_type;
    header.width = info.width as u16;
    header.height = info.height as u16;
    header.pixel_bits = pixel_bits;
    if info.mirror.x {
        header.descriptor |= DESC_RIGHT_TO_LEFT;
    }
    if !info.mirror.y {
        header.descriptor |= DESC_TOP_TO_BOTTOM;
    }
    if info.layout.channels == 4 {
        // Alpha channel depth bits.
        header.descriptor |= 8;
    }

    writer.write_all(&header.encode()?)?;
    Ok(header)
}

/// The Targa header carries no fields that depend on the payload; nothing
/// to patch.
pub fn write_finish<W: Write>(_writer: &mut W) -> IoResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> Info {
        let mut layout = PixelLayout::new(3, PixelType::U8);
        layout.endian = Endian::Little;
        layout.bgr = true;
        Info::new(320, 240, layout)
    }

    #[test]
    fn test_convert_endian_involution() {
        let mut header = Header::undefined();
        header.width = 320;
        header.height = 240;
        let original = header.clone();
        header.convert_endian();
        header.convert_endian();
        assert_eq!(header, original);
    }

    #[test]
    fn test_round_trip() {
        let info = sample_info();
        let mut buf = Vec::new();
        write(&mut buf, &info).unwrap();
        assert_eq!(buf.len(), HEADER_BYTES);

        let (header, loaded, _) = read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(loaded, info);
        assert!(!ImageType::from_code(header.image_type).unwrap().is_rle());
    }

    #[test]
    fn test_gray_round_trip() {
        let mut layout = PixelLayout::new(1, PixelType::U8);
        layout.endian = Endian::Little;
        let info = Info::new(64, 64, layout);
        let mut buf = Vec::new();
        write(&mut buf, &info).unwrap();
        let (_, loaded, _) = read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(loaded, info);
        assert!(!loaded.layout.bgr);
    }

    #[test]
    fn test_id_field_consumed() {
        let info = sample_info();
        let mut buf = Vec::new();
        let mut header = write(&mut buf, &info).unwrap();
        header.id_size = 4;
        buf.clear();
        buf.extend_from_slice(&header.encode().unwrap());
        buf.extend_from_slice(b"test");
        buf.extend_from_slice(&[1, 2, 3]); // payload

        let mut cursor = Cursor::new(&buf);
        let (loaded, _, _) = read(&mut cursor).unwrap();
        assert_eq!(loaded.id, b"test");
        assert_eq!(cursor.position() as usize, HEADER_BYTES + 4);
    }

    #[test]
    fn test_rle_type_recognized() {
        let info = sample_info();
        let mut buf = Vec::new();
        write(&mut buf, &info).unwrap();
        buf[2] = 10; // true-color RLE
        let (header, _, _) = read(&mut Cursor::new(&buf)).unwrap();
        assert!(ImageType::from_code(header.image_type).unwrap().is_rle());
    }

    #[test]
    fn test_oversize_dimensions_rejected() {
        let mut info = sample_info();
        info.height = (u16::MAX as u32) + 1;
        assert!(matches!(
            write(&mut Vec::new(), &info),
            Err(IoError::Unsupported(_))
        ));
    }

    #[test]
    fn test_truncated_header() {
        let mut buf = Vec::new();
        write(&mut buf, &sample_info()).unwrap();
        buf.truncate(HEADER_BYTES - 1);
        assert!(matches!(
            read(&mut Cursor::new(&buf)),
            Err(IoError::Io(_))
        ));
    }

    #[test]
    fn test_bad_image_type() {
        let mut buf = Vec::new();
        write(&mut buf, &sample_info()).unwrap();
        buf[2] = 7;
        assert!(matches!(
            read(&mut Cursor::new(&buf)),
            Err(IoError::Format(_))
        ));
    }
}
