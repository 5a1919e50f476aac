//! SGI image header support.
//!
//! The format described in Haeberli's "The SGI Image File Format": a
//! 512-byte big-endian header followed either by verbatim scanlines or by
//! RLE-compressed scanlines addressed through offset/length tables. The
//! tables hold `height * channels` 32-bit offsets then as many lengths,
//! and are read as a second, height-dependent pass after the fixed header.
//!
//! Writing emits verbatim storage only; RLE encoding is not implemented.

use std::io::{self, Cursor, Read, Write};

use tracing::trace;

use crate::binary::{Endian, FieldPass};
use crate::info::{Info, Mirror, PixelLayout, PixelType};
use crate::profile::ColorProfile;
use crate::{IoError, IoResult};

/// Header magic.
pub const MAGIC: u16 = 474;
/// Fixed header size in bytes.
pub const HEADER_BYTES: usize = 512;

/// Storage code for verbatim scanlines.
pub const STORAGE_VERBATIM: u8 = 0;
/// Storage code for RLE-compressed scanlines.
pub const STORAGE_RLE: u8 = 1;

/// The fixed 512-byte SGI header, plus the RLE scanline tables when the
/// storage mode calls for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Magic number, always 474.
    pub magic: u16,
    /// Storage mode, verbatim or RLE.
    pub storage: u8,
    /// Bytes per channel component, 1 or 2.
    pub bytes_per_channel: u8,
    /// Dimension count: 1 = one scanline, 2 = one channel, 3 = multi-channel.
    pub dimension: u16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Channel count.
    pub channels: u16,
    /// Minimum pixel value.
    pub pixel_min: u32,
    /// Maximum pixel value.
    pub pixel_max: u32,
    /// Image name.
    pub name: [u8; 80],
    /// Colormap id, 0 = normal.
    pub colormap: u32,
    /// RLE scanline offsets, one per scanline per channel; empty for
    /// verbatim storage.
    pub rle_offsets: Vec<u32>,
    /// RLE scanline byte lengths, parallel to `rle_offsets`.
    pub rle_lengths: Vec<u32>,
}

impl Header {
    /// Creates a header with zeroed fields and the fixed magic.
    pub fn undefined() -> Self {
        Self {
            magic: MAGIC,
            storage: STORAGE_VERBATIM,
            bytes_per_channel: 0,
            dimension: 0,
            width: 0,
            height: 0,
            channels: 0,
            pixel_min: 0,
            pixel_max: 0,
            name: [0; 80],
            colormap: 0,
            rle_offsets: Vec::new(),
            rle_lengths: Vec::new(),
        }
    }

    /// Every fixed-header field once, in on-disk order.
    fn fields(&mut self, p: &mut FieldPass<'_>) -> io::Result<()> {
        p.u16(&mut self.magic)?;
        p.u8(&mut self.storage)?;
        p.u8(&mut self.bytes_per_channel)?;
        p.u16(&mut self.dimension)?;
        p.u16(&mut self.width)?;
        p.u16(&mut self.height)?;
        p.u16(&mut self.channels)?;
        p.u32(&mut self.pixel_min)?;
        p.u32(&mut self.pixel_max)?;
        let mut reserved = [0u8; 4];
        p.bytes(&mut reserved)?;
        p.bytes(&mut self.name)?;
        p.u32(&mut self.colormap)
    }

    /// Swaps every multi-byte field in place, tables included. Its own
    /// inverse.
    pub fn convert_endian(&mut self) {
        // The swap pass touches no stream and cannot fail.
        let _ = self.fields(&mut FieldPass::Swap);
        for v in self.rle_offsets.iter_mut().chain(self.rle_lengths.iter_mut()) {
            *v = v.swap_bytes();
        }
    }

    fn decode(buf: &[u8]) -> IoResult<Self> {
        let mut h = Header::undefined();
        h.fields(&mut FieldPass::Decode(Cursor::new(buf)))?;
        Ok(h)
    }

    fn encode(&self) -> IoResult<Vec<u8>> {
        let mut buf = vec![0u8; HEADER_BYTES];
        self.clone()
            .fields(&mut FieldPass::Encode(Cursor::new(&mut buf[..])))?;
        Ok(buf)
    }
}

/// Reads and decodes an SGI header.
///
/// RLE files get their scanline offset and length tables read as a second
/// pass; the stream is left positioned at the pixel data either way.
pub fn read<R: Read>(reader: &mut R) -> IoResult<(Header, Info, ColorProfile)> {
    let mut buf = [0u8; HEADER_BYTES];
    reader.read_exact(&mut buf)?;
    let mut header = Header::decode(&buf)?;

    // The file is always big-endian; a swapped magic means the process is
    // the little-endian side.
    if header.magic != MAGIC {
        header.convert_endian();
        if header.magic != MAGIC {
            return Err(IoError::Format(format!(
                "unrecognized SGI magic: 0x{:04X}",
                u16::from_be_bytes([buf[0], buf[1]])
            )));
        }
    }
    trace!(storage = header.storage, "sgi header");

    if header.colormap != 0 {
        return Err(IoError::Unsupported(format!(
            "colormap {}",
            header.colormap
        )));
    }
    let pixel_type = match header.bytes_per_channel {
        1 => PixelType::U8,
        2 => PixelType::U16,
        b => {
            return Err(IoError::Format(format!("{} bytes per channel", b)));
        }
    };
    let channels = match header.dimension {
        1 | 2 => 1u8,
        3 => {
            if header.channels == 0 || header.channels > 4 {
                return Err(IoError::Unsupported(format!(
                    "{} channels",
                    header.channels
                )));
            }
            header.channels as u8
        }
        d => {
            return Err(IoError::Format(format!("dimension {}", d)));
        }
    };

    match header.storage {
        STORAGE_VERBATIM => {}
        STORAGE_RLE => {
            let entries = header.height as usize * channels as usize;
            header.rle_offsets = read_table(reader, entries)?;
            header.rle_lengths = read_table(reader, entries)?;
        }
        s => {
            return Err(IoError::Unsupported(format!("storage {}", s)));
        }
    }

    let mut layout = PixelLayout::new(channels, pixel_type);
    layout.endian = Endian::Big;
    let mut info = Info::new(header.width as u32, header.height as u32, layout);
    // Scanlines are stored bottom to top.
    info.mirror = Mirror { x: false, y: true };

    Ok((header, info, ColorProfile::Raw))
}

fn read_table<R: Read>(reader: &mut R, entries: usize) -> IoResult<Vec<u32>> {
    let mut bytes = vec![0u8; entries * 4];
    reader.read_exact(&mut bytes)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Encodes and writes an SGI header for `info`.
///
/// Storage is always verbatim; requesting RLE output is not supported.
pub fn write<W: Write>(writer: &mut W, info: &Info) -> IoResult<Header> {
    let bytes_per_channel = match info.layout.pixel_type {
        PixelType::U8 => 1,
        PixelType::U16 => 2,
        t => {
            return Err(IoError::Unsupported(format!("{:?} pixels", t)));
        }
    };
    if info.layout.channels == 0 || info.layout.channels > 4 {
        return Err(IoError::Unsupported(format!(
            "{} channels",
            info.layout.channels
        )));
    }
    // Width and height are 16-bit fields.
    if info.width > u16::MAX as u32 || info.height > u16::MAX as u32 {
        return Err(IoError::Unsupported(format!(
            "{}x{} exceeds 16-bit dimensions",
            info.width, info.height
        )));
    }

    let mut header = Header::undefined();
    header.storage = STORAGE_VERBATIM;
    header.bytes_per_channel = bytes_per_channel;
    header.dimension = if info.layout.channels == 1 { 2 } else { 3 };
    header.width = info.width as u16;
    header.height = info.height as u16;
    header.channels = info.layout.channels as u16;
    header.pixel_min = 0;
    header.pixel_max = match info.layout.pixel_type {
        PixelType::U8 => 255,
        _ => 65535,
    };

    let mut on_disk = header.clone();
    if Endian::native() != Endian::Big {
        on_disk.convert_endian();
    }
    writer.write_all(&on_disk.encode()?)?;
    Ok(header)
}

/// The SGI header carries no fields that depend on the payload; nothing to
/// patch.
pub fn write_finish<W: Write>(_writer: &mut W) -> IoResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> Info {
        let mut layout = PixelLayout::new(3, PixelType::U8);
        layout.endian = Endian::Big;
        let mut info = Info::new(640, 480, layout);
        info.mirror = Mirror { x: false, y: true };
        info
    }

    #[test]
    fn test_convert_endian_involution() {
        let mut header = Header::undefined();
        header.width = 640;
        header.height = 480;
        header.rle_offsets = vec![512, 600];
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
        assert_eq!(&buf[0..2], &[0x01, 0xDA]);

        let (header, loaded, profile) = read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(loaded, info);
        assert_eq!(header.storage, STORAGE_VERBATIM);
        assert_eq!(profile, ColorProfile::Raw);
    }

    #[test]
    fn test_rle_tables() {
        let mut header = Header::undefined();
        header.storage = STORAGE_RLE;
        header.bytes_per_channel = 1;
        header.dimension = 3;
        header.width = 4;
        header.height = 2;
        header.channels = 1;
        let mut on_disk = header.clone();
        if Endian::native() != Endian::Big {
            on_disk.convert_endian();
        }
        let mut buf = on_disk.encode().unwrap();
        for v in [512u32, 520] {
            buf.extend_from_slice(&v.to_be_bytes());
        }
        for v in [8u32, 6] {
            buf.extend_from_slice(&v.to_be_bytes());
        }

        let (loaded, info, _) = read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(loaded.rle_offsets, vec![512, 520]);
        assert_eq!(loaded.rle_lengths, vec![8, 6]);
        assert_eq!(info.width, 4);
    }

    #[test]
    fn test_rle_table_truncated() {
        let mut header = Header::undefined();
        header.storage = STORAGE_RLE;
        header.bytes_per_channel = 1;
        header.dimension = 2;
        header.width = 4;
        header.height = 4;
        header.channels = 1;
        let mut on_disk = header.clone();
        if Endian::native() != Endian::Big {
            on_disk.convert_endian();
        }
        let mut buf = on_disk.encode().unwrap();
        buf.extend_from_slice(&[0u8; 7]); // less than one table

        assert!(matches!(
            read(&mut Cursor::new(&buf)),
            Err(IoError::Io(_))
        ));
    }

    #[test]
    fn test_oversize_dimensions_rejected() {
        // 70000 would wrap to 4464 in the 16-bit width field.
        let mut info = sample_info();
        info.width = 70_000;
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
    fn test_bad_magic() {
        let buf = vec![0xABu8; HEADER_BYTES];
        assert!(matches!(
            read(&mut Cursor::new(&buf)),
            Err(IoError::Format(_))
        ));
    }
}
