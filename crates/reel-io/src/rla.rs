//! Wavefront RLA/RPF header support.
//!
//! A 740-byte big-endian header (per Murray & vanRyper's "Encyclopedia of
//! Graphics File Formats") followed by a scanline offset table with one
//! 32-bit entry per image row, then RLE-compressed scanline data. The
//! image window is carried as left/right/bottom/top bounds rather than a
//! width/height pair; most metadata lives in fixed-width ASCII fields.
//!
//! This codec is read-only. Writing RLA is not implemented; [`write`] and
//! [`write_finish`] report [`IoError::Unsupported`].

use std::io::{self, Cursor, Read, Write};

use tracing::trace;

use crate::binary::{is_valid_text, string_from_bytes};
use crate::binary::{Endian, FieldPass};
use crate::info::{
    Info, Mirror, PixelLayout, PixelType, TAG_CREATOR, TAG_DESCRIPTION, TAG_SOURCE, TAG_TIME,
};
use crate::profile::ColorProfile;
use crate::{IoError, IoResult};

/// Fixed header size in bytes.
pub const HEADER_BYTES: usize = 740;

/// The fixed 740-byte RLA header plus the scanline offset table.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Full image window: left, right, bottom, top.
    pub window: [i16; 4],
    /// Active image window: left, right, bottom, top.
    pub active_window: [i16; 4],
    /// Frame number.
    pub frame: i16,
    /// Color channel storage type: 0 = integer, 3 = float.
    pub color_channel_type: i16,
    /// Color channel count.
    pub color_channels: i16,
    /// Matte channel count.
    pub matte_channels: i16,
    /// Auxiliary channel count.
    pub aux_channels: i16,
    /// Format revision; -1 for RLA, 1 for RPF.
    pub revision: i16,
    /// Gamma as ASCII text.
    pub gamma: [u8; 16],
    /// Red primary chromaticity text.
    pub red_chroma: [u8; 24],
    /// Green primary chromaticity text.
    pub green_chroma: [u8; 24],
    /// Blue primary chromaticity text.
    pub blue_chroma: [u8; 24],
    /// White point chromaticity text.
    pub white_point: [u8; 24],
    /// Job number.
    pub job: i32,
    /// Original file name.
    pub file_name: [u8; 128],
    /// Description text.
    pub description: [u8; 128],
    /// Creating program.
    pub program: [u8; 64],
    /// Machine name.
    pub machine: [u8; 32],
    /// User name.
    pub user: [u8; 32],
    /// Creation date text.
    pub date: [u8; 20],
    /// Aspect format name.
    pub aspect: [u8; 24],
    /// Aspect ratio text.
    pub aspect_ratio: [u8; 8],
    /// Colorspace description.
    pub chan: [u8; 32],
    /// Field-rendered flag.
    pub field: i16,
    /// Render time text.
    pub time: [u8; 12],
    /// Filter name.
    pub filter: [u8; 32],
    /// Bits per color channel.
    pub color_bits: i16,
    /// Matte channel storage type.
    pub matte_type: i16,
    /// Bits per matte channel.
    pub matte_bits: i16,
    /// Auxiliary channel storage type.
    pub aux_type: i16,
    /// Bits per auxiliary channel.
    pub aux_bits: i16,
    /// Auxiliary data description.
    pub aux: [u8; 32],
    /// Reserved.
    pub space: [u8; 36],
    /// Offset of the next image in the file, 0 for the last.
    pub next: i32,
    /// Scanline offsets, one per row, read after the fixed header.
    pub scanline_offsets: Vec<i32>,
}

impl Header {
    /// Creates a zeroed header.
    pub fn undefined() -> Self {
        Self {
            window: [0; 4],
            active_window: [0; 4],
            frame: 0,
            color_channel_type: 0,
            color_channels: 0,
            matte_channels: 0,
            aux_channels: 0,
            revision: 0,
            gamma: [0; 16],
            red_chroma: [0; 24],
            green_chroma: [0; 24],
            blue_chroma: [0; 24],
            white_point: [0; 24],
            job: 0,
            file_name: [0; 128],
            description: [0; 128],
            program: [0; 64],
            machine: [0; 32],
            user: [0; 32],
            date: [0; 20],
            aspect: [0; 24],
            aspect_ratio: [0; 8],
            chan: [0; 32],
            field: 0,
            time: [0; 12],
            filter: [0; 32],
            color_bits: 0,
            matte_type: 0,
            matte_bits: 0,
            aux_type: 0,
            aux_bits: 0,
            aux: [0; 32],
            space: [0; 36],
            next: 0,
            scanline_offsets: Vec::new(),
        }
    }

    /// Every fixed-header field once, in on-disk order.
    fn fields(&mut self, p: &mut FieldPass<'_>) -> io::Result<()> {
        p.i16s(&mut self.window)?;
        p.i16s(&mut self.active_window)?;
        p.i16(&mut self.frame)?;
        p.i16(&mut self.color_channel_type)?;
        p.i16(&mut self.color_channels)?;
        p.i16(&mut self.matte_channels)?;
        p.i16(&mut self.aux_channels)?;
        p.i16(&mut self.revision)?;
        p.bytes(&mut self.gamma)?;
        p.bytes(&mut self.red_chroma)?;
        p.bytes(&mut self.green_chroma)?;
        p.bytes(&mut self.blue_chroma)?;
        p.bytes(&mut self.white_point)?;
        p.i32(&mut self.job)?;
        p.bytes(&mut self.file_name)?;
        p.bytes(&mut self.description)?;
        p.bytes(&mut self.program)?;
        p.bytes(&mut self.machine)?;
        p.bytes(&mut self.user)?;
        p.bytes(&mut self.date)?;
        p.bytes(&mut self.aspect)?;
        p.bytes(&mut self.aspect_ratio)?;
        p.bytes(&mut self.chan)?;
        p.i16(&mut self.field)?;
        p.bytes(&mut self.time)?;
        p.bytes(&mut self.filter)?;
        p.i16(&mut self.color_bits)?;
        p.i16(&mut self.matte_type)?;
        p.i16(&mut self.matte_bits)?;
        p.i16(&mut self.aux_type)?;
        p.i16(&mut self.aux_bits)?;
        p.bytes(&mut self.aux)?;
        p.bytes(&mut self.space)?;
        p.i32(&mut self.next)
    }

    /// Swaps every multi-byte field in place, scanline table included. Its
    /// own inverse.
    pub fn convert_endian(&mut self) {
        // The swap pass touches no stream and cannot fail.
        let _ = self.fields(&mut FieldPass::Swap);
        for v in &mut self.scanline_offsets {
            *v = v.swap_bytes();
        }
    }

    fn decode(buf: &[u8]) -> IoResult<Self> {
        let mut h = Header::undefined();
        h.fields(&mut FieldPass::Decode(Cursor::new(buf)))?;
        Ok(h)
    }
}

/// Reads and decodes an RLA header and its scanline offset table.
///
/// RLA carries no magic; callers select this codec by extension. The
/// header is validated through its window bounds and channel counts.
pub fn read<R: Read>(reader: &mut R) -> IoResult<(Header, Info, ColorProfile)> {
    let mut buf = [0u8; HEADER_BYTES];
    reader.read_exact(&mut buf)?;
    let mut header = Header::decode(&buf)?;
    // The file is always big-endian.
    if Endian::native() != Endian::Big {
        header.convert_endian();
    }

    let width = i32::from(header.window[1]) - i32::from(header.window[0]) + 1;
    let height = i32::from(header.window[3]) - i32::from(header.window[2]) + 1;
    if width <= 0 || height <= 0 {
        return Err(IoError::Format(format!(
            "invalid image window: {:?}",
            header.window
        )));
    }
    trace!(width, height, revision = header.revision, "rla header");

    if header.aux_channels > 0 {
        return Err(IoError::Unsupported(format!(
            "{} auxiliary channels",
            header.aux_channels
        )));
    }
    let channels = header.color_channels + header.matte_channels;
    if !(1..=4).contains(&channels) {
        return Err(IoError::Format(format!("{} channels", channels)));
    }
    if header.matte_channels > 0 && header.matte_type != header.color_channel_type {
        return Err(IoError::Unsupported("mixed channel storage types".into()));
    }
    let pixel_type = match (header.color_channel_type, header.color_bits) {
        (0, 8) => PixelType::U8,
        (0, 16) => PixelType::U16,
        (3, 32) => PixelType::F32,
        (t, b) => {
            return Err(IoError::Unsupported(format!("channel type {} at {} bits", t, b)));
        }
    };

    let mut offsets = vec![0u8; height as usize * 4];
    reader.read_exact(&mut offsets)?;
    header.scanline_offsets = offsets
        .chunks_exact(4)
        .map(|b| i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    let mut layout = PixelLayout::new(channels as u8, pixel_type);
    layout.endian = Endian::Big;
    let mut info = Info::new(width as u32, height as u32, layout);
    // Scanlines run bottom to top.
    info.mirror = Mirror { x: false, y: true };

    if is_valid_text(&header.program) {
        info.tags.set(TAG_CREATOR, string_from_bytes(&header.program));
    }
    if is_valid_text(&header.date) {
        info.tags.set(TAG_TIME, string_from_bytes(&header.date));
    }
    if is_valid_text(&header.file_name) {
        info.tags.set(TAG_SOURCE, string_from_bytes(&header.file_name));
    }
    if is_valid_text(&header.description) {
        info.tags
            .set(TAG_DESCRIPTION, string_from_bytes(&header.description));
    }

    Ok((header, info, ColorProfile::Raw))
}

/// RLA output is not implemented; this codec is read-only.
pub fn write<W: Write>(_writer: &mut W, _info: &Info) -> IoResult<()> {
    Err(IoError::Unsupported("RLA write".into()))
}

/// RLA output is not implemented; this codec is read-only.
pub fn write_finish<W: Write>(_writer: &mut W) -> IoResult<()> {
    Err(IoError::Unsupported("RLA write".into()))
}
