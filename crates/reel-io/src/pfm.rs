//! PFM (Portable FloatMap) header support.
//!
//! The layout outlier in this family: an ASCII token header instead of
//! fixed byte offsets. Three whitespace-delimited tokens — a magic token
//! (`PF` for RGB, `Pf` for grayscale), the width and height, and a scale
//! factor — precede a raw 32-bit float payload. The scale's sign selects
//! the payload byte order: negative is little-endian, positive big-endian.
//! Scanlines run bottom to top.

use std::io::{Read, Write};

use tracing::trace;

use crate::binary::Endian;
use crate::info::{Info, Mirror, PixelLayout, PixelType};
use crate::profile::ColorProfile;
use crate::{IoError, IoResult};

/// Longest accepted header token.
const MAX_TOKEN: usize = 32;

/// The decoded PFM header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// True for `PF` (RGB), false for `Pf` (grayscale).
    pub color: bool,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Scale factor; the sign selects the payload byte order.
    pub scale: f32,
}

impl Header {
    /// Creates a header with zero dimensions and unit scale.
    pub fn undefined() -> Self {
        Self {
            color: false,
            width: 0,
            height: 0,
            scale: 1.0,
        }
    }
}

/// Reads one whitespace-delimited ASCII token, consuming the delimiter.
fn read_token<R: Read>(reader: &mut R) -> IoResult<String> {
    let mut byte = [0u8; 1];
    // Skip leading whitespace.
    loop {
        reader.read_exact(&mut byte)?;
        if !byte[0].is_ascii_whitespace() {
            break;
        }
    }
    let mut token = String::new();
    loop {
        token.push(byte[0] as char);
        if token.len() > MAX_TOKEN {
            return Err(IoError::Parse("header token too long".into()));
        }
        match reader.read_exact(&mut byte) {
            Ok(()) => {
                if byte[0].is_ascii_whitespace() {
                    return Ok(token);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Reads and decodes a PFM header, leaving the stream positioned at the
/// float payload.
pub fn read<R: Read>(reader: &mut R) -> IoResult<(Header, Info, ColorProfile)> {
    let magic = read_token(reader)?;
    let color = match magic.as_str() {
        "PF" => true,
        "Pf" => false,
        other => {
            return Err(IoError::Format(format!(
                "unrecognized PFM magic: {:?}",
                other
            )));
        }
    };

    let width: u32 = read_token(reader)?
        .parse()
        .map_err(|_| IoError::Parse("invalid width".into()))?;
    let height: u32 = read_token(reader)?
        .parse()
        .map_err(|_| IoError::Parse("invalid height".into()))?;
    let scale: f32 = read_token(reader)?
        .parse()
        .map_err(|_| IoError::Parse("invalid scale".into()))?;
    if scale == 0.0 || !scale.is_finite() {
        return Err(IoError::Parse(format!("invalid scale: {}", scale)));
    }
    trace!(width, height, scale, "pfm header");

    let header = Header {
        color,
        width,
        height,
        scale,
    };
    let mut layout = PixelLayout::new(if color { 3 } else { 1 }, PixelType::F32);
    layout.endian = if scale < 0.0 {
        Endian::Little
    } else {
        Endian::Big
    };
    let mut info = Info::new(width, height, layout);
    info.mirror = Mirror { x: false, y: true };

    Ok((header, info, ColorProfile::Raw))
}

/// Encodes and writes a PFM header for `info`.
///
/// The scale factor is written as positive or negative one according to
/// the layout's byte order.
pub fn write<W: Write>(writer: &mut W, info: &Info) -> IoResult<Header> {
    if info.layout.pixel_type != PixelType::F32 {
        return Err(IoError::Unsupported(format!(
            "{:?} pixels",
            info.layout.pixel_type
        )));
    }
    let color = match info.layout.channels {
        1 => false,
        3 => true,
        c => {
            return Err(IoError::Unsupported(format!("{} channels", c)));
        }
    };
    let scale = match info.layout.endian {
        Endian::Little => -1.0,
        Endian::Big => 1.0,
    };

    let header = Header {
        color,
        width: info.width,
        height: info.height,
        scale,
    };
    write!(
        writer,
        "{}\n{} {}\n{}\n",
        if color { "PF" } else { "Pf" },
        info.width,
        info.height,
        scale
    )
    .map_err(IoError::Io)?;
    Ok(header)
}

/// The PFM header carries no fields that depend on the payload; nothing to
/// patch.
pub fn write_finish<W: Write>(_writer: &mut W) -> IoResult<()> {
    Ok(())
}
