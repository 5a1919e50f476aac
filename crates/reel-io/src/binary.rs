//! Shared binary header conventions.
//!
//! Professional image headers store "field not set" as a reserved sentinel
//! bit pattern distinct from zero: all-1-bits for unsigned integers, the
//! sign bit alone for 32-bit signed integers, and an infinity bit pattern
//! for floats. Text fields are fixed-width byte arrays that are not
//! necessarily NUL-terminated.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, LittleEndian, NativeEndian, ReadBytesExt, WriteBytesExt};

use crate::{IoError, IoResult};

/// Undefined sentinel for `u8` fields.
pub const UNDEF_U8: u8 = 0xFF;
/// Undefined sentinel for `u16` fields.
pub const UNDEF_U16: u16 = 0xFFFF;
/// Undefined sentinel for `u32` fields.
pub const UNDEF_U32: u32 = 0xFFFF_FFFF;
/// Undefined sentinel for `i32` fields (sign bit only).
pub const UNDEF_I32: i32 = i32::MIN;
/// Undefined sentinel bit pattern for `f32` fields (positive infinity).
pub const UNDEF_F32_BITS: u32 = 0x7F80_0000;

/// Undefined sentinel for `f32` fields.
pub fn undef_f32() -> f32 {
    f32::from_bits(UNDEF_F32_BITS)
}

/// Returns true if a `u8` field is set.
#[inline]
pub fn is_valid_u8(v: u8) -> bool {
    v != UNDEF_U8
}

/// Returns true if a `u16` field is set.
#[inline]
pub fn is_valid_u16(v: u16) -> bool {
    v != UNDEF_U16
}

/// Returns true if a `u32` field is set.
#[inline]
pub fn is_valid_u32(v: u32) -> bool {
    v != UNDEF_U32
}

/// Returns true if an `i32` field is set.
#[inline]
pub fn is_valid_i32(v: i32) -> bool {
    v != UNDEF_I32
}

/// Returns true if an `f32` field is set. The sentinel bit pattern and any
/// non-finite value count as unset.
#[inline]
pub fn is_valid_f32(v: f32) -> bool {
    v.to_bits() != UNDEF_F32_BITS && v.is_finite()
}

/// Returns true if a fixed-width text field holds displayable content:
/// a non-empty run of printable ASCII before the first NUL.
pub fn is_valid_text(buf: &[u8]) -> bool {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    end > 0 && buf[..end].iter().all(|&b| (32..=126).contains(&b))
}

/// Extracts a string from a fixed-width header text field.
///
/// Stops at the first NUL or at the end of the buffer, whichever comes
/// first; non-ASCII bytes are dropped.
pub fn string_from_bytes(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    buf[..end]
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect()
}

/// Copies a string into a fixed-width header text field.
///
/// Truncates if the input is longer than the buffer; never fails. When
/// `terminate` is set, the last written byte is a NUL (some legacy fields
/// must not be terminated to match third-party readers). Remaining bytes
/// are zero-filled.
pub fn string_to_bytes(s: &str, buf: &mut [u8], terminate: bool) {
    buf.fill(0);
    if buf.is_empty() {
        return;
    }
    let max = if terminate { buf.len() - 1 } else { buf.len() };
    let bytes = s.as_bytes();
    let len = bytes.len().min(max);
    buf[..len].copy_from_slice(&bytes[..len]);
}

/// Byte order of a header on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

impl Endian {
    /// Returns the byte order of the running process.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// Returns the opposite byte order.
    pub fn opposite(self) -> Self {
        match self {
            Endian::Big => Endian::Little,
            Endian::Little => Endian::Big,
        }
    }
}

impl Default for Endian {
    fn default() -> Self {
        Endian::native()
    }
}

/// Swaps an `f32` field's bytes in place.
#[inline]
pub fn swap_f32(v: &mut f32) {
    *v = f32::from_bits(v.to_bits().swap_bytes());
}

/// One pass over a fixed-layout header's fields in on-disk order.
///
/// A header enumerates its fields exactly once, in a `fields` walk; the
/// same walk serves decoding, encoding, and endian conversion depending on
/// the pass handed to it. Multi-byte fields go through the typed methods,
/// text and reserved regions through [`FieldPass::bytes`].
pub(crate) enum FieldPass<'a> {
    /// Fill each field from the buffer, native byte order.
    Decode(Cursor<&'a [u8]>),
    /// Write each field into the buffer, native byte order.
    Encode(Cursor<&'a mut [u8]>),
    /// Swap each multi-byte field in place; never touches a stream.
    Swap,
}

impl FieldPass<'_> {
    pub fn u8(&mut self, v: &mut u8) -> io::Result<()> {
        match self {
            FieldPass::Decode(c) => *v = c.read_u8()?,
            FieldPass::Encode(c) => c.write_u8(*v)?,
            FieldPass::Swap => {}
        }
        Ok(())
    }

    pub fn u16(&mut self, v: &mut u16) -> io::Result<()> {
        match self {
            FieldPass::Decode(c) => *v = c.read_u16::<NativeEndian>()?,
            FieldPass::Encode(c) => c.write_u16::<NativeEndian>(*v)?,
            FieldPass::Swap => *v = v.swap_bytes(),
        }
        Ok(())
    }

    pub fn u32(&mut self, v: &mut u32) -> io::Result<()> {
        match self {
            FieldPass::Decode(c) => *v = c.read_u32::<NativeEndian>()?,
            FieldPass::Encode(c) => c.write_u32::<NativeEndian>(*v)?,
            FieldPass::Swap => *v = v.swap_bytes(),
        }
        Ok(())
    }

    pub fn i16(&mut self, v: &mut i16) -> io::Result<()> {
        match self {
            FieldPass::Decode(c) => *v = c.read_i16::<NativeEndian>()?,
            FieldPass::Encode(c) => c.write_i16::<NativeEndian>(*v)?,
            FieldPass::Swap => *v = v.swap_bytes(),
        }
        Ok(())
    }

    pub fn i32(&mut self, v: &mut i32) -> io::Result<()> {
        match self {
            FieldPass::Decode(c) => *v = c.read_i32::<NativeEndian>()?,
            FieldPass::Encode(c) => c.write_i32::<NativeEndian>(*v)?,
            FieldPass::Swap => *v = v.swap_bytes(),
        }
        Ok(())
    }

    pub fn f32(&mut self, v: &mut f32) -> io::Result<()> {
        match self {
            FieldPass::Decode(c) => *v = c.read_f32::<NativeEndian>()?,
            FieldPass::Encode(c) => c.write_f32::<NativeEndian>(*v)?,
            FieldPass::Swap => swap_f32(v),
        }
        Ok(())
    }

    pub fn bytes(&mut self, v: &mut [u8]) -> io::Result<()> {
        match self {
            FieldPass::Decode(c) => c.read_exact(v)?,
            FieldPass::Encode(c) => c.write_all(v)?,
            FieldPass::Swap => {}
        }
        Ok(())
    }

    pub fn u16s(&mut self, v: &mut [u16]) -> io::Result<()> {
        v.iter_mut().try_for_each(|x| self.u16(x))
    }

    pub fn i16s(&mut self, v: &mut [i16]) -> io::Result<()> {
        v.iter_mut().try_for_each(|x| self.i16(x))
    }

    pub fn u32s(&mut self, v: &mut [u32]) -> io::Result<()> {
        v.iter_mut().try_for_each(|x| self.u32(x))
    }

    pub fn i32s(&mut self, v: &mut [i32]) -> io::Result<()> {
        v.iter_mut().try_for_each(|x| self.i32(x))
    }

    pub fn f32s(&mut self, v: &mut [f32]) -> io::Result<()> {
        v.iter_mut().try_for_each(|x| self.f32(x))
    }
}

/// Patches a header's 32-bit total-file-size field once the payload has
/// been written, then restores the stream position to the end.
///
/// The field cannot represent streams of 4 GiB or more; those fail with
/// [`IoError::Format`] rather than storing a wrapped size.
pub(crate) fn patch_size<W: Write + Seek>(
    writer: &mut W,
    offset: u64,
    endian: Endian,
) -> IoResult<()> {
    let size = writer.seek(SeekFrom::End(0))?;
    let size = u32::try_from(size).map_err(|_| {
        IoError::Format(format!("file size {} exceeds the 32-bit size field", size))
    })?;
    writer.seek(SeekFrom::Start(offset))?;
    match endian {
        Endian::Big => writer.write_u32::<BigEndian>(size)?,
        Endian::Little => writer.write_u32::<LittleEndian>(size)?,
    }
    writer.seek(SeekFrom::End(0))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert!(!is_valid_u8(UNDEF_U8));
        assert!(!is_valid_u16(UNDEF_U16));
        assert!(!is_valid_u32(UNDEF_U32));
        assert!(!is_valid_i32(UNDEF_I32));
        assert!(!is_valid_f32(undef_f32()));

        assert!(is_valid_u32(0));
        assert!(is_valid_i32(0));
        assert!(is_valid_f32(0.0));
        assert!(!is_valid_f32(f32::NAN));
    }

    #[test]
    fn test_string_round_trip() {
        let mut buf = [0u8; 8];
        string_to_bytes("abc", &mut buf, false);
        assert_eq!(&buf, b"abc\0\0\0\0\0");
        assert_eq!(string_from_bytes(&buf), "abc");
    }

    #[test]
    fn test_string_truncation() {
        let mut buf = [0u8; 4];
        string_to_bytes("abcdefgh", &mut buf, false);
        assert_eq!(&buf, b"abcd");

        string_to_bytes("abcdefgh", &mut buf, true);
        assert_eq!(&buf, b"abc\0");
    }

    #[test]
    fn test_unterminated_read() {
        // Full-width field with no NUL still reads cleanly.
        assert_eq!(string_from_bytes(b"12:34:56"), "12:34:56");
    }

    #[test]
    fn test_valid_text() {
        assert!(is_valid_text(b"creator\0\0"));
        assert!(!is_valid_text(b"\0\0\0"));
        assert!(!is_valid_text(b"\x01bad\0"));
    }

    #[test]
    fn test_swap_f32() {
        let mut v = 1.5f32;
        swap_f32(&mut v);
        swap_f32(&mut v);
        assert_eq!(v, 1.5);
    }
}
