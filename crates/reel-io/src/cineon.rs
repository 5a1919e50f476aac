//! Cineon (Kodak film scan) header support.
//!
//! Cineon files carry a 2048-byte header in four fixed blocks: file (192
//! bytes), image (520), source (312), and film (1024). The magic value
//! doubles as an endian marker: a byte-swapped magic means every multi-byte
//! field must be swapped before interpretation. Pixels are 10-bit RGB
//! printing density, filled type A.
//!
//! Reading yields the raw [`Header`], a decoded [`Info`], and the
//! [`ColorProfile`] implied by the channel descriptors. Writing is a
//! two-pass affair: [`write`] emits the header with the file size left at
//! its undefined sentinel, and [`write_finish`] patches the size after the
//! pixel payload is on disk.

use std::io::{self, Cursor, Read, Seek, Write};

use tracing::trace;

use crate::binary::{
    self, Endian, FieldPass, UNDEF_U8, UNDEF_U32, is_valid_u8, is_valid_u32, is_valid_text,
    string_from_bytes, string_to_bytes, undef_f32,
};
use crate::info::{
    Info, Mirror, PixelLayout, PixelType, TAG_CREATOR, TAG_DESCRIPTION, TAG_KEYCODE,
    TAG_SOURCE, TAG_TIME,
};
use crate::profile::{ColorProfile, FilmPrint};
use crate::time::{keycode_from_string, keycode_to_string};
use crate::{IoError, IoResult};

/// Header magic, native and byte-swapped.
pub const MAGIC: [u32; 2] = [0x802A_5FD7, 0xD75F_2A80];
/// Total header size in bytes.
pub const HEADER_BYTES: usize = 2048;
/// Byte offset of the file size field, patched by [`write_finish`].
const SIZE_OFFSET: u64 = 20;

/// File information block (192 bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct FileBlock {
    /// Magic number; selects endianness.
    pub magic: u32,
    /// Byte offset to image data.
    pub image_offset: u32,
    /// Generic header section size.
    pub generic_size: u32,
    /// Industry header section size.
    pub industry_size: u32,
    /// User header section size.
    pub user_size: u32,
    /// Total file size, patched after the payload is written.
    pub size: u32,
    /// Version string, "V4.5".
    pub version: [u8; 8],
    /// Original file name.
    pub name: [u8; 100],
    /// Creation time.
    pub time: [u8; 24],
    /// Reserved.
    pub pad: [u8; 36],
}

/// Per-channel image description (28 bytes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    /// Descriptor pair; byte 1 selects the channel meaning (1-3 = RGB
    /// printing density, 4-6 = RGB linear).
    pub descriptor: [u8; 2],
    /// Bits per component.
    pub bit_depth: u8,
    /// Reserved.
    pub pad: u8,
    /// Width and height.
    pub size: [u32; 2],
    /// Lowest code value.
    pub low_data: f32,
    /// Quantity represented by the lowest code value.
    pub low_quantity: f32,
    /// Highest code value.
    pub high_data: f32,
    /// Quantity represented by the highest code value.
    pub high_quantity: f32,
}

/// Image information block (520 bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    /// Orientation code.
    pub orient: u8,
    /// Number of channels in use.
    pub channels: u8,
    /// Reserved.
    pub pad: [u8; 2],
    /// Channel descriptions; only the first `channels` are meaningful.
    pub channel: [Channel; 8],
    /// White point chromaticity.
    pub white: [f32; 2],
    /// Red primary chromaticity.
    pub red: [f32; 2],
    /// Green primary chromaticity.
    pub green: [f32; 2],
    /// Blue primary chromaticity.
    pub blue: [f32; 2],
    /// Label text.
    pub label: [u8; 200],
    /// Reserved.
    pub pad2: [u8; 28],
    /// Interleave code, 0 = pixel interleaved.
    pub interleave: u8,
    /// Packing code, 5 = filled type A in 32-bit words.
    pub packing: u8,
    /// Data sign, 0 = unsigned.
    pub data_sign: u8,
    /// Data sense, 0 = positive image.
    pub data_sense: u8,
    /// End-of-line padding bytes.
    pub line_padding: u32,
    /// End-of-channel padding bytes.
    pub channel_padding: u32,
    /// Reserved.
    pub pad3: [u8; 20],
}

/// Source information block (312 bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBlock {
    /// X/Y offset within the source image.
    pub offset: [i32; 2],
    /// Source file name.
    pub file: [u8; 100],
    /// Source creation time.
    pub time: [u8; 24],
    /// Input device name.
    pub input_device: [u8; 64],
    /// Input device model.
    pub input_model: [u8; 32],
    /// Input device serial number.
    pub input_serial: [u8; 32],
    /// Input device pitch, X/Y.
    pub input_pitch: [f32; 2],
    /// Input device gamma.
    pub gamma: f32,
    /// Reserved.
    pub pad: [u8; 40],
}

/// Film information block (1024 bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct FilmBlock {
    /// Keycode film manufacturer id.
    pub id: u8,
    /// Keycode film type.
    pub kind: u8,
    /// Keycode frame offset in perforations.
    pub offset: u8,
    /// Reserved.
    pub pad: u8,
    /// Keycode prefix.
    pub prefix: u32,
    /// Keycode count.
    pub count: u32,
    /// Film format name.
    pub format: [u8; 32],
    /// Frame position in the sequence.
    pub frame: u32,
    /// Frame rate in frames per second.
    pub frame_rate: f32,
    /// Frame identification text.
    pub frame_id: [u8; 32],
    /// Slate text.
    pub slate: [u8; 200],
    /// Reserved.
    pub pad2: [u8; 740],
}

/// The full 2048-byte Cineon header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// File information block.
    pub file: FileBlock,
    /// Image information block.
    pub image: ImageBlock,
    /// Source information block.
    pub source: SourceBlock,
    /// Film information block.
    pub film: FilmBlock,
}

impl Channel {
    fn undefined() -> Self {
        Self {
            descriptor: [UNDEF_U8; 2],
            bit_depth: UNDEF_U8,
            pad: 0,
            size: [UNDEF_U32; 2],
            low_data: undef_f32(),
            low_quantity: undef_f32(),
            high_data: undef_f32(),
            high_quantity: undef_f32(),
        }
    }

    fn fields(&mut self, p: &mut FieldPass<'_>) -> io::Result<()> {
        p.bytes(&mut self.descriptor)?;
        p.u8(&mut self.bit_depth)?;
        p.u8(&mut self.pad)?;
        p.u32s(&mut self.size)?;
        p.f32(&mut self.low_data)?;
        p.f32(&mut self.low_quantity)?;
        p.f32(&mut self.high_data)?;
        p.f32(&mut self.high_quantity)
    }
}

impl Header {
    /// Creates a header with every field at its undefined sentinel.
    ///
    /// Partially constructed headers must never leak a default zero where
    /// "field not set" was intended; a zero offset and an absent offset are
    /// different states on disk.
    pub fn undefined() -> Self {
        Self {
            file: FileBlock {
                magic: MAGIC[0],
                image_offset: UNDEF_U32,
                generic_size: UNDEF_U32,
                industry_size: UNDEF_U32,
                user_size: UNDEF_U32,
                size: UNDEF_U32,
                version: [0; 8],
                name: [0; 100],
                time: [0; 24],
                pad: [0; 36],
            },
            image: ImageBlock {
                orient: UNDEF_U8,
                channels: UNDEF_U8,
                pad: [0; 2],
                channel: [Channel::undefined(); 8],
                white: [undef_f32(); 2],
                red: [undef_f32(); 2],
                green: [undef_f32(); 2],
                blue: [undef_f32(); 2],
                label: [0; 200],
                pad2: [0; 28],
                interleave: UNDEF_U8,
                packing: UNDEF_U8,
                data_sign: UNDEF_U8,
                data_sense: UNDEF_U8,
                line_padding: UNDEF_U32,
                channel_padding: UNDEF_U32,
                pad3: [0; 20],
            },
            source: SourceBlock {
                offset: [binary::UNDEF_I32; 2],
                file: [0; 100],
                time: [0; 24],
                input_device: [0; 64],
                input_model: [0; 32],
                input_serial: [0; 32],
                input_pitch: [undef_f32(); 2],
                gamma: undef_f32(),
                pad: [0; 40],
            },
            film: FilmBlock {
                id: UNDEF_U8,
                kind: UNDEF_U8,
                offset: UNDEF_U8,
                pad: 0,
                prefix: UNDEF_U32,
                count: UNDEF_U32,
                format: [0; 32],
                frame: UNDEF_U32,
                frame_rate: undef_f32(),
                frame_id: [0; 32],
                slate: [0; 200],
                pad2: [0; 740],
            },
        }
    }

    /// Every header field once, in on-disk order. Decode, encode, and
    /// endian conversion are all this walk under a different pass.
    fn fields(&mut self, p: &mut FieldPass<'_>) -> io::Result<()> {
        let f = &mut self.file;
        p.u32(&mut f.magic)?;
        p.u32(&mut f.image_offset)?;
        p.u32(&mut f.generic_size)?;
        p.u32(&mut f.industry_size)?;
        p.u32(&mut f.user_size)?;
        p.u32(&mut f.size)?;
        p.bytes(&mut f.version)?;
        p.bytes(&mut f.name)?;
        p.bytes(&mut f.time)?;
        p.bytes(&mut f.pad)?;

        let i = &mut self.image;
        p.u8(&mut i.orient)?;
        p.u8(&mut i.channels)?;
        p.bytes(&mut i.pad)?;
        for ch in &mut i.channel {
            ch.fields(p)?;
        }
        p.f32s(&mut i.white)?;
        p.f32s(&mut i.red)?;
        p.f32s(&mut i.green)?;
        p.f32s(&mut i.blue)?;
        p.bytes(&mut i.label)?;
        p.bytes(&mut i.pad2)?;
        p.u8(&mut i.interleave)?;
        p.u8(&mut i.packing)?;
        p.u8(&mut i.data_sign)?;
        p.u8(&mut i.data_sense)?;
        p.u32(&mut i.line_padding)?;
        p.u32(&mut i.channel_padding)?;
        p.bytes(&mut i.pad3)?;

        let s = &mut self.source;
        p.i32s(&mut s.offset)?;
        p.bytes(&mut s.file)?;
        p.bytes(&mut s.time)?;
        p.bytes(&mut s.input_device)?;
        p.bytes(&mut s.input_model)?;
        p.bytes(&mut s.input_serial)?;
        p.f32s(&mut s.input_pitch)?;
        p.f32(&mut s.gamma)?;
        p.bytes(&mut s.pad)?;

        let m = &mut self.film;
        p.u8(&mut m.id)?;
        p.u8(&mut m.kind)?;
        p.u8(&mut m.offset)?;
        p.u8(&mut m.pad)?;
        p.u32(&mut m.prefix)?;
        p.u32(&mut m.count)?;
        p.bytes(&mut m.format)?;
        p.u32(&mut m.frame)?;
        p.f32(&mut m.frame_rate)?;
        p.bytes(&mut m.frame_id)?;
        p.bytes(&mut m.slate)?;
        p.bytes(&mut m.pad2)
    }

    /// Swaps every multi-byte field in place. Its own inverse; string
    /// fields are untouched.
    pub fn convert_endian(&mut self) {
        // The swap pass touches no stream and cannot fail.
        let _ = self.fields(&mut FieldPass::Swap);
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

fn orient_to_mirror(orient: u8) -> Mirror {
    match orient {
        1 => Mirror { x: false, y: true },
        2 => Mirror { x: true, y: false },
        3 => Mirror { x: true, y: true },
        _ => Mirror::default(),
    }
}

fn mirror_to_orient(mirror: Mirror) -> u8 {
    match (mirror.x, mirror.y) {
        (false, false) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (true, true) => 3,
    }
}

/// Reads and decodes a Cineon header.
///
/// Fails with [`IoError::Format`] on an unrecognized magic,
/// [`IoError::Unsupported`] on a pixel layout other than 10-bit RGB, and
/// [`IoError::Io`] on a truncated header.
pub fn read<R: Read>(reader: &mut R) -> IoResult<(Header, Info, ColorProfile)> {
    let mut buf = [0u8; HEADER_BYTES];
    reader.read_exact(&mut buf)?;
    let mut header = Header::decode(&buf)?;

    let endian = if header.file.magic == MAGIC[0] {
        Endian::native()
    } else if header.file.magic == MAGIC[1] {
        header.convert_endian();
        Endian::native().opposite()
    } else {
        return Err(IoError::Format(format!(
            "unrecognized Cineon magic: 0x{:08X}",
            header.file.magic
        )));
    };
    trace!(?endian, "cineon header");

    let channels = header.image.channels;
    if !is_valid_u8(channels) || channels == 0 || channels > 8 {
        return Err(IoError::Format(format!(
            "invalid channel count: {}",
            channels
        )));
    }
    let first = &header.image.channel[0];
    if !is_valid_u32(first.size[0]) || !is_valid_u32(first.size[1]) {
        return Err(IoError::Format("image size undefined".into()));
    }
    for ch in &header.image.channel[1..channels as usize] {
        if ch.size != first.size || ch.bit_depth != first.bit_depth {
            return Err(IoError::Unsupported("mismatched channel descriptions".into()));
        }
    }
    if channels != 3 || first.bit_depth != 10 {
        return Err(IoError::Unsupported(format!(
            "{} channels at {} bits",
            channels, first.bit_depth
        )));
    }

    let mut layout = PixelLayout::new(3, PixelType::U10);
    layout.endian = endian;
    let mut info = Info::new(first.size[0], first.size[1], layout);
    info.mirror = orient_to_mirror(header.image.orient);

    if is_valid_text(&header.file.time) {
        info.tags.set(TAG_TIME, string_from_bytes(&header.file.time));
    }
    if is_valid_text(&header.source.file) {
        info.tags.set(TAG_SOURCE, string_from_bytes(&header.source.file));
    }
    if is_valid_text(&header.source.input_device) {
        info.tags
            .set(TAG_CREATOR, string_from_bytes(&header.source.input_device));
    }
    if is_valid_text(&header.film.slate) {
        info.tags
            .set(TAG_DESCRIPTION, string_from_bytes(&header.film.slate));
    }
    let m = &header.film;
    if is_valid_u8(m.id)
        && is_valid_u8(m.kind)
        && is_valid_u8(m.offset)
        && is_valid_u32(m.prefix)
        && is_valid_u32(m.count)
    {
        info.tags.set(
            TAG_KEYCODE,
            keycode_to_string(
                m.id as i32,
                m.kind as i32,
                m.prefix as i32,
                m.count as i32,
                m.offset as i32,
            ),
        );
    }

    // Descriptors 1-3 are RGB printing density.
    let profile = if (1..=3).contains(&first.descriptor[1]) {
        ColorProfile::FilmPrint(FilmPrint::default())
    } else {
        ColorProfile::Raw
    };

    Ok((header, info, profile))
}

/// Write options.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Header and payload byte order. Defaults to the running process's.
    pub endian: Endian,
}

/// Encodes and writes a Cineon header for `info`.
///
/// The file size field is left at its undefined sentinel; call
/// [`write_finish`] after the pixel payload. Only 10-bit RGB is encodable.
pub fn write<W: Write>(
    writer: &mut W,
    info: &Info,
    profile: ColorProfile,
    options: WriteOptions,
) -> IoResult<Header> {
    if info.layout.channels != 3 || info.layout.pixel_type != PixelType::U10 {
        return Err(IoError::Unsupported(format!(
            "{} channels as {:?}",
            info.layout.channels, info.layout.pixel_type
        )));
    }

    let mut header = Header::undefined();
    header.file.magic = MAGIC[0];
    header.file.image_offset = HEADER_BYTES as u32;
    header.file.generic_size = 1024;
    header.file.industry_size = 1024;
    header.file.user_size = 0;
    header.file.version[..4].copy_from_slice(b"V4.5");

    header.image.orient = mirror_to_orient(info.mirror);
    header.image.channels = 3;
    let film_print = matches!(profile, ColorProfile::FilmPrint(_));
    for (c, ch) in header.image.channel[..3].iter_mut().enumerate() {
        ch.descriptor[0] = 0;
        // 1-3 printing density, 4-6 linear.
        ch.descriptor[1] = (if film_print { 1u8 } else { 4u8 }) + c as u8;
        ch.bit_depth = 10;
        ch.size = [info.width, info.height];
        ch.low_data = 0.0;
        ch.high_data = 1023.0;
    }
    header.image.interleave = 0;
    header.image.packing = 5;
    header.image.data_sign = 0;
    header.image.data_sense = 0;
    header.image.line_padding = 0;
    header.image.channel_padding = 0;

    if let Some(v) = info.tags.get(TAG_TIME) {
        string_to_bytes(v, &mut header.file.time, true);
    }
    if let Some(v) = info.tags.get(TAG_SOURCE) {
        string_to_bytes(v, &mut header.source.file, true);
    }
    if let Some(v) = info.tags.get(TAG_CREATOR) {
        string_to_bytes(v, &mut header.source.input_device, true);
    }
    if let Some(v) = info.tags.get(TAG_DESCRIPTION) {
        string_to_bytes(v, &mut header.film.slate, true);
    }
    if let Some(v) = info.tags.get(TAG_KEYCODE) {
        let (id, kind, prefix, count, offset) = keycode_from_string(v)?;
        header.film.id = id as u8;
        header.film.kind = kind as u8;
        header.film.offset = offset as u8;
        header.film.prefix = prefix as u32;
        header.film.count = count as u32;
    }

    let mut on_disk = header.clone();
    if options.endian != Endian::native() {
        on_disk.convert_endian();
    }
    writer.write_all(&on_disk.encode()?)?;
    Ok(header)
}

/// Patches the file size field after the pixel payload has been written.
///
/// Measures the stream length, then rewrites the 4 bytes at the size
/// field's offset in the byte order the header was written with. No other
/// header bytes are touched.
pub fn write_finish<W: Write + Seek>(writer: &mut W, endian: Endian) -> IoResult<()> {
    binary::patch_size(writer, SIZE_OFFSET, endian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::Tags;
    use std::io::SeekFrom;

    fn sample_info() -> Info {
        let mut layout = PixelLayout::new(3, PixelType::U10);
        layout.endian = Endian::native();
        let mut info = Info::new(2048, 1556, layout);
        let mut tags = Tags::new();
        tags.set(TAG_TIME, "2004:06:01 12:00:00");
        tags.set(TAG_CREATOR, "film scanner");
        tags.set(TAG_KEYCODE, "20:11:92:100:4");
        info.tags = tags;
        info
    }

    #[test]
    fn test_convert_endian_involution() {
        let mut header = Header::undefined();
        header.image.channel[0].size = [2048, 1556];
        header.film.frame_rate = 24.0;
        let original = header.clone();
        header.convert_endian();
        assert_ne!(header, original);
        header.convert_endian();
        assert_eq!(header, original);
    }

    #[test]
    fn test_round_trip() {
        let info = sample_info();
        let mut buf = Vec::new();
        write(
            &mut buf,
            &info,
            ColorProfile::FilmPrint(FilmPrint::default()),
            WriteOptions::default(),
        )
        .unwrap();
        assert_eq!(buf.len(), HEADER_BYTES);

        let (_, loaded, profile) = read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(loaded, info);
        assert_eq!(profile, ColorProfile::FilmPrint(FilmPrint::default()));
    }

    #[test]
    fn test_opposite_endian_read() {
        let info = sample_info();
        let mut buf = Vec::new();
        let options = WriteOptions {
            endian: Endian::native().opposite(),
        };
        write(&mut buf, &info, ColorProfile::Raw, options).unwrap();

        let (_, loaded, profile) = read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(loaded.width, 2048);
        assert_eq!(loaded.height, 1556);
        assert_eq!(loaded.layout.endian, Endian::native().opposite());
        assert_eq!(profile, ColorProfile::Raw);
    }

    #[test]
    fn test_truncated_header() {
        let info = sample_info();
        let mut buf = Vec::new();
        write(&mut buf, &info, ColorProfile::Raw, WriteOptions::default()).unwrap();
        buf.truncate(HEADER_BYTES - 1);

        match read(&mut Cursor::new(&buf)) {
            Err(IoError::Io(_)) => {}
            other => panic!("expected I/O error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_bad_magic() {
        let buf = vec![0u8; HEADER_BYTES];
        assert!(matches!(
            read(&mut Cursor::new(&buf)),
            Err(IoError::Format(_))
        ));
    }

    #[test]
    fn test_write_finish_patches_size() {
        let info = sample_info();
        let mut cursor = Cursor::new(Vec::new());
        write(&mut cursor, &info, ColorProfile::Raw, WriteOptions::default()).unwrap();
        cursor.write_all(&vec![0u8; 128]).unwrap();
        write_finish(&mut cursor, Endian::native()).unwrap();

        let buf = cursor.into_inner();
        let (header, _, _) = read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(header.file.size, (HEADER_BYTES + 128) as u32);
    }

    #[test]
    fn test_partial_keycode_not_tagged() {
        let info = sample_info();
        let mut buf = Vec::new();
        write(&mut buf, &info, ColorProfile::Raw, WriteOptions::default()).unwrap();
        // Film type back at its unset sentinel leaves the keycode incomplete.
        buf[192 + 520 + 312 + 1] = UNDEF_U8;

        let (_, loaded, _) = read(&mut Cursor::new(&buf)).unwrap();
        assert!(loaded.tags.get(TAG_KEYCODE).is_none());
    }

    #[test]
    fn test_write_finish_rejects_oversize_stream() {
        struct HugeStream(u64);

        impl Write for HugeStream {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        impl Seek for HugeStream {
            fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
                match pos {
                    SeekFrom::Start(n) => Ok(n),
                    SeekFrom::End(n) => Ok((self.0 as i64 + n) as u64),
                    SeekFrom::Current(n) => Ok(n as u64),
                }
            }
        }

        let mut stream = HugeStream(u64::from(u32::MAX) + 1);
        assert!(matches!(
            write_finish(&mut stream, Endian::native()),
            Err(IoError::Format(_))
        ));
    }

    #[test]
    fn test_unsupported_layout() {
        let info = Info::new(16, 16, PixelLayout::new(4, PixelType::U8));
        let mut buf = Vec::new();
        assert!(matches!(
            write(&mut buf, &info, ColorProfile::Raw, WriteOptions::default()),
            Err(IoError::Unsupported(_))
        ));
    }
}
