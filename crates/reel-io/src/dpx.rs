//! DPX (SMPTE 268M Digital Picture Exchange) header support.
//!
//! DPX is the successor to Cineon and keeps the same overall shape: a
//! 2048-byte header in five fixed blocks — file (768 bytes), image (640),
//! source (256), film (256), and television (128) — followed by the pixel
//! payload. The magic value is the ASCII text "SDPX"; read byte-swapped it
//! appears as "XPDS", which identifies an opposite-endian file whose every
//! multi-byte field must be swapped before interpretation.
//!
//! Versions 1.0 and 2.0 are accepted. Supported pixel layouts are
//! luminance, RGB, and RGBA at 8, 10, 12, and 16 bits (10/12-bit filled
//! type A). A transfer characteristic of printing density yields a
//! [`ColorProfile::FilmPrint`].

use std::io::{self, Cursor, Read, Seek, Write};

use tracing::trace;

use crate::binary::{
    self, Endian, FieldPass, UNDEF_U8, UNDEF_U16, UNDEF_U32, is_valid_u16, is_valid_u32,
    is_valid_text, string_from_bytes, string_to_bytes, undef_f32,
};
use crate::info::{
    Info, Mirror, PixelLayout, PixelType, TAG_COPYRIGHT, TAG_CREATOR, TAG_DESCRIPTION,
    TAG_KEYCODE, TAG_PROJECT, TAG_SOURCE, TAG_TIME, TAG_TIMECODE,
};
use crate::profile::{ColorProfile, FilmPrint};
use crate::time::{keycode_from_string, keycode_to_string, timecode_from_string, timecode_to_string};
use crate::{IoError, IoResult};

/// Header magic, native ("SDPX") and byte-swapped ("XPDS").
pub const MAGIC: [u32; 2] = [0x5344_5058, 0x5850_4453];
/// Total header size in bytes.
pub const HEADER_BYTES: usize = 2048;
/// Byte offset of the file size field, patched by [`write_finish`].
const SIZE_OFFSET: u64 = 16;

/// Transfer characteristic code for printing density.
const TRANSFER_FILM_PRINT: u8 = 1;
/// Transfer characteristic code for linear.
const TRANSFER_LINEAR: u8 = 2;

/// File format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    /// DPX 1.0.
    V1,
    /// DPX 2.0.
    #[default]
    V2,
}

impl Version {
    fn text(self) -> &'static [u8; 4] {
        match self {
            Version::V1 => b"V1.0",
            Version::V2 => b"V2.0",
        }
    }
}

/// File information block (768 bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct FileBlock {
    /// Magic number; selects endianness.
    pub magic: u32,
    /// Byte offset to image data.
    pub image_offset: u32,
    /// Version string, "V1.0" or "V2.0".
    pub version: [u8; 8],
    /// Total file size, patched after the payload is written.
    pub size: u32,
    /// Ditto key; 1 = header unchanged from the previous frame.
    pub ditto_key: u32,
    /// Generic header section size.
    pub generic_size: u32,
    /// Industry header section size.
    pub industry_size: u32,
    /// User header section size.
    pub user_size: u32,
    /// Original file name.
    pub name: [u8; 100],
    /// Creation time.
    pub time: [u8; 24],
    /// Creator software or facility.
    pub creator: [u8; 100],
    /// Project name.
    pub project: [u8; 200],
    /// Copyright statement.
    pub copyright: [u8; 200],
    /// Encryption key; all-ones = unencrypted.
    pub encryption_key: u32,
    /// Reserved.
    pub pad: [u8; 104],
}

/// Per-element image description (72 bytes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Elem {
    /// Data sign, 0 = unsigned.
    pub data_sign: u32,
    /// Lowest code value.
    pub low_data: u32,
    /// Quantity represented by the lowest code value.
    pub low_quantity: f32,
    /// Highest code value.
    pub high_data: u32,
    /// Quantity represented by the highest code value.
    pub high_quantity: f32,
    /// Descriptor: 6 = luminance, 50 = RGB, 51 = RGBA.
    pub descriptor: u8,
    /// Transfer characteristic; 1 = printing density.
    pub transfer: u8,
    /// Colorimetric specification.
    pub colorimetric: u8,
    /// Bits per component.
    pub bit_depth: u8,
    /// Packing: 0 = packed, 1 = filled type A.
    pub packing: u16,
    /// Encoding: 0 = none, 1 = RLE.
    pub encoding: u16,
    /// Byte offset to this element's data.
    pub data_offset: u32,
    /// End-of-line padding bytes.
    pub line_padding: u32,
    /// End-of-element padding bytes.
    pub elem_padding: u32,
    /// Element description text.
    pub description: [u8; 32],
}

/// Image information block (640 bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    /// Orientation code.
    pub orient: u16,
    /// Number of image elements in use.
    pub elems: u16,
    /// Width and height.
    pub size: [u32; 2],
    /// Element descriptions; only the first `elems` are meaningful.
    pub elem: [Elem; 8],
    /// Reserved.
    pub pad: [u8; 52],
}

/// Source information block (256 bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBlock {
    /// X/Y offset within the source image.
    pub offset: [i32; 2],
    /// X/Y center of the source image.
    pub center: [f32; 2],
    /// Source image size.
    pub size: [u32; 2],
    /// Source file name.
    pub file: [u8; 100],
    /// Source creation time.
    pub time: [u8; 24],
    /// Input device name.
    pub input_device: [u8; 32],
    /// Input device serial number.
    pub input_serial: [u8; 32],
    /// Border validity, XL/XR/YT/YB.
    pub border: [u16; 4],
    /// Pixel aspect ratio, horizontal/vertical.
    pub pixel_aspect: [u32; 2],
    /// Scanned size in millimetres.
    pub scan_size: [f32; 2],
    /// Reserved.
    pub pad: [u8; 20],
}

/// Film industry block (256 bytes). Keycode fields are ASCII digits.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmBlock {
    /// Keycode film manufacturer id.
    pub id: [u8; 2],
    /// Keycode film type.
    pub kind: [u8; 2],
    /// Keycode frame offset in perforations.
    pub offset: [u8; 2],
    /// Keycode prefix.
    pub prefix: [u8; 6],
    /// Keycode count.
    pub count: [u8; 4],
    /// Film format name.
    pub format: [u8; 32],
    /// Frame position in the sequence.
    pub frame: u32,
    /// Sequence length in frames.
    pub sequence: u32,
    /// Held frame count.
    pub hold: u32,
    /// Frame rate in frames per second.
    pub frame_rate: f32,
    /// Shutter angle in degrees.
    pub shutter: f32,
    /// Frame identification text.
    pub frame_id: [u8; 32],
    /// Slate text.
    pub slate: [u8; 100],
    /// Reserved.
    pub pad: [u8; 56],
}

/// Television industry block (128 bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct TvBlock {
    /// SMPTE timecode, packed BCD.
    pub timecode: u32,
    /// SMPTE user bits.
    pub user_bits: u32,
    /// Interlace flag.
    pub interlace: u8,
    /// Field number.
    pub field: u8,
    /// Video signal standard.
    pub video_signal: u8,
    /// Reserved.
    pub pad: u8,
    /// Sampling rate, horizontal/vertical.
    pub sample_rate: [f32; 2],
    /// Frame rate in frames per second.
    pub frame_rate: f32,
    /// Time offset from sync to first pixel, microseconds.
    pub time_offset: f32,
    /// Gamma.
    pub gamma: f32,
    /// Black level code value.
    pub black_level: f32,
    /// Black gain.
    pub black_gain: f32,
    /// Breakpoint code value.
    pub breakpoint: f32,
    /// White level code value.
    pub white_level: f32,
    /// Integration times in seconds.
    pub integration_times: f32,
    /// Reserved.
    pub pad2: [u8; 76],
}

/// The full 2048-byte DPX header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// File information block.
    pub file: FileBlock,
    /// Image information block.
    pub image: ImageBlock,
    /// Source information block.
    pub source: SourceBlock,
    /// Film industry block.
    pub film: FilmBlock,
    /// Television industry block.
    pub tv: TvBlock,
}

impl Elem {
    fn undefined() -> Self {
        Self {
            data_sign: UNDEF_U32,
            low_data: UNDEF_U32,
            low_quantity: undef_f32(),
            high_data: UNDEF_U32,
            high_quantity: undef_f32(),
            descriptor: UNDEF_U8,
            transfer: UNDEF_U8,
            colorimetric: UNDEF_U8,
            bit_depth: UNDEF_U8,
            packing: UNDEF_U16,
            encoding: UNDEF_U16,
            data_offset: UNDEF_U32,
            line_padding: UNDEF_U32,
            elem_padding: UNDEF_U32,
            description: [0; 32],
        }
    }

    fn fields(&mut self, p: &mut FieldPass<'_>) -> io::Result<()> {
        p.u32(&mut self.data_sign)?;
        p.u32(&mut self.low_data)?;
        p.f32(&mut self.low_quantity)?;
        p.u32(&mut self.high_data)?;
        p.f32(&mut self.high_quantity)?;
        p.u8(&mut self.descriptor)?;
        p.u8(&mut self.transfer)?;
        p.u8(&mut self.colorimetric)?;
        p.u8(&mut self.bit_depth)?;
        p.u16(&mut self.packing)?;
        p.u16(&mut self.encoding)?;
        p.u32(&mut self.data_offset)?;
        p.u32(&mut self.line_padding)?;
        p.u32(&mut self.elem_padding)?;
        p.bytes(&mut self.description)
    }
}

impl Header {
    /// Creates a header with every field at its undefined sentinel.
    pub fn undefined() -> Self {
        Self {
            file: FileBlock {
                magic: MAGIC[0],
                image_offset: UNDEF_U32,
                version: [0; 8],
                size: UNDEF_U32,
                ditto_key: UNDEF_U32,
                generic_size: UNDEF_U32,
                industry_size: UNDEF_U32,
                user_size: UNDEF_U32,
                name: [0; 100],
                time: [0; 24],
                creator: [0; 100],
                project: [0; 200],
                copyright: [0; 200],
                encryption_key: UNDEF_U32,
                pad: [0; 104],
            },
            image: ImageBlock {
                orient: UNDEF_U16,
                elems: UNDEF_U16,
                size: [UNDEF_U32; 2],
                elem: [Elem::undefined(); 8],
                pad: [0; 52],
            },
            source: SourceBlock {
                offset: [binary::UNDEF_I32; 2],
                center: [undef_f32(); 2],
                size: [UNDEF_U32; 2],
                file: [0; 100],
                time: [0; 24],
                input_device: [0; 32],
                input_serial: [0; 32],
                border: [UNDEF_U16; 4],
                pixel_aspect: [UNDEF_U32; 2],
                scan_size: [undef_f32(); 2],
                pad: [0; 20],
            },
            film: FilmBlock {
                id: [0; 2],
                kind: [0; 2],
                offset: [0; 2],
                prefix: [0; 6],
                count: [0; 4],
                format: [0; 32],
                frame: UNDEF_U32,
                sequence: UNDEF_U32,
                hold: UNDEF_U32,
                frame_rate: undef_f32(),
                shutter: undef_f32(),
                frame_id: [0; 32],
                slate: [0; 100],
                pad: [0; 56],
            },
            tv: TvBlock {
                timecode: UNDEF_U32,
                user_bits: UNDEF_U32,
                interlace: UNDEF_U8,
                field: UNDEF_U8,
                video_signal: UNDEF_U8,
                pad: 0,
                sample_rate: [undef_f32(); 2],
                frame_rate: undef_f32(),
                time_offset: undef_f32(),
                gamma: undef_f32(),
                black_level: undef_f32(),
                black_gain: undef_f32(),
                breakpoint: undef_f32(),
                white_level: undef_f32(),
                integration_times: undef_f32(),
                pad2: [0; 76],
            },
        }
    }

    /// Every header field once, in on-disk order. Decode, encode, and
    /// endian conversion are all this walk under a different pass.
    fn fields(&mut self, p: &mut FieldPass<'_>) -> io::Result<()> {
        let f = &mut self.file;
        p.u32(&mut f.magic)?;
        p.u32(&mut f.image_offset)?;
        p.bytes(&mut f.version)?;
        p.u32(&mut f.size)?;
        p.u32(&mut f.ditto_key)?;
        p.u32(&mut f.generic_size)?;
        p.u32(&mut f.industry_size)?;
        p.u32(&mut f.user_size)?;
        p.bytes(&mut f.name)?;
        p.bytes(&mut f.time)?;
        p.bytes(&mut f.creator)?;
        p.bytes(&mut f.project)?;
        p.bytes(&mut f.copyright)?;
        p.u32(&mut f.encryption_key)?;
        p.bytes(&mut f.pad)?;

        let i = &mut self.image;
        p.u16(&mut i.orient)?;
        p.u16(&mut i.elems)?;
        p.u32s(&mut i.size)?;
        for e in &mut i.elem {
            e.fields(p)?;
        }
        p.bytes(&mut i.pad)?;

        let s = &mut self.source;
        p.i32s(&mut s.offset)?;
        p.f32s(&mut s.center)?;
        p.u32s(&mut s.size)?;
        p.bytes(&mut s.file)?;
        p.bytes(&mut s.time)?;
        p.bytes(&mut s.input_device)?;
        p.bytes(&mut s.input_serial)?;
        p.u16s(&mut s.border)?;
        p.u32s(&mut s.pixel_aspect)?;
        p.f32s(&mut s.scan_size)?;
        p.bytes(&mut s.pad)?;

        let m = &mut self.film;
        p.bytes(&mut m.id)?;
        p.bytes(&mut m.kind)?;
        p.bytes(&mut m.offset)?;
        p.bytes(&mut m.prefix)?;
        p.bytes(&mut m.count)?;
        p.bytes(&mut m.format)?;
        p.u32(&mut m.frame)?;
        p.u32(&mut m.sequence)?;
        p.u32(&mut m.hold)?;
        p.f32(&mut m.frame_rate)?;
        p.f32(&mut m.shutter)?;
        p.bytes(&mut m.frame_id)?;
        p.bytes(&mut m.slate)?;
        p.bytes(&mut m.pad)?;

        let t = &mut self.tv;
        p.u32(&mut t.timecode)?;
        p.u32(&mut t.user_bits)?;
        p.u8(&mut t.interlace)?;
        p.u8(&mut t.field)?;
        p.u8(&mut t.video_signal)?;
        p.u8(&mut t.pad)?;
        p.f32s(&mut t.sample_rate)?;
        p.f32(&mut t.frame_rate)?;
        p.f32(&mut t.time_offset)?;
        p.f32(&mut t.gamma)?;
        p.f32(&mut t.black_level)?;
        p.f32(&mut t.black_gain)?;
        p.f32(&mut t.breakpoint)?;
        p.f32(&mut t.white_level)?;
        p.f32(&mut t.integration_times)?;
        p.bytes(&mut t.pad2)
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

fn orient_to_mirror(orient: u16) -> Mirror {
    match orient {
        1 => Mirror { x: true, y: false },
        2 => Mirror { x: false, y: true },
        3 => Mirror { x: true, y: true },
        _ => Mirror::default(),
    }
}

fn mirror_to_orient(mirror: Mirror) -> u16 {
    match (mirror.x, mirror.y) {
        (false, false) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (true, true) => 3,
    }
}

fn layout_from_elem(elem: &Elem, endian: Endian) -> IoResult<PixelLayout> {
    let channels = match elem.descriptor {
        6 => 1,
        50 => 3,
        51 => 4,
        d => {
            return Err(IoError::Unsupported(format!("descriptor {}", d)));
        }
    };
    let (pixel_type, packing) = match elem.bit_depth {
        8 => (PixelType::U8, 0),
        10 => (PixelType::U10, 1),
        12 => (PixelType::U12, 1),
        16 => (PixelType::U16, 0),
        b => {
            return Err(IoError::Unsupported(format!("{} bits", b)));
        }
    };
    if elem.packing != packing {
        return Err(IoError::Unsupported(format!(
            "packing {} at {} bits",
            elem.packing, elem.bit_depth
        )));
    }
    if is_valid_u16(elem.encoding) && elem.encoding != 0 {
        return Err(IoError::Unsupported(format!("encoding {}", elem.encoding)));
    }
    let mut layout = PixelLayout::new(channels, pixel_type);
    layout.endian = endian;
    Ok(layout)
}

/// Reads and decodes a DPX header.
///
/// Fails with [`IoError::Format`] on an unrecognized magic or version,
/// [`IoError::Unsupported`] on a pixel layout this codec does not handle,
/// and [`IoError::Io`] on a truncated header.
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
            "unrecognized DPX magic: 0x{:08X}",
            header.file.magic
        )));
    };
    if !header.file.version.starts_with(b"V1.0") && !header.file.version.starts_with(b"V2.0") {
        return Err(IoError::Format(format!(
            "unrecognized DPX version: {:?}",
            string_from_bytes(&header.file.version)
        )));
    }
    trace!(?endian, "dpx header");

    if !is_valid_u16(header.image.elems) || header.image.elems == 0 || header.image.elems > 8 {
        return Err(IoError::Format(format!(
            "invalid element count: {}",
            header.image.elems
        )));
    }
    if !is_valid_u32(header.image.size[0]) || !is_valid_u32(header.image.size[1]) {
        return Err(IoError::Format("image size undefined".into()));
    }
    let elem = &header.image.elem[0];
    let layout = layout_from_elem(elem, endian)?;

    let mut info = Info::new(header.image.size[0], header.image.size[1], layout);
    info.mirror = orient_to_mirror(header.image.orient);
    decode_tags(&header, &mut info);

    let profile = if elem.transfer == TRANSFER_FILM_PRINT {
        ColorProfile::FilmPrint(FilmPrint::default())
    } else {
        ColorProfile::Raw
    };

    Ok((header, info, profile))
}

fn decode_tags(header: &Header, info: &mut Info) {
    let f = &header.file;
    if is_valid_text(&f.time) {
        info.tags.set(TAG_TIME, string_from_bytes(&f.time));
    }
    if is_valid_text(&f.creator) {
        info.tags.set(TAG_CREATOR, string_from_bytes(&f.creator));
    }
    if is_valid_text(&f.project) {
        info.tags.set(TAG_PROJECT, string_from_bytes(&f.project));
    }
    if is_valid_text(&f.copyright) {
        info.tags.set(TAG_COPYRIGHT, string_from_bytes(&f.copyright));
    }
    if is_valid_text(&header.source.file) {
        info.tags.set(TAG_SOURCE, string_from_bytes(&header.source.file));
    }
    if is_valid_text(&header.film.slate) {
        info.tags
            .set(TAG_DESCRIPTION, string_from_bytes(&header.film.slate));
    }
    if let Some(keycode) = decode_keycode(&header.film) {
        info.tags.set(TAG_KEYCODE, keycode);
    }
    if is_valid_u32(header.tv.timecode) {
        info.tags
            .set(TAG_TIMECODE, timecode_to_string(header.tv.timecode));
    }
}

fn decode_keycode(film: &FilmBlock) -> Option<String> {
    let digits = |buf: &[u8]| -> Option<i32> { string_from_bytes(buf).trim().parse().ok() };
    Some(keycode_to_string(
        digits(&film.id)?,
        digits(&film.kind)?,
        digits(&film.prefix)?,
        digits(&film.count)?,
        digits(&film.offset)?,
    ))
}

/// Write options.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Header and payload byte order. Defaults to the running process's.
    pub endian: Endian,
    /// File format version to declare.
    pub version: Version,
}

/// Encodes and writes a DPX header for `info`.
///
/// The file size field is left at its undefined sentinel; call
/// [`write_finish`] after the pixel payload.
pub fn write<W: Write>(
    writer: &mut W,
    info: &Info,
    profile: ColorProfile,
    options: WriteOptions,
) -> IoResult<Header> {
    let (descriptor, bit_depth, packing, high_data) = match (info.layout.channels, info.layout.pixel_type) {
        (1, PixelType::U8) => (6u8, 8u8, 0u16, 255),
        (3, PixelType::U8) => (50, 8, 0, 255),
        (4, PixelType::U8) => (51, 8, 0, 255),
        (3, PixelType::U10) => (50, 10, 1, 1023),
        (3, PixelType::U12) => (50, 12, 1, 4095),
        (3, PixelType::U16) => (50, 16, 0, 65535),
        (4, PixelType::U16) => (51, 16, 0, 65535),
        (c, t) => {
            return Err(IoError::Unsupported(format!("{} channels as {:?}", c, t)));
        }
    };

    let mut header = Header::undefined();
    header.file.magic = MAGIC[0];
    header.file.image_offset = HEADER_BYTES as u32;
    header.file.version[..4].copy_from_slice(options.version.text());
    header.file.ditto_key = 0;
    header.file.generic_size = 1664;
    header.file.industry_size = 384;
    header.file.user_size = 0;
    header.file.encryption_key = UNDEF_U32;

    header.image.orient = mirror_to_orient(info.mirror);
    header.image.elems = 1;
    header.image.size = [info.width, info.height];
    let elem = &mut header.image.elem[0];
    elem.data_sign = 0;
    elem.low_data = 0;
    elem.low_quantity = 0.0;
    elem.high_data = high_data;
    elem.high_quantity = 1.0;
    elem.descriptor = descriptor;
    elem.transfer = if matches!(profile, ColorProfile::FilmPrint(_)) {
        TRANSFER_FILM_PRINT
    } else {
        TRANSFER_LINEAR
    };
    elem.colorimetric = elem.transfer;
    elem.bit_depth = bit_depth;
    elem.packing = packing;
    elem.encoding = 0;
    elem.data_offset = HEADER_BYTES as u32;
    elem.line_padding = 0;
    elem.elem_padding = 0;

    encode_tags(info, &mut header)?;

    let mut on_disk = header.clone();
    if options.endian != Endian::native() {
        on_disk.convert_endian();
    }
    writer.write_all(&on_disk.encode()?)?;
    Ok(header)
}

fn encode_tags(info: &Info, header: &mut Header) -> IoResult<()> {
    if let Some(v) = info.tags.get(TAG_TIME) {
        string_to_bytes(v, &mut header.file.time, true);
    }
    if let Some(v) = info.tags.get(TAG_CREATOR) {
        string_to_bytes(v, &mut header.file.creator, true);
    }
    if let Some(v) = info.tags.get(TAG_PROJECT) {
        string_to_bytes(v, &mut header.file.project, true);
    }
    if let Some(v) = info.tags.get(TAG_COPYRIGHT) {
        string_to_bytes(v, &mut header.file.copyright, true);
    }
    if let Some(v) = info.tags.get(TAG_SOURCE) {
        string_to_bytes(v, &mut header.source.file, true);
    }
    if let Some(v) = info.tags.get(TAG_DESCRIPTION) {
        string_to_bytes(v, &mut header.film.slate, true);
    }
    if let Some(v) = info.tags.get(TAG_KEYCODE) {
        let (id, kind, prefix, count, offset) = keycode_from_string(v)?;
        // Keycode fields are unterminated ASCII digits of fixed width.
        string_to_bytes(&format!("{:02}", id), &mut header.film.id, false);
        string_to_bytes(&format!("{:02}", kind), &mut header.film.kind, false);
        string_to_bytes(&format!("{:02}", offset), &mut header.film.offset, false);
        string_to_bytes(&format!("{:06}", prefix), &mut header.film.prefix, false);
        string_to_bytes(&format!("{:04}", count), &mut header.film.count, false);
    }
    if let Some(v) = info.tags.get(TAG_TIMECODE) {
        header.tv.timecode = timecode_from_string(v)?;
    }
    Ok(())
}

/// Patches the file size field after the pixel payload has been written.
pub fn write_finish<W: Write + Seek>(writer: &mut W, endian: Endian) -> IoResult<()> {
    binary::patch_size(writer, SIZE_OFFSET, endian)
}
