//! Binary header codecs for professional image formats.
//!
//! Each codec converts between an on-disk header layout and an in-memory
//! [`Info`] (dimensions, pixel layout, orientation, tags) plus a
//! [`ColorProfile`] where the format carries one. The formats share one
//! contract:
//!
//! - `read(stream)` decodes the header, all-or-nothing: a truncated or
//!   unrecognized header is an error, never a partially populated `Info`.
//! - `write(stream, info, ...)` encodes a header in the process's native
//!   byte order unless options request otherwise, leaving payload-dependent
//!   fields at their undefined sentinels.
//! - `write_finish(stream)` patches those fields once the payload size is
//!   known.
//! - `Header::undefined()` builds a header of per-format "field not set"
//!   sentinels, and `convert_endian` byte-swaps every multi-byte field in
//!   place (its own inverse).
//!
//! Codecs hold no state between calls; a stream plus a header value is the
//! whole working set, so independent reads may run on as many threads as
//! the caller likes.
//!
//! # Formats
//!
//! | Format | Extensions | Header | Notes |
//! |--------|-----------|--------|-------|
//! | Cineon | `cin` | 2048 B, dual-endian | 10-bit film scans |
//! | DPX | `dpx` | 2048 B, dual-endian | SMPTE 268M, V1.0/V2.0 |
//! | SGI | `sgi` `rgba` `rgb` `bw` | 512 B, big-endian | optional RLE tables |
//! | Targa | `tga` | 18 B, little-endian | no magic |
//! | RLA | `rla` `rpf` | 740 B, big-endian | read-only |
//! | PFM | `pfm` | ASCII tokens | scale sign = endianness |
//! | OpenEXR | `exr` | n/a | tag/layer mapping only |
//!
//! # Example
//!
//! ```rust,no_run
//! use reel_io::read_info;
//!
//! let info = read_info("frame.0001.dpx")?;
//! println!("{}x{}", info.width, info.height);
//! # Ok::<(), reel_io::IoError>(())
//! ```

#![warn(missing_docs)]

mod binary;
mod detect;
mod error;
mod info;
mod profile;
mod time;

#[cfg(feature = "cineon")]
pub mod cineon;
#[cfg(feature = "dpx")]
pub mod dpx;
#[cfg(feature = "exr")]
pub mod exr;
#[cfg(feature = "pfm")]
pub mod pfm;
#[cfg(feature = "rla")]
pub mod rla;
#[cfg(feature = "sgi")]
pub mod sgi;
#[cfg(feature = "targa")]
pub mod targa;

pub use binary::{
    Endian, UNDEF_F32_BITS, UNDEF_I32, UNDEF_U8, UNDEF_U16, UNDEF_U32, is_valid_f32,
    is_valid_i32, is_valid_text, is_valid_u8, is_valid_u16, is_valid_u32, string_from_bytes,
    string_to_bytes, undef_f32,
};
pub use detect::{FORMATS, FormatKind, read_info};
pub use error::{IoError, IoResult};
pub use info::{
    Info, Mirror, PixelLayout, PixelType, TAG_COPYRIGHT, TAG_CREATOR, TAG_DESCRIPTION,
    TAG_KEYCODE, TAG_PROJECT, TAG_SOURCE, TAG_TIME, TAG_TIMECODE, Tags,
};
pub use profile::{ColorProfile, FilmPrint};
pub use time::{keycode_from_string, keycode_to_string, timecode_from_string, timecode_to_string};
