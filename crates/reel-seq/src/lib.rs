//! Frame sequence detection and file name grouping.
//!
//! Numbered files like `shot.0001.dpx` ... `shot.0100.dpx` are modelled as a
//! single logical sequence: a base name, an extension, a set of closed frame
//! ranges, and a zero-padding width. This crate provides:
//!
//! - [`FrameRange`] and [`Sequence`]: frame sets as sorted, disjoint closed
//!   ranges with a padding width, plus the `1-3,10####` boundary notation.
//! - [`split`] and [`FileInfo`]: file name decomposition into directory,
//!   base, number field, and extension, with exact reconstruction.
//! - [`group`] and [`list_dir`]: clustering of file names into sequences
//!   with padding-consistency rules.
//!
//! # Example
//!
//! ```rust
//! use reel_seq::group;
//!
//! let infos = group(["shot.0001.dpx", "shot.0002.dpx", "shot.0003.dpx"]);
//! assert_eq!(infos.len(), 1);
//! assert_eq!(infos[0].number(), "1-3####");
//! assert_eq!(infos[0].file_name(2), "shot.0002.dpx");
//! ```

#![warn(missing_docs)]

mod error;
mod fileinfo;
mod frame;
mod sequence;

pub use error::{SeqError, SeqResult};
pub use fileinfo::{group, list_dir, split, wildcard_match, FileInfo, FileKind, Split};
pub use frame::{frame_to_string, is_wildcard, string_to_frame, FrameRange};
pub use sequence::Sequence;
