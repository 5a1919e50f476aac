//! File name splitting and sequence grouping.
//!
//! A file name is split into directory, base name, number field, and
//! extension; files sharing a (directory, base, extension) key are grouped
//! into sequences when their number fields carry consistent padding.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::frame::{frame_to_string, is_wildcard, string_to_frame};
use crate::sequence::Sequence;
use crate::SeqResult;

/// The parts of a split file name.
///
/// Concatenating `dir + base + number + extension` reproduces the input
/// exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split<'a> {
    /// Directory portion, up to and including the last path separator.
    pub dir: &'a str,
    /// Base name before the number field.
    pub base: &'a str,
    /// Trailing digit run before the extension; empty if none.
    pub number: &'a str,
    /// Extension including the leading dot; empty if none.
    pub extension: &'a str,
}

/// Splits a file name into directory, base, number field, and extension.
///
/// The number field is the trailing contiguous run of decimal digits
/// immediately before the extension. A name with no trailing digit run has
/// an empty number field. A pure-digit name with no extension splits to an
/// empty base with the whole name as the number field.
///
/// # Example
///
/// ```rust
/// use reel_seq::split;
///
/// let s = split("render/shot.0042.exr");
/// assert_eq!(s.dir, "render/");
/// assert_eq!(s.base, "shot.");
/// assert_eq!(s.number, "0042");
/// assert_eq!(s.extension, ".exr");
/// ```
pub fn split(name: &str) -> Split<'_> {
    let dir_end = name
        .rfind(['/', '\\'])
        .map(|i| i + 1)
        .unwrap_or(0);
    let (dir, file) = name.split_at(dir_end);

    // Extension: last dot, not the first character of the file name.
    let ext_start = match file.rfind('.') {
        Some(0) | None => file.len(),
        Some(i) => i,
    };
    let (stem, extension) = file.split_at(ext_start);

    // Number: trailing digit run of the stem.
    let num_start = stem
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + c_len(stem, i))
        .unwrap_or(0);
    let (base, number) = stem.split_at(num_start);

    Split {
        dir,
        base,
        number,
        extension,
    }
}

fn c_len(s: &str, i: usize) -> usize {
    s[i..].chars().next().map(char::len_utf8).unwrap_or(1)
}

/// What a [`FileInfo`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileKind {
    /// A single file.
    #[default]
    File,
    /// A grouped file sequence.
    Sequence,
    /// A directory.
    Directory,
}

/// A single file or a grouped file sequence.
///
/// Holds the split name parts plus the associated [`Sequence`] (a degenerate
/// one-frame sequence for single numbered files). For any member frame,
/// [`FileInfo::file_name`] reconstructs the original path exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    dir: String,
    base: String,
    number: String,
    extension: String,
    sequence: Sequence,
    kind: FileKind,
}

impl FileInfo {
    /// Creates a `FileInfo` for a single file name.
    pub fn from_name(name: &str) -> Self {
        let parts = split(name);
        let (sequence, number) = match string_to_frame(parts.number) {
            Ok((frame, pad)) => (
                Sequence::from_frames([frame], pad),
                parts.number.to_string(),
            ),
            Err(_) => (Sequence::default(), parts.number.to_string()),
        };
        Self {
            dir: parts.dir.to_string(),
            base: parts.base.to_string(),
            number,
            extension: parts.extension.to_string(),
            sequence,
            kind: FileKind::File,
        }
    }

    /// Creates a `FileInfo` for a directory entry.
    pub fn directory(name: &str) -> Self {
        Self {
            dir: String::new(),
            base: name.to_string(),
            number: String::new(),
            extension: String::new(),
            sequence: Sequence::default(),
            kind: FileKind::Directory,
        }
    }

    /// Returns the directory portion.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// Returns the base name.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the number field. For sequences this is the sequence
    /// notation (`1-3,10####`); empty for non-numbered files.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the extension, including the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the associated sequence.
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Returns the file kind.
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Reconstructs the file name for a member frame.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reel_seq::group;
    ///
    /// let infos = group(["shot.0001.dpx", "shot.0002.dpx"]);
    /// assert_eq!(infos[0].file_name(2), "shot.0002.dpx");
    /// ```
    pub fn file_name(&self, frame: i64) -> String {
        format!(
            "{}{}{}{}",
            self.dir,
            self.base,
            frame_to_string(frame, self.sequence.pad()),
            self.extension
        )
    }

    /// Returns every member file name.
    pub fn file_names(&self) -> Vec<String> {
        if self.sequence.is_empty() {
            vec![format!("{}{}{}{}", self.dir, self.base, self.number, self.extension)]
        } else {
            self.sequence.frames().map(|f| self.file_name(f)).collect()
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.dir, self.base, self.number, self.extension)
    }
}

#[derive(Default)]
struct Cluster {
    frames: Vec<i64>,
    widths: Vec<usize>,
    leading_zero: bool,
    literals: Vec<String>,
}

/// Groups file names into sequences.
///
/// Files sharing a (directory, base, extension) key merge into one
/// [`FileInfo`] when their number fields carry consistent padding:
///
/// - all observed digit widths equal: a padded sequence with that width;
/// - widths differ but no literal has a leading zero: a variable-width
///   sequence with `pad == 0`;
/// - widths differ and a literal has a leading zero (`9` vs `0009`): the
///   padding is ambiguous and the files are listed individually.
///
/// A file whose number field fails to parse is treated as non-sequenced;
/// it never aborts the batch.
///
/// # Example
///
/// ```rust
/// use reel_seq::group;
///
/// let infos = group(["shot.0001.dpx", "shot.0002.dpx", "shot.0003.dpx", "shot.0010.dpx"]);
/// assert_eq!(infos.len(), 1);
/// assert_eq!(infos[0].sequence().pad(), 4);
/// ```
pub fn group<I, S>(names: I) -> Vec<FileInfo>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut order: Vec<(String, String, String)> = Vec::new();
    let mut clusters: HashMap<(String, String, String), Cluster> = HashMap::new();
    let mut plain: Vec<FileInfo> = Vec::new();

    for name in names {
        let name = name.as_ref();
        let parts = split(name);
        if parts.number.is_empty() {
            plain.push(FileInfo::from_name(name));
            continue;
        }
        let (frame, width) = match string_to_frame(parts.number) {
            Ok(v) => v,
            Err(_) => {
                // Number field overflowed; fold into its own entry.
                plain.push(FileInfo::from_name(name));
                continue;
            }
        };
        let key = (
            parts.dir.to_string(),
            parts.base.to_string(),
            parts.extension.to_string(),
        );
        let cluster = clusters.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            Cluster::default()
        });
        cluster.frames.push(frame);
        cluster.widths.push(width);
        cluster.leading_zero |= parts.number.len() > 1 && parts.number.starts_with('0');
        cluster.literals.push(name.to_string());
    }

    let mut out = Vec::new();
    for key in order {
        let cluster = match clusters.remove(&key) {
            Some(c) => c,
            None => continue,
        };
        let uniform = cluster.widths.windows(2).all(|w| w[0] == w[1]);
        if !uniform && cluster.leading_zero {
            // Mixed padding with leading zeros is ambiguous; list each file.
            out.extend(cluster.literals.iter().map(|n| FileInfo::from_name(n)));
            continue;
        }
        let pad = if uniform { cluster.widths[0] } else { 0 };
        let many = cluster.frames.len() > 1;
        let sequence = Sequence::from_frames(cluster.frames, pad);
        let (dir, base, extension) = key;
        out.push(FileInfo {
            dir,
            base,
            number: sequence.to_string(),
            extension,
            sequence,
            kind: if many { FileKind::Sequence } else { FileKind::File },
        });
    }
    out.extend(plain);
    out
}

/// Lists a directory and groups its files into sequences.
///
/// Subdirectories become [`FileKind::Directory`] entries; `.` and `..` are
/// skipped.
pub fn list_dir<P: AsRef<Path>>(path: P) -> SeqResult<Vec<FileInfo>> {
    let mut names: Vec<String> = Vec::new();
    let mut dirs: Vec<FileInfo> = Vec::new();
    for entry in std::fs::read_dir(path.as_ref())? {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(_) => continue,
        };
        if entry.file_type()?.is_dir() {
            dirs.push(FileInfo::directory(&name));
        } else {
            names.push(name);
        }
    }
    names.sort();
    let mut out = group(&names);
    out.append(&mut dirs);
    Ok(out)
}

/// Matches a wildcard template (`name.####.ext`) against grouped entries.
///
/// The `#`-run requires a sequence with exactly that padding width; base
/// name and extension must match literally.
pub fn wildcard_match<'a>(template: &str, items: &'a [FileInfo]) -> Option<&'a FileInfo> {
    let parts = split(template);
    if !is_wildcard(parts.number) {
        return None;
    }
    items.iter().find(|item| {
        item.base() == parts.base
            && item.extension() == parts.extension
            && item.sequence().pad() == parts.number.len()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameRange;

    #[test]
    fn test_split() {
        let s = split("render/shot.0042.exr");
        assert_eq!((s.dir, s.base, s.number, s.extension), ("render/", "shot.", "0042", ".exr"));

        let s = split("shot.exr");
        assert_eq!((s.dir, s.base, s.number, s.extension), ("", "shot", "", ".exr"));

        let s = split("0042");
        assert_eq!((s.dir, s.base, s.number, s.extension), ("", "", "0042", ""));

        let s = split(".hidden");
        assert_eq!((s.dir, s.base, s.number, s.extension), ("", ".hidden", "", ""));

        let s = split("a/b/c100");
        assert_eq!((s.dir, s.base, s.number, s.extension), ("a/b/", "c", "100", ""));
    }

    #[test]
    fn test_split_reconstructs() {
        for name in ["render/shot.0042.exr", "0042", "x.tga", "a/b.1.2.cin"] {
            let s = split(name);
            assert_eq!(format!("{}{}{}{}", s.dir, s.base, s.number, s.extension), name);
        }
    }

    #[test]
    fn test_group_contiguous_ranges() {
        let infos = group([
            "shot.0001.dpx",
            "shot.0002.dpx",
            "shot.0003.dpx",
            "shot.0010.dpx",
        ]);
        assert_eq!(infos.len(), 1);
        let seq = infos[0].sequence();
        assert_eq!(seq.ranges(), &[FrameRange::new(1, 3), FrameRange::single(10)]);
        assert_eq!(seq.pad(), 4);
        assert_eq!(infos[0].kind(), FileKind::Sequence);
    }

    #[test]
    fn test_group_mixed_padding_does_not_merge() {
        let infos = group(["a.9.tga", "a.0009.tga"]);
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|i| i.kind() == FileKind::File));
    }

    #[test]
    fn test_group_variable_width_unpadded() {
        let infos = group(["a.9.tga", "a.10.tga", "a.11.tga"]);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].sequence().pad(), 0);
        assert_eq!(infos[0].sequence().ranges(), &[FrameRange::new(9, 11)]);
    }

    #[test]
    fn test_group_distinct_keys() {
        let infos = group(["a.0001.tga", "b.0001.tga", "a.0001.dpx"]);
        assert_eq!(infos.len(), 3);
    }

    #[test]
    fn test_group_non_numbered() {
        let infos = group(["readme.txt", "shot.0001.dpx"]);
        assert_eq!(infos.len(), 2);
    }

    #[test]
    fn test_group_idempotent() {
        let names = [
            "shot.0001.dpx",
            "shot.0002.dpx",
            "shot.0003.dpx",
            "shot.0010.dpx",
            "plate.99.tga",
            "plate.100.tga",
            "readme.txt",
        ];
        let first = group(names);
        let regrouped = group(first.iter().flat_map(|i| i.file_names()));
        assert_eq!(regrouped, first);
    }

    #[test]
    fn test_file_name_reconstruction() {
        let infos = group(["render/shot.0001.dpx", "render/shot.0002.dpx"]);
        assert_eq!(infos[0].file_name(1), "render/shot.0001.dpx");
        assert_eq!(infos[0].file_name(2), "render/shot.0002.dpx");
    }

    #[test]
    fn test_wildcard_match() {
        let infos = group(["shot.0001.dpx", "shot.0002.dpx", "other.1.tga"]);
        let hit = wildcard_match("shot.####.dpx", &infos);
        assert!(hit.is_some());
        assert_eq!(hit.map(|i| i.base()), Some("shot."));
        assert!(wildcard_match("shot.##.dpx", &infos).is_none());
        assert!(wildcard_match("shot.0001.dpx", &infos).is_none());
    }

    #[test]
    fn test_list_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["seq.0001.tga", "seq.0002.tga", "note.txt"] {
            std::fs::write(dir.path().join(name), b"x").expect("write");
        }
        std::fs::create_dir(dir.path().join("sub")).expect("mkdir");

        let infos = list_dir(dir.path()).expect("list");
        assert_eq!(infos.len(), 3);
        assert!(infos.iter().any(|i| i.kind() == FileKind::Sequence));
        assert!(infos.iter().any(|i| i.kind() == FileKind::Directory));
    }
}
