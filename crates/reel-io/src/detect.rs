//! Format detection and header dispatch.
//!
//! A closed, compile-time set of format handlers selected by magic-byte
//! sniffing with a file-extension fallback. Targa and RLA define no magic
//! and resolve by extension alone.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::info::Info;
use crate::{IoError, IoResult};

/// The recognized file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Kodak Cineon film scans.
    Cineon,
    /// SMPTE DPX.
    Dpx,
    /// SGI images.
    Sgi,
    /// Truevision Targa.
    Targa,
    /// Wavefront RLA/RPF.
    Rla,
    /// Portable FloatMap.
    Pfm,
    /// OpenEXR.
    Exr,
}

/// Every format, in probe order.
pub const FORMATS: &[FormatKind] = &[
    FormatKind::Cineon,
    FormatKind::Dpx,
    FormatKind::Sgi,
    FormatKind::Targa,
    FormatKind::Rla,
    FormatKind::Pfm,
    FormatKind::Exr,
];

impl FormatKind {
    /// Returns the format name.
    pub fn name(self) -> &'static str {
        match self {
            FormatKind::Cineon => "Cineon",
            FormatKind::Dpx => "DPX",
            FormatKind::Sgi => "SGI",
            FormatKind::Targa => "Targa",
            FormatKind::Rla => "RLA",
            FormatKind::Pfm => "PFM",
            FormatKind::Exr => "OpenEXR",
        }
    }

    /// Returns the file extensions claimed by this format, without dots.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FormatKind::Cineon => &["cin"],
            FormatKind::Dpx => &["dpx"],
            FormatKind::Sgi => &["sgi", "rgba", "rgb", "bw"],
            FormatKind::Targa => &["tga"],
            FormatKind::Rla => &["rla", "rpf"],
            FormatKind::Pfm => &["pfm"],
            FormatKind::Exr => &["exr"],
        }
    }

    /// Looks up a format by file extension, case-insensitive.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        FORMATS
            .iter()
            .copied()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }

    /// Identifies a format from leading file bytes.
    ///
    /// Targa and RLA carry no magic and never match here.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        match &bytes[0..4] {
            [0x80, 0x2A, 0x5F, 0xD7] | [0xD7, 0x5F, 0x2A, 0x80] => Some(FormatKind::Cineon),
            b"SDPX" | b"XPDS" => Some(FormatKind::Dpx),
            [0x01, 0xDA, _, _] => Some(FormatKind::Sgi),
            [0x76, 0x2F, 0x31, 0x01] => Some(FormatKind::Exr),
            [b'P', c, w, _] if (*c == b'F' || *c == b'f') && w.is_ascii_whitespace() => {
                Some(FormatKind::Pfm)
            }
            _ => None,
        }
    }

    /// Identifies a format from leading bytes, falling back to the path's
    /// extension for magic-less formats.
    pub fn probe(path: &Path, bytes: &[u8]) -> Option<Self> {
        Self::sniff(bytes).or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(Self::from_extension)
        })
    }
}

/// Opens a file, identifies its format, and decodes its header into an
/// [`Info`].
///
/// Fails with [`IoError::Format`] when neither the leading bytes nor the
/// extension identify a format, and with the underlying codec's error
/// otherwise. OpenEXR files are identified but their header decoding
/// belongs to an EXR library, not this layer.
pub fn read_info<P: AsRef<Path>>(path: P) -> IoResult<Info> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let mut magic = [0u8; 4];
    let got = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    let kind = FormatKind::probe(path, &magic[..got]).ok_or_else(|| {
        IoError::Format(format!("unrecognized format: {}", path.display()))
    })?;
    debug!(format = kind.name(), path = %path.display(), "reading header");

    match kind {
        #[cfg(feature = "cineon")]
        FormatKind::Cineon => Ok(crate::cineon::read(&mut file)?.1),
        #[cfg(feature = "dpx")]
        FormatKind::Dpx => Ok(crate::dpx::read(&mut file)?.1),
        #[cfg(feature = "sgi")]
        FormatKind::Sgi => Ok(crate::sgi::read(&mut file)?.1),
        #[cfg(feature = "targa")]
        FormatKind::Targa => Ok(crate::targa::read(&mut file)?.1),
        #[cfg(feature = "rla")]
        FormatKind::Rla => Ok(crate::rla::read(&mut file)?.1),
        #[cfg(feature = "pfm")]
        FormatKind::Pfm => Ok(crate::pfm::read(&mut file)?.1),
        FormatKind::Exr => Err(IoError::Unsupported(
            "OpenEXR header decoding requires an EXR library".into(),
        )),
        #[allow(unreachable_patterns)]
        other => Err(IoError::Unsupported(format!(
            "{} support is not compiled in",
            other.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(FormatKind::from_extension("dpx"), Some(FormatKind::Dpx));
        assert_eq!(FormatKind::from_extension(".DPX"), Some(FormatKind::Dpx));
        assert_eq!(FormatKind::from_extension("rgb"), Some(FormatKind::Sgi));
        assert_eq!(FormatKind::from_extension("rpf"), Some(FormatKind::Rla));
        assert_eq!(FormatKind::from_extension("txt"), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(FormatKind::sniff(b"SDPX...."), Some(FormatKind::Dpx));
        assert_eq!(FormatKind::sniff(b"XPDS...."), Some(FormatKind::Dpx));
        assert_eq!(
            FormatKind::sniff(&[0x80, 0x2A, 0x5F, 0xD7]),
            Some(FormatKind::Cineon)
        );
        assert_eq!(
            FormatKind::sniff(&[0x01, 0xDA, 0x00, 0x01]),
            Some(FormatKind::Sgi)
        );
        assert_eq!(
            FormatKind::sniff(&[0x76, 0x2F, 0x31, 0x01]),
            Some(FormatKind::Exr)
        );
        assert_eq!(FormatKind::sniff(b"PF\n1"), Some(FormatKind::Pfm));
        assert_eq!(FormatKind::sniff(b"Pf\n1"), Some(FormatKind::Pfm));
        assert_eq!(FormatKind::sniff(b"PNG\x00"), None);
        assert_eq!(FormatKind::sniff(b"SD"), None);
    }

    #[test]
    fn test_probe_extension_fallback() {
        // Targa has no magic; only the extension identifies it.
        let zeros = [0u8; 4];
        assert_eq!(
            FormatKind::probe(Path::new("frame.tga"), &zeros),
            Some(FormatKind::Targa)
        );
        assert_eq!(
            FormatKind::probe(Path::new("frame.rla"), &zeros),
            Some(FormatKind::Rla)
        );
        assert_eq!(FormatKind::probe(Path::new("frame.xyz"), &zeros), None);
        // Magic wins over a mismatched extension.
        assert_eq!(
            FormatKind::probe(Path::new("frame.tga"), b"SDPX"),
            Some(FormatKind::Dpx)
        );
    }

    #[cfg(feature = "targa")]
    #[test]
    fn test_read_info_from_file() {
        use crate::binary::Endian;
        use crate::info::{PixelLayout, PixelType};

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.0001.tga");

        let mut layout = PixelLayout::new(3, PixelType::U8);
        layout.endian = Endian::Little;
        layout.bgr = true;
        let info = crate::info::Info::new(32, 16, layout);
        let mut file = File::create(&path).expect("create");
        crate::targa::write(&mut file, &info).expect("write");
        drop(file);

        let loaded = read_info(&path).expect("read_info");
        assert_eq!(loaded, info);
    }

    #[test]
    fn test_read_info_unrecognized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note.txt");
        std::fs::write(&path, b"hello").expect("write");
        assert!(matches!(read_info(&path), Err(IoError::Format(_))));
    }
}
