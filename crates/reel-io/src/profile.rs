//! Color profiles carried by film-originated headers.

use std::fmt;

/// Film print reference points: printing density black/white code values,
/// display gamma, and highlight soft clip. Code values are on the 10-bit
/// scale regardless of the stored bit depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilmPrint {
    /// Black reference code value.
    pub black: f32,
    /// White reference code value.
    pub white: f32,
    /// Display gamma.
    pub gamma: f32,
    /// Highlight soft clip width in code values; 0 disables.
    pub soft_clip: f32,
}

impl Default for FilmPrint {
    fn default() -> Self {
        Self {
            black: 95.0,
            white: 685.0,
            gamma: 1.7,
            soft_clip: 0.0,
        }
    }
}

/// How pixel code values are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ColorProfile {
    /// No transform; code values are used as-is.
    #[default]
    Raw,
    /// Logarithmic printing density (Cineon/DPX film scans).
    FilmPrint(FilmPrint),
}

impl fmt::Display for ColorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorProfile::Raw => write!(f, "raw"),
            ColorProfile::FilmPrint(fp) => write!(
                f,
                "film print (black {}, white {}, gamma {})",
                fp.black, fp.white, fp.gamma
            ),
        }
    }
}
