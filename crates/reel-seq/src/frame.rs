//! Frame numbers, closed frame ranges, and padded string forms.
//!
//! Frame numbers are 64-bit signed integers. A padded string form carries a
//! fixed digit width, so `"0007"` parses to frame `7` with padding `4` and
//! renders back to `"0007"` given the same padding.

use std::fmt;

use crate::{SeqError, SeqResult};

/// A closed range of frame numbers.
///
/// Represents a contiguous range from start to end (inclusive).
///
/// # Example
///
/// ```rust
/// use reel_seq::FrameRange;
///
/// let range = FrameRange::new(1001, 1100);
/// assert_eq!(range.start(), 1001);
/// assert_eq!(range.end(), 1100);
/// assert_eq!(range.len(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRange {
    start: i64,
    end: i64,
}

impl FrameRange {
    /// Creates a new frame range. Reversed bounds are normalized.
    pub fn new(start: i64, end: i64) -> Self {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        Self { start, end }
    }

    /// Creates a range for a single frame.
    pub fn single(frame: i64) -> Self {
        Self::new(frame, frame)
    }

    /// Returns the start frame.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Returns the end frame.
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Returns the number of frames in the range, saturating at
    /// `usize::MAX` for ranges too wide to count.
    pub fn len(&self) -> usize {
        let span = self.end.abs_diff(self.start).saturating_add(1);
        usize::try_from(span).unwrap_or(usize::MAX)
    }

    /// Returns true if the range contains no frames.
    pub fn is_empty(&self) -> bool {
        false // A valid range always has at least one frame
    }

    /// Returns true if the range contains the given frame.
    pub fn contains(&self, frame: i64) -> bool {
        frame >= self.start && frame <= self.end
    }

    /// Returns an iterator over all frame numbers.
    pub fn iter(&self) -> impl Iterator<Item = i64> {
        self.start..=self.end
    }

    /// Extends the range to include the given frame.
    pub(crate) fn extend(&mut self, frame: i64) {
        if frame < self.start {
            self.start = frame;
        }
        if frame > self.end {
            self.end = frame;
        }
    }

    /// Merges with another range if they overlap or are adjacent.
    pub fn merge(&self, other: &FrameRange) -> Option<FrameRange> {
        if self.end.saturating_add(1) >= other.start && other.end.saturating_add(1) >= self.start {
            Some(FrameRange::new(
                self.start.min(other.start),
                self.end.max(other.end),
            ))
        } else {
            None
        }
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl IntoIterator for FrameRange {
    type Item = i64;
    type IntoIter = std::ops::RangeInclusive<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..=self.end
    }
}

/// Renders a frame number zero-padded to `pad` digits.
///
/// No padding is applied when `pad` is zero or the natural width already
/// meets it. Negative frames render as `-` followed by the padded magnitude.
///
/// # Example
///
/// ```rust
/// use reel_seq::frame_to_string;
///
/// assert_eq!(frame_to_string(7, 4), "0007");
/// assert_eq!(frame_to_string(1234, 4), "1234");
/// assert_eq!(frame_to_string(-7, 4), "-0007");
/// assert_eq!(frame_to_string(42, 0), "42");
/// ```
pub fn frame_to_string(frame: i64, pad: usize) -> String {
    let digits = format!("{:0>width$}", frame.unsigned_abs(), width = pad);
    if frame < 0 {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Parses a frame number and reports its literal digit width.
///
/// The width excludes any sign and is used upstream for padding-consistency
/// checks. Values outside the 64-bit signed range fail with
/// [`SeqError::Parse`].
///
/// # Example
///
/// ```rust
/// use reel_seq::string_to_frame;
///
/// assert_eq!(string_to_frame("0007").unwrap(), (7, 4));
/// assert_eq!(string_to_frame("-12").unwrap(), (-12, 2));
/// ```
pub fn string_to_frame(s: &str) -> SeqResult<(i64, usize)> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SeqError::Parse(format!("invalid frame number: {:?}", s)));
    }
    let magnitude: u64 = digits
        .parse()
        .map_err(|_| SeqError::Parse(format!("frame number out of range: {:?}", s)))?;
    let frame = if negative {
        i64::try_from(magnitude)
            .map(|v| -v)
            .map_err(|_| SeqError::Parse(format!("frame number out of range: {:?}", s)))?
    } else {
        i64::try_from(magnitude)
            .map_err(|_| SeqError::Parse(format!("frame number out of range: {:?}", s)))?
    };
    Ok((frame, digits.len()))
}

/// Returns true if the string is a padding wildcard.
///
/// A wildcard is a non-empty run of `#` characters, meaning "exactly this
/// many padding digits, value unspecified".
pub fn is_wildcard(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b == b'#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_range() {
        let range = FrameRange::new(1001, 1100);
        assert_eq!(range.start(), 1001);
        assert_eq!(range.end(), 1100);
        assert_eq!(range.len(), 100);
        assert!(range.contains(1050));
        assert!(!range.contains(1000));
    }

    #[test]
    fn test_frame_range_extreme_len() {
        assert_eq!(FrameRange::new(i64::MIN, i64::MAX).len(), usize::MAX);
        assert_eq!(FrameRange::new(i64::MIN, i64::MIN).len(), 1);
        assert_eq!(FrameRange::single(5).len(), 1);
    }

    #[test]
    fn test_frame_range_reverse() {
        let range = FrameRange::new(100, 1);
        assert_eq!(range.start(), 1);
        assert_eq!(range.end(), 100);
    }

    #[test]
    fn test_frame_range_merge() {
        let r1 = FrameRange::new(1, 10);
        let r2 = FrameRange::new(11, 20);
        let r3 = FrameRange::new(30, 40);

        assert_eq!(r1.merge(&r2), Some(FrameRange::new(1, 20)));
        assert!(r1.merge(&r3).is_none());
    }

    #[test]
    fn test_frame_to_string() {
        assert_eq!(frame_to_string(7, 4), "0007");
        assert_eq!(frame_to_string(1234, 4), "1234");
        assert_eq!(frame_to_string(12345, 4), "12345");
        assert_eq!(frame_to_string(0, 0), "0");
        assert_eq!(frame_to_string(-7, 4), "-0007");
    }

    #[test]
    fn test_string_to_frame() {
        assert_eq!(string_to_frame("0007").unwrap(), (7, 4));
        assert_eq!(string_to_frame("100").unwrap(), (100, 3));
        assert_eq!(string_to_frame("-0009").unwrap(), (-9, 4));
        assert!(string_to_frame("").is_err());
        assert!(string_to_frame("12a").is_err());
        assert!(string_to_frame("99999999999999999999999").is_err());
    }

    #[test]
    fn test_padded_round_trip() {
        for s in ["0007", "100", "0000", "-0042"] {
            let (frame, pad) = string_to_frame(s).unwrap();
            assert_eq!(frame_to_string(frame, pad), s);
        }
    }

    #[test]
    fn test_is_wildcard() {
        assert!(is_wildcard("#"));
        assert!(is_wildcard("####"));
        assert!(!is_wildcard(""));
        assert!(!is_wildcard("#4#"));
        assert!(!is_wildcard("0001"));
    }
}
