//! Frame sequences: sorted, disjoint closed ranges plus a padding width.

use std::fmt;
use std::str::FromStr;

use crate::frame::FrameRange;
use crate::{SeqError, SeqResult, string_to_frame};

/// A set of frame numbers as sorted, disjoint closed ranges, plus the
/// zero-padding width used to render frame numbers in file names.
///
/// A `pad` of zero means no fixed width was observed. Adjacent and
/// overlapping ranges are merged on insertion, so the range list is always
/// sorted by start frame and non-adjacent.
///
/// # Example
///
/// ```rust
/// use reel_seq::{FrameRange, Sequence};
///
/// let mut seq = Sequence::new(4);
/// seq.add(FrameRange::new(1, 3));
/// seq.add(FrameRange::single(10));
/// assert_eq!(seq.to_string(), "1-3,10####");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    ranges: Vec<FrameRange>,
    pad: usize,
}

impl Sequence {
    /// Creates an empty sequence with the given padding width.
    pub fn new(pad: usize) -> Self {
        Self {
            ranges: Vec::new(),
            pad,
        }
    }

    /// Builds a sequence from individual frame numbers.
    ///
    /// Runs of consecutive frames collapse into single ranges; duplicates
    /// are ignored.
    pub fn from_frames<I: IntoIterator<Item = i64>>(frames: I, pad: usize) -> Self {
        let mut frames: Vec<i64> = frames.into_iter().collect();
        frames.sort_unstable();
        frames.dedup();

        let mut ranges: Vec<FrameRange> = Vec::new();
        for frame in frames {
            match ranges.last_mut() {
                Some(last) if frame == last.end().saturating_add(1) => last.extend(frame),
                _ => ranges.push(FrameRange::single(frame)),
            }
        }
        Self { ranges, pad }
    }

    /// Adds a range, merging it with any overlapping or adjacent ranges.
    pub fn add(&mut self, range: FrameRange) {
        self.ranges.push(range);
        self.normalize();
    }

    /// Returns the ranges, sorted by start frame.
    pub fn ranges(&self) -> &[FrameRange] {
        &self.ranges
    }

    /// Returns the padding width. Zero means variable width.
    pub fn pad(&self) -> usize {
        self.pad
    }

    /// Returns the first frame, if any.
    pub fn start(&self) -> Option<i64> {
        self.ranges.first().map(|r| r.start())
    }

    /// Returns the last frame, if any.
    pub fn end(&self) -> Option<i64> {
        self.ranges.last().map(|r| r.end())
    }

    /// Returns the total number of frames across all ranges.
    pub fn len(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    /// Returns true if the sequence holds no frames.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns true if any range contains the frame.
    pub fn contains(&self, frame: i64) -> bool {
        self.ranges.iter().any(|r| r.contains(frame))
    }

    /// Returns an iterator over every frame number, in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = i64> + '_ {
        self.ranges.iter().flat_map(|r| r.iter())
    }

    fn normalize(&mut self) {
        self.ranges.sort_by_key(|r| r.start());
        let mut merged: Vec<FrameRange> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) => match last.merge(&range) {
                    Some(m) => *last = m,
                    None => merged.push(range),
                },
                None => merged.push(range),
            }
        }
        self.ranges = merged;
    }
}

impl fmt::Display for Sequence {
    /// Renders the boundary notation: comma-separated ranges followed by a
    /// `#`-run equal to the padding width, e.g. `1-3,10####`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", range)?;
        }
        for _ in 0..self.pad {
            write!(f, "#")?;
        }
        Ok(())
    }
}

impl FromStr for Sequence {
    type Err = SeqError;

    /// Parses the boundary notation produced by `Display`.
    ///
    /// A trailing `#`-run sets the padding width explicitly. Without one,
    /// the padding is inferred from the literal digit widths: a common
    /// width with at least one leading zero fixes the padding, anything
    /// else leaves it variable.
    fn from_str(s: &str) -> SeqResult<Self> {
        let trimmed = s.trim_end_matches('#');
        let explicit_pad = s.len() - trimmed.len();

        if trimmed.is_empty() {
            return Ok(Sequence::new(explicit_pad));
        }

        let mut ranges = Vec::new();
        let mut widths = Vec::new();
        let mut leading_zero = false;
        for token in trimmed.split(',') {
            let (a, b) = split_range_token(token)?;
            let (start, wa) = string_to_frame(a)?;
            widths.push(wa);
            leading_zero |= has_leading_zero(a);
            let end = match b {
                Some(b) => {
                    let (end, wb) = string_to_frame(b)?;
                    widths.push(wb);
                    leading_zero |= has_leading_zero(b);
                    end
                }
                None => start,
            };
            ranges.push(FrameRange::new(start, end));
        }

        let pad = if explicit_pad > 0 {
            explicit_pad
        } else if leading_zero && widths.windows(2).all(|w| w[0] == w[1]) {
            widths[0]
        } else {
            0
        };

        let mut seq = Sequence::new(pad);
        for range in ranges {
            seq.add(range);
        }
        Ok(seq)
    }
}

/// Splits a `min-max` token at the separator, honoring negative bounds
/// (`-5--3` splits into `-5` and `-3`).
fn split_range_token(token: &str) -> SeqResult<(&str, Option<&str>)> {
    let bytes = token.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i] == b'-' && bytes[i - 1].is_ascii_digit() {
            return Ok((&token[..i], Some(&token[i + 1..])));
        }
    }
    if token.is_empty() {
        return Err(SeqError::Parse("empty sequence token".into()));
    }
    Ok((token, None))
}

fn has_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.len() > 1 && digits.starts_with('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_adjacent() {
        let mut seq = Sequence::new(0);
        seq.add(FrameRange::new(1, 5));
        seq.add(FrameRange::new(6, 10));
        assert_eq!(seq.ranges(), &[FrameRange::new(1, 10)]);
    }

    #[test]
    fn test_add_merges_overlapping() {
        let mut seq = Sequence::new(0);
        seq.add(FrameRange::new(10, 20));
        seq.add(FrameRange::new(1, 12));
        assert_eq!(seq.ranges(), &[FrameRange::new(1, 20)]);
    }

    #[test]
    fn test_add_keeps_gaps() {
        let mut seq = Sequence::new(0);
        seq.add(FrameRange::single(10));
        seq.add(FrameRange::new(1, 3));
        assert_eq!(
            seq.ranges(),
            &[FrameRange::new(1, 3), FrameRange::single(10)]
        );
    }

    #[test]
    fn test_from_frames() {
        let seq = Sequence::from_frames([3, 1, 2, 10, 2], 4);
        assert_eq!(
            seq.ranges(),
            &[FrameRange::new(1, 3), FrameRange::single(10)]
        );
        assert_eq!(seq.pad(), 4);
        assert_eq!(seq.len(), 4);
        assert!(seq.contains(2));
        assert!(!seq.contains(4));
    }

    #[test]
    fn test_display() {
        let seq = Sequence::from_frames([1, 2, 3, 10], 4);
        assert_eq!(seq.to_string(), "1-3,10####");

        let seq = Sequence::from_frames([5, 6], 0);
        assert_eq!(seq.to_string(), "5-6");
    }

    #[test]
    fn test_parse_round_trip() {
        for (frames, pad) in [
            (vec![1, 2, 3, 10], 4),
            (vec![5], 0),
            (vec![-5, -4, -3], 2),
            (vec![1, 100], 0),
        ] {
            let seq = Sequence::from_frames(frames, pad);
            let parsed: Sequence = seq.to_string().parse().unwrap();
            assert_eq!(parsed, seq);
        }
    }

    #[test]
    fn test_parse_padded_literals() {
        let seq: Sequence = "0001-0100".parse().unwrap();
        assert_eq!(seq.pad(), 4);
        assert_eq!(seq.ranges(), &[FrameRange::new(1, 100)]);

        let seq: Sequence = "1-100".parse().unwrap();
        assert_eq!(seq.pad(), 0);
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Sequence>().is_ok()); // empty sequence
        assert!("a-b".parse::<Sequence>().is_err());
        assert!("1-".parse::<Sequence>().is_err());
    }
}
