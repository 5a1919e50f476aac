//! Timecode and keycode string conversions.
//!
//! SMPTE timecodes are stored in headers as a packed BCD `u32`
//! (`hh:mm:ss:ff`, one nibble per digit). Film keycodes are stored as five
//! integer fields (id, type, prefix, count, offset) and rendered as a
//! colon-separated string.

use crate::{IoError, IoResult};

/// Renders a packed BCD timecode as `hh:mm:ss:ff`.
pub fn timecode_to_string(tc: u32) -> String {
    let d = |shift: u32| (tc >> shift) & 0xF;
    format!(
        "{}{}:{}{}:{}{}:{}{}",
        d(28),
        d(24),
        d(20),
        d(16),
        d(12),
        d(8),
        d(4),
        d(0)
    )
}

/// Parses an `hh:mm:ss:ff` string into a packed BCD timecode.
pub fn timecode_from_string(s: &str) -> IoResult<u32> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 4 {
        return Err(IoError::Parse(format!("invalid timecode: {:?}", s)));
    }
    let mut tc = 0u32;
    for part in parts {
        let value: u32 = part
            .parse()
            .map_err(|_| IoError::Parse(format!("invalid timecode: {:?}", s)))?;
        if value > 99 {
            return Err(IoError::Parse(format!("invalid timecode: {:?}", s)));
        }
        tc = (tc << 8) | ((value / 10) << 4) | (value % 10);
    }
    Ok(tc)
}

/// Renders a film keycode as `id:type:prefix:count:offset`.
pub fn keycode_to_string(id: i32, kind: i32, prefix: i32, count: i32, offset: i32) -> String {
    format!("{}:{}:{}:{}:{}", id, kind, prefix, count, offset)
}

/// Parses an `id:type:prefix:count:offset` keycode string.
pub fn keycode_from_string(s: &str) -> IoResult<(i32, i32, i32, i32, i32)> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 5 {
        return Err(IoError::Parse(format!("invalid keycode: {:?}", s)));
    }
    let mut values = [0i32; 5];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .parse()
            .map_err(|_| IoError::Parse(format!("invalid keycode: {:?}", s)))?;
    }
    Ok((values[0], values[1], values[2], values[3], values[4]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timecode_round_trip() {
        let tc = timecode_from_string("12:34:56:21").unwrap();
        assert_eq!(tc, 0x12345621);
        assert_eq!(timecode_to_string(tc), "12:34:56:21");
    }

    #[test]
    fn test_timecode_errors() {
        assert!(timecode_from_string("12:34:56").is_err());
        assert!(timecode_from_string("aa:bb:cc:dd").is_err());
    }

    #[test]
    fn test_keycode_round_trip() {
        let s = keycode_to_string(1, 2, 3, 4, 5);
        assert_eq!(s, "1:2:3:4:5");
        assert_eq!(keycode_from_string(&s).unwrap(), (1, 2, 3, 4, 5));
    }
}
