//! Script number encoding.
//!
//! Numbers on the stack are little-endian sign-magnitude byte strings: the
//! high bit of the last byte is the sign. Zero is the empty string, and
//! `[0x80]` is a negative zero that decodes to 0. Numeric operands are
//! limited to a few bytes, but results may be wider and stay valid as long
//! as they are not read back as numbers.

use super::error::{InterpreterError, InterpreterErrorCode};

/// Widest encoding that still fits an `i64` magnitude.
const MAX_I64_ENCODING: usize = 8;

/// A decoded script number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ScriptNumber {
    val: i64,
}

impl ScriptNumber {
    pub fn new(val: i64) -> Self {
        ScriptNumber { val }
    }

    /// Parse a stack element as a number.
    ///
    /// `max_len` is the largest accepted encoding in bytes;
    /// `require_minimal` rejects encodings with redundant trailing bytes.
    pub fn from_bytes(
        bb: &[u8],
        max_len: usize,
        require_minimal: bool,
    ) -> Result<Self, InterpreterError> {
        if bb.len() > max_len || bb.len() > MAX_I64_ENCODING {
            return Err(InterpreterError::new(
                InterpreterErrorCode::NumberTooBig,
                format!(
                    "numeric value encoded as {:02x?} is {} bytes which exceeds the max allowed of {}",
                    bb,
                    bb.len(),
                    max_len.min(MAX_I64_ENCODING)
                ),
            ));
        }

        if require_minimal {
            check_minimal_data_encoding(bb)?;
        }

        let last = match bb.last() {
            Some(&b) => b,
            None => return Ok(ScriptNumber::default()),
        };

        let mut magnitude: u64 = 0;
        for (i, &b) in bb.iter().enumerate() {
            let b = if i == bb.len() - 1 { b & 0x7f } else { b };
            magnitude |= u64::from(b) << (8 * i);
        }

        // An 8-byte encoding has at most 63 magnitude bits.
        let val = magnitude as i64;
        Ok(ScriptNumber {
            val: if last & 0x80 != 0 { -val } else { val },
        })
    }

    /// Encode as minimal sign-magnitude little-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.val == 0 {
            return Vec::new();
        }

        let negative = self.val < 0;
        let mut abs = self.val.unsigned_abs();
        let mut result = Vec::with_capacity(9);
        while abs > 0 {
            result.push((abs & 0xff) as u8);
            abs >>= 8;
        }

        let last = result.len() - 1;
        if result[last] & 0x80 != 0 {
            result.push(if negative { 0x80 } else { 0x00 });
        } else if negative {
            result[last] |= 0x80;
        }
        result
    }

    pub fn value(&self) -> i64 {
        self.val
    }

    pub fn is_zero(&self) -> bool {
        self.val == 0
    }

    /// Convert to i32, clamping to [i32::MIN, i32::MAX] on overflow.
    pub fn to_i32(&self) -> i32 {
        self.val.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

impl From<i64> for ScriptNumber {
    fn from(val: i64) -> Self {
        ScriptNumber::new(val)
    }
}

/// Check that a byte array uses minimal data encoding.
pub fn check_minimal_data_encoding(v: &[u8]) -> Result<(), InterpreterError> {
    let last = match v.last() {
        Some(&b) => b,
        None => return Ok(()),
    };

    // A trailing 0x00 or 0x80 is only needed when the byte before it has
    // its high bit set.
    if last & 0x7f == 0 && (v.len() == 1 || v[v.len() - 2] & 0x80 == 0) {
        return Err(InterpreterError::new(
            InterpreterErrorCode::MinimalData,
            format!("numeric value encoded as {:02x?} is not minimally encoded", v),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_to_bytes(s: &str) -> Vec<u8> {
        hex::decode(s).expect("valid hex")
    }

    #[test]
    fn test_script_num_bytes() {
        let tests: Vec<(i64, &str)> = vec![
            (0, ""),
            (1, "01"),
            (-1, "81"),
            (127, "7f"),
            (-127, "ff"),
            (128, "8000"),
            (-128, "8080"),
            (129, "8100"),
            (-129, "8180"),
            (256, "0001"),
            (-256, "0081"),
            (32767, "ff7f"),
            (-32767, "ffff"),
            (32768, "008000"),
            (-32768, "008080"),
            (65535, "ffff00"),
            (-65535, "ffff80"),
            (8388608, "00008000"),
            (-8388608, "00008080"),
            (2147483647, "ffffff7f"),
            (-2147483647, "ffffffff"),
            // Wider than an operand but valid as a result
            (2147483648, "0000008000"),
            (-2147483648, "0000008080"),
            (4294967295, "ffffffff00"),
            (-4294967296, "0000000081"),
            (9223372036854775807, "ffffffffffffff7f"),
            (-9223372036854775807, "ffffffffffffffff"),
        ];

        for (num, expected) in &tests {
            let got = ScriptNumber::new(*num).to_bytes();
            assert_eq!(got, hex_to_bytes(expected), "to_bytes({})", num);
        }
    }

    /// i64::MIN has no positive counterpart; its encoding needs a ninth byte.
    #[test]
    fn test_min_value_encodes() {
        let got = ScriptNumber::new(i64::MIN).to_bytes();
        assert_eq!(got, hex_to_bytes("000000000000008080"));
    }

    #[test]
    fn test_from_bytes() {
        // (encoding, value, max_len, minimal, expect_err)
        let tests: Vec<(&str, i64, usize, bool, bool)> = vec![
            ("80", 0, 4, true, true),
            ("", 0, 4, true, false),
            ("01", 1, 4, true, false),
            ("81", -1, 4, true, false),
            ("7f", 127, 4, true, false),
            ("ff", -127, 4, true, false),
            ("8000", 128, 4, true, false),
            ("8080", -128, 4, true, false),
            ("0081", -256, 4, true, false),
            ("ffffff7f", 2147483647, 4, true, false),
            ("ffffffff", -2147483647, 4, true, false),
            ("ffffffff7f", 549755813887, 5, true, false),
            ("ffffffffff", -549755813887, 5, true, false),
            ("0000008000", 0, 4, true, true),
            ("00", 0, 4, true, true),
            ("0100", 0, 4, true, true),
            ("00", 0, 4, false, false),
            ("80", 0, 4, false, false),
            ("0100", 1, 4, false, false),
            ("000000000000000001", 0, 9, false, true),
        ];

        for (enc, num, max_len, minimal, expect_err) in tests {
            let result = ScriptNumber::from_bytes(&hex_to_bytes(enc), max_len, minimal);
            match result {
                Ok(sn) => {
                    assert!(!expect_err, "from_bytes({}): expected error", enc);
                    assert_eq!(sn.value(), num, "from_bytes({})", enc);
                }
                Err(_) => assert!(expect_err, "from_bytes({}): unexpected error", enc),
            }
        }
    }

    #[test]
    fn test_too_big_code() {
        let err = ScriptNumber::from_bytes(&[1, 2, 3, 4, 5], 4, false).expect_err("too big");
        assert_eq!(err.code, InterpreterErrorCode::NumberTooBig);
        let err = ScriptNumber::from_bytes(&[0x00], 4, true).expect_err("non-minimal");
        assert_eq!(err.code, InterpreterErrorCode::MinimalData);
    }

    #[test]
    fn test_to_i32_clamps() {
        let tests: Vec<(i64, i32)> = vec![
            (0, 0),
            (-1, -1),
            (2147483647, 2147483647),
            (-2147483648, -2147483648),
            (2147483648, 2147483647),
            (-2147483649, -2147483648),
            (i64::MAX, i32::MAX),
            (i64::MIN, i32::MIN),
        ];
        for (input, want) in tests {
            assert_eq!(ScriptNumber::new(input).to_i32(), want, "to_i32({})", input);
        }
    }
}
