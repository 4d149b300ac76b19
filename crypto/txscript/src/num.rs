use hnsd_txscript_errors::ScriptError;
use std::mem::size_of;

/// A script-encoded integer: little-endian, sign-magnitude, minimally sized.
/// Widened from the 32-bit range the upstream interpreter this engine is
/// descended from used, since name-auction values and lock heights
/// routinely exceed `i32::MAX`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct ScriptNum(pub i64);

impl ScriptNum {
    /// Parses `bytes` as a `ScriptNum`, rejecting encodings longer than
    /// `size_limit` bytes. Callers pick the limit per opcode (most script
    /// arithmetic uses 4 bytes of range; a handful of opcodes need wider
    /// limits for name-auction bid amounts and lock heights). When `minimal`
    /// is set, also rejects encodings with a redundant top byte: a trailing
    /// zero byte (or `0x80`, for negative zero) whose predecessor doesn't
    /// itself carry the sign bit.
    pub fn deserialize(bytes: &[u8], minimal: bool, size_limit: usize) -> Result<Self, ScriptError> {
        if bytes.len() > size_limit {
            return Err(ScriptError::NumberTooBig(bytes.to_vec(), size_limit));
        }
        if bytes.is_empty() {
            return Ok(ScriptNum(0));
        }
        if minimal {
            let last = bytes[bytes.len() - 1];
            if last & 0x7f == 0 && (bytes.len() == 1 || bytes[bytes.len() - 2] & 0x80 == 0) {
                return Err(ScriptError::MinimalData(bytes.len()));
            }
        }
        let msb = bytes[bytes.len() - 1];
        let sign: i64 = if msb & 0x80 != 0 { -1 } else { 1 };
        let first_byte = (msb & 0x7f) as i64;
        let magnitude = bytes[..bytes.len() - 1]
            .iter()
            .rev()
            .fold(first_byte, |accum, &b| (accum << 8) + b as i64);
        Ok(ScriptNum(sign * magnitude))
    }

    pub fn serialize(self) -> Vec<u8> {
        let sign = self.0.signum();
        let mut magnitude = self.0.unsigned_abs();
        let mut out = Vec::with_capacity(size_of::<i64>());
        while magnitude > 0 {
            out.push((magnitude & 0xff) as u8);
            magnitude >>= 8;
        }
        if let Some(&last) = out.last() {
            if last & 0x80 != 0 {
                out.push(if sign < 0 { 0x80 } else { 0x00 });
            } else if sign < 0 {
                *out.last_mut().unwrap() |= 0x80;
            }
        }
        out
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }

    pub fn as_bool(self) -> bool {
        self.0 != 0
    }
}

impl From<i64> for ScriptNum {
    fn from(value: i64) -> Self {
        ScriptNum(value)
    }
}

impl From<bool> for ScriptNum {
    fn from(value: bool) -> Self {
        ScriptNum(if value { 1 } else { 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for v in [0i64, 1, -1, 127, -127, 128, -128, 255, -255, 65535, -65535, 1 << 40, -(1 << 40)] {
            let n = ScriptNum(v);
            let bytes = n.serialize();
            let back = ScriptNum::deserialize(&bytes, true, 8).unwrap();
            assert_eq!(back.as_i64(), v, "round trip failed for {v}");
        }
    }

    #[test]
    fn test_size_limit_enforced() {
        let n = ScriptNum(1 << 40);
        let bytes = n.serialize();
        assert!(ScriptNum::deserialize(&bytes, true, 4).is_err());
        assert!(ScriptNum::deserialize(&bytes, true, 8).is_ok());
    }

    #[test]
    fn test_bool_conversion() {
        assert!(!ScriptNum(0).as_bool());
        assert!(ScriptNum(1).as_bool());
        assert!(ScriptNum(-1).as_bool());
    }

    #[test]
    fn test_non_minimal_encoding_rejected() {
        // 0x01 0x00 encodes the same value as 0x01 but with a redundant
        // trailing zero byte; only rejected when `minimal` is required.
        let non_minimal = vec![0x01, 0x00];
        assert!(ScriptNum::deserialize(&non_minimal, true, 8).is_err());
        assert!(ScriptNum::deserialize(&non_minimal, false, 8).is_ok());
    }

    #[test]
    fn test_minimal_allows_sign_bit_continuation() {
        // 0xff 0x00 is the minimal encoding of 255: the top byte alone
        // (0xff) would have its sign bit set, so the 0x00 continuation is
        // required, not redundant.
        let minimal = vec![0xff, 0x00];
        assert!(ScriptNum::deserialize(&minimal, true, 8).is_ok());
    }
}
