//! Compact-size variable-length integer encoding used by the transaction
//! wire format.

use std::io::{self, Read, Write};

/// Writes `value` as a compact-size varint: 1 byte for `< 0xfd`, a `0xfd`
/// marker plus 2 bytes for `<= u16::MAX`, `0xfe` plus 4 bytes for
/// `<= u32::MAX`, otherwise `0xff` plus 8 bytes. All multi-byte forms are
/// little-endian.
pub fn write_varint<W: Write>(mut w: W, value: u64) -> io::Result<()> {
    if value < 0xfd {
        w.write_all(&[value as u8])
    } else if value <= u16::MAX as u64 {
        w.write_all(&[0xfd])?;
        w.write_all(&(value as u16).to_le_bytes())
    } else if value <= u32::MAX as u64 {
        w.write_all(&[0xfe])?;
        w.write_all(&(value as u32).to_le_bytes())
    } else {
        w.write_all(&[0xff])?;
        w.write_all(&value.to_le_bytes())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VarIntError {
    #[error("unexpected end of buffer while decoding varint")]
    Eof,
    #[error("non-canonical varint encoding")]
    NonCanonical,
}

/// Reads a compact-size varint, rejecting non-canonical encodings (a marker
/// byte used where a shorter form would have sufficed).
pub fn read_varint<R: Read>(mut r: R) -> Result<u64, VarIntError> {
    let mut marker = [0u8; 1];
    r.read_exact(&mut marker).map_err(|_| VarIntError::Eof)?;
    Ok(match marker[0] {
        0xff => {
            let mut buf = [0u8; 8];
            r.read_exact(&mut buf).map_err(|_| VarIntError::Eof)?;
            let value = u64::from_le_bytes(buf);
            if value <= u32::MAX as u64 {
                return Err(VarIntError::NonCanonical);
            }
            value
        }
        0xfe => {
            let mut buf = [0u8; 4];
            r.read_exact(&mut buf).map_err(|_| VarIntError::Eof)?;
            let value = u32::from_le_bytes(buf) as u64;
            if value <= u16::MAX as u64 {
                return Err(VarIntError::NonCanonical);
            }
            value
        }
        0xfd => {
            let mut buf = [0u8; 2];
            r.read_exact(&mut buf).map_err(|_| VarIntError::Eof)?;
            let value = u16::from_le_bytes(buf) as u64;
            if value < 0xfd {
                return Err(VarIntError::NonCanonical);
            }
            value
        }
        b => b as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: u64) {
        let mut buf = Vec::new();
        write_varint(&mut buf, value).unwrap();
        let decoded = read_varint(&buf[..]).unwrap();
        assert_eq!(decoded, value, "round trip failed for {value}");
    }

    #[test]
    fn test_round_trip_boundaries() {
        for v in [0u64, 1, 0xfc, 0xfd, 0xfe, 0xffff, 0x10000, u32::MAX as u64, u32::MAX as u64 + 1, u64::MAX] {
            round_trip(v);
        }
    }

    #[test]
    fn test_rejects_non_canonical() {
        // 0xfd marker followed by a value that fits in one byte
        assert_eq!(read_varint(&[0xfd, 0x01, 0x00][..]), Err(VarIntError::NonCanonical));
        assert_eq!(read_varint(&[0xfe, 0x01, 0x00, 0x00, 0x00][..]), Err(VarIntError::NonCanonical));
    }

    #[test]
    fn test_eof() {
        assert_eq!(read_varint(&[0xfd, 0x01][..]), Err(VarIntError::Eof));
        assert_eq!(read_varint(&[][..]), Err(VarIntError::Eof));
    }
}
