//! Minimal script assembler used by tests and by witness synthesis
//! (`DUP BLAKE160 <hash> EQUALVERIFY CHECKSIG`).

use crate::num::ScriptNum;
use crate::opcodes::*;

#[derive(Default, Clone)]
pub struct ScriptBuilder(Vec<u8>);

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_op(mut self, op: u8) -> Self {
        self.0.push(op);
        self
    }

    /// Pushes arbitrary data, picking the shortest canonical push opcode.
    pub fn add_data(mut self, data: &[u8]) -> Self {
        let len = data.len();
        if len <= OP_DATA_MAX as usize {
            if len == 0 {
                self.0.push(OP_FALSE);
                return self;
            }
            self.0.push(len as u8);
        } else if len <= u8::MAX as usize {
            self.0.push(OP_PUSHDATA1);
            self.0.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.0.push(OP_PUSHDATA2);
            self.0.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.0.push(OP_PUSHDATA4);
            self.0.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.0.extend_from_slice(data);
        self
    }

    /// Pushes a small integer using `OP_1NEGATE`/`OP_FALSE`/`OP_1..OP_16`
    /// when possible, falling back to a minimal-encoded data push.
    pub fn add_i64(self, value: i64) -> Self {
        match value {
            0 => self.add_op(OP_FALSE),
            -1 => self.add_op(OP_1NEGATE),
            1..=16 => self.add_op(OP_TRUE + (value - 1) as u8),
            _ => self.add_data(&ScriptNum(value).serialize()),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Synthesizes the canonical P2PKH-equivalent redeem script for a 20-byte
/// witness-program hash: `DUP BLAKE160 <hash> EQUALVERIFY CHECKSIG`.
pub fn p2pkh_script(hash20: &[u8]) -> Vec<u8> {
    ScriptBuilder::new().add_op(OP_DUP).add_op(OP_BLAKE160).add_data(hash20).add_op(OP_EQUALVERIFY).add_op(OP_CHECKSIG).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_int_roundtrip_through_push() {
        for v in [-1i64, 0, 1, 16] {
            let script = ScriptBuilder::new().add_i64(v).into_bytes();
            assert_eq!(script.len(), 1);
        }
    }

    #[test]
    fn test_p2pkh_shape() {
        let script = p2pkh_script(&[7u8; 20]);
        assert_eq!(script[0], OP_DUP);
        assert_eq!(script[1], OP_BLAKE160);
        assert_eq!(script[2], 20);
        assert_eq!(script.last(), Some(&OP_CHECKSIG));
    }
}
