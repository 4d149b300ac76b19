/// Base sighash kinds occupying the low bits of the sighash byte.
pub const SIG_HASH_ALL: SigHashType = SigHashType(1);
pub const SIG_HASH_NONE: SigHashType = SigHashType(2);
pub const SIG_HASH_SINGLE: SigHashType = SigHashType(3);
pub const SIG_HASH_SINGLE_REVERSE: SigHashType = SigHashType(4);

/// Modifier bits, combined with one of the base kinds above.
pub const SIG_HASH_NOINPUT: u8 = 0x40;
pub const SIG_HASH_ANYONECANPAY: u8 = 0x80;

/// Mask over the low bits identifying which outputs are signed.
const SIG_HASH_BASE_MASK: u8 = 0b0001_1111;
/// Bit 0x20 is reserved and must be clear.
const SIG_HASH_RESERVED_BIT: u8 = 0x20;

/// One byte appended to every 64-byte signature, selecting which
/// parts of the transaction the signature commits to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SigHashType(pub(crate) u8);

impl SigHashType {
    pub fn is_sighash_all(self) -> bool {
        self.0 & SIG_HASH_BASE_MASK == SIG_HASH_ALL.0
    }

    pub fn is_sighash_none(self) -> bool {
        self.0 & SIG_HASH_BASE_MASK == SIG_HASH_NONE.0
    }

    pub fn is_sighash_single(self) -> bool {
        self.0 & SIG_HASH_BASE_MASK == SIG_HASH_SINGLE.0
    }

    pub fn is_sighash_single_reverse(self) -> bool {
        self.0 & SIG_HASH_BASE_MASK == SIG_HASH_SINGLE_REVERSE.0
    }

    pub fn is_anyone_can_pay(self) -> bool {
        self.0 & SIG_HASH_ANYONECANPAY == SIG_HASH_ANYONECANPAY
    }

    pub fn is_noinput(self) -> bool {
        self.0 & SIG_HASH_NOINPUT == SIG_HASH_NOINPUT
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    pub fn from_u8(val: u8) -> Result<Self, &'static str> {
        if val & SIG_HASH_RESERVED_BIT != 0 {
            return Err("reserved sighash bit 0x20 is set");
        }
        match val & SIG_HASH_BASE_MASK {
            1 | 2 | 3 | 4 => Ok(Self(val)),
            _ => Err("invalid sighash base type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_bits_compose() {
        let t = SigHashType::from_u8(SIG_HASH_ALL.0 | SIG_HASH_ANYONECANPAY | SIG_HASH_NOINPUT).unwrap();
        assert!(t.is_sighash_all());
        assert!(t.is_anyone_can_pay());
        assert!(t.is_noinput());
    }

    #[test]
    fn test_reserved_bit_rejected() {
        assert!(SigHashType::from_u8(SIG_HASH_ALL.0 | 0x20).is_err());
    }

    #[test]
    fn test_unknown_base_rejected() {
        assert!(SigHashType::from_u8(5).is_err());
    }
}
