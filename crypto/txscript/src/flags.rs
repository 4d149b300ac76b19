//! Verify-flag bit positions. Consensus enforces a mandatory
//! subset; policy (mempool/relay) layers on the two discourage-upgradable
//! bits in addition.

/// Reject non-minimally-encoded numeric pushes.
pub const MINIMALDATA: u32 = 1 << 0;
/// Reject `NOP`-class opcodes reserved for future soft-forks.
pub const DISCOURAGE_UPGRADABLE_NOPS: u32 = 1 << 1;
/// Reject spends to witness-program versions/lengths not yet defined.
pub const DISCOURAGE_UPGRADABLE_WITNESS_PROGRAM: u32 = 1 << 2;
/// Reject non-minimally-encoded `OP_IF`/`OP_NOTIF` arguments.
pub const MINIMALIF: u32 = 1 << 3;
/// Require every signature slot in a failed `CHECKMULTISIG` to be empty.
pub const NULLFAIL: u32 = 1 << 4;

/// The three bits every block/mempool validator enforces unconditionally.
pub const MANDATORY_VERIFY_FLAGS: u32 = MINIMALDATA | MINIMALIF | NULLFAIL;

/// Mandatory flags plus the two discourage-upgradable bits mempool/relay
/// policy additionally sets.
pub const STANDARD_VERIFY_FLAGS: u32 = MANDATORY_VERIFY_FLAGS | DISCOURAGE_UPGRADABLE_NOPS | DISCOURAGE_UPGRADABLE_WITNESS_PROGRAM;

/// A thin wrapper so callers write `VerifyFlags::MANDATORY.contains(MINIMALIF)`
/// instead of juggling raw `u32`s everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct VerifyFlags(pub u32);

impl VerifyFlags {
    pub const MANDATORY: VerifyFlags = VerifyFlags(MANDATORY_VERIFY_FLAGS);
    pub const STANDARD: VerifyFlags = VerifyFlags(STANDARD_VERIFY_FLAGS);

    #[inline]
    pub fn contains(self, bit: u32) -> bool {
        self.0 & bit != 0
    }
}
