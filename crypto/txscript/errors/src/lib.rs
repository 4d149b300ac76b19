use thiserror::Error;

/// Errors raised while interpreting a witness script.
/// Each variant corresponds to one named error kind; where the kind is
/// opcode-position-sensitive the position is carried as the first field.
#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum ScriptError {
    #[error("script of size {0} exceeds maximum allowed size {1}")]
    ScriptSize(usize, usize),
    #[error("attempt to execute invalid opcode {0:#04x} at position {1}")]
    BadOpcode(u8, usize),
    #[error("attempt to execute disabled opcode {0:#04x} at position {1}")]
    DisabledOpcode(u8, usize),
    #[error("push of size {0} exceeds maximum allowed push size {1}")]
    PushSize(usize, usize),
    #[error("exceeded max operation count of {0}")]
    OpCount(usize),
    #[error("combined stack size {0} exceeds max allowed {1}")]
    StackSize(usize, usize),
    #[error("push encoding is not minimal at position {0}")]
    MinimalData(usize),
    #[error("OP_IF/OP_NOTIF argument is not minimally encoded at position {0}")]
    MinimalIf(usize),
    #[error("not all signatures empty on failed checkmultisig")]
    NullFail,
    #[error("end of script reached in conditional execution")]
    UnbalancedConditional,
    #[error("opcode at position {1} requires at least {0} stack items")]
    InvalidStackOperation(usize, usize),
    #[error("opcode at position {0} requires at least one alt-stack item")]
    InvalidAltstackOperation(usize),
    #[error("OP_VERIFY failed at position {0}")]
    Verify(usize),
    #[error("OP_EQUALVERIFY failed at position {0}")]
    EqualVerify(usize),
    #[error("OP_NUMEQUALVERIFY failed at position {0}")]
    NumEqualVerify(usize),
    #[error("OP_CHECKSIGVERIFY failed at position {0}")]
    CheckSigVerify(usize),
    #[error("OP_CHECKMULTISIGVERIFY failed at position {0}")]
    CheckMultisigVerify(usize),
    #[error("invalid pubkey count {0} at position {1}")]
    PubkeyCount(i64, usize),
    #[error("invalid signature count {0} at position {1}")]
    SigCount(i64, usize),
    #[error("invalid signature encoding at position {0}")]
    SigEncoding(usize),
    #[error("invalid pubkey encoding at position {0}")]
    PubkeyEncoding(usize),
    #[error("negative locktime argument at position {0}")]
    NegativeLocktime(usize),
    #[error("unsatisfied locktime at position {0}")]
    UnsatisfiedLocktime(usize),
    #[error("attempt to execute OP_RETURN")]
    OpReturn,
    #[error("false stack entry at end of script execution")]
    EvalFalse,
    #[error("witness program hash does not match committed redeem script")]
    WitnessProgramMismatch,
    #[error("witness is empty")]
    WitnessProgramWitnessEmpty,
    #[error("witness program hash has the wrong length: {0}")]
    WitnessProgramWrongLength(usize),
    #[error("discouraged upgradable witness program version")]
    DiscourageUpgradableWitnessProgram,
    #[error("discouraged upgradable NOP opcode at position {0}")]
    DiscourageUpgradableNops(usize),
    #[error("OP_CHECKSIG family requires a null dummy element")]
    SigNulldummy,
    #[error("invalid number, exceeds size limit of {1} bytes: {0:02x?}")]
    NumberTooBig(Vec<u8>, usize),
    #[error("attempt to read from empty stack at position {0}")]
    EmptyStack(usize),
    #[error("script returned with no residual context")]
    NoScripts,
}

impl ScriptError {
    /// True when this error kind must be enforced under the mandatory
    /// consensus verify flags: `MINIMALDATA`, `MINIMALIF`,
    /// `NULLFAIL` gate these specific kinds; every other kind is already
    /// unconditionally mandatory (a malformed or failing script is always a
    /// consensus failure, only the *discourage-upgradable* bits are policy).
    pub fn is_policy_only(&self) -> bool {
        matches!(self, ScriptError::DiscourageUpgradableNops(_) | ScriptError::DiscourageUpgradableWitnessProgram)
    }
}

/// Block/transaction-level verification failures.
/// Each reason tag may carry an optional peer ban score for P2P misbehavior
/// scoring; `score` is `None` for failures that should not affect peer
/// reputation (e.g. policy-only mempool rejections).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerifyErrorKind {
    #[error("referenced previous block does not match the chain tip")]
    BadPrevBlock,
    #[error("covenant is not valid for the name's current phase")]
    BadCovenantPhase,
    #[error("name length out of the 1..=63 byte range")]
    BadNameLength,
    #[error("blind commitment does not match the revealed (value, nonce)")]
    BadBlind,
    #[error("renewal height is invalid for the current chain height")]
    BadRenewal,
    #[error("renewal attempted before treeInterval+1 blocks since the last renewal")]
    PrematureRenewal,
    #[error("finalize attempted before the transfer lockup period elapsed")]
    BadTransferLockup,
    #[error("airdrop or reserved-name claim proof failed validation")]
    BadClaimProof,
    #[error("witness program failed verification: {0}")]
    BadWitnessProgram(ScriptError),
    #[error("name has expired")]
    NameExpired,
    #[error("spending input does not own the referenced name")]
    NameNotOwned,
    #[error("name is within its post-revocation cooldown")]
    NameRevoked,
    #[error("committed tree root does not match the recomputed trie root")]
    BadTreeRoot,
    #[error("mandatory script verify flag failed: {0}")]
    MandatoryScriptVerifyFlagFailed(ScriptError),
    #[error("non-mandatory script verify flag failed: {0}")]
    NonMandatoryScriptVerifyFlagFailed(ScriptError),
    #[error("more than one input in this block spends the name's owner outpoint")]
    DuplicateNameSpend,
    #[error("covenant references a name-hash/openHeight pair that does not match the name's recorded state")]
    NameStateMismatch,
    #[error("covenant item count or item shape is invalid: {0}")]
    BadCovenantShape(String),
    #[error("covenant's nameHash item does not equal sha3(name)")]
    BadNameHash,
    #[error("OPEN rejected: an active, unexpired NameState already exists for this name")]
    ActiveAuctionExists,
    #[error("covenant continues a NameState that does not exist")]
    NameNotFound,
    #[error("prior owner outpoint was consumed at or after the new covenant's output index")]
    BadCovenantOrdering,
    #[error("output value does not match the amount the covenant requires")]
    BadCovenantValue,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct VerifyError {
    pub kind: VerifyErrorKind,
    /// Suggested P2P peer ban score increment, if this failure should affect
    /// peer reputation. `None` for mempool policy-only rejections.
    pub score: Option<u32>,
}

impl VerifyError {
    pub fn new(kind: VerifyErrorKind) -> Self {
        Self { kind, score: None }
    }

    pub fn with_score(kind: VerifyErrorKind, score: u32) -> Self {
        Self { kind, score: Some(score) }
    }

    /// Converts a bubbled-up script error to the right `VerifyError` variant:
    /// mandatory-flag failures become ban-worthy
    /// `MandatoryScriptVerifyFlagFailed`, policy-only failures become
    /// `NonMandatoryScriptVerifyFlagFailed` and never ban the peer.
    pub fn from_script_error(err: ScriptError) -> Self {
        if err.is_policy_only() {
            VerifyError::new(VerifyErrorKind::NonMandatoryScriptVerifyFlagFailed(err))
        } else {
            VerifyError::with_score(VerifyErrorKind::MandatoryScriptVerifyFlagFailed(err), 100)
        }
    }
}
