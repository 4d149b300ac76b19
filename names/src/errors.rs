//! The covenant/block-engine error domain. Unlike
//! `hnsd_txscript_errors::ScriptError` (which is converted into one of two
//! coarse `VerifyError` reasons at the witness-verification boundary, per
//! the propagation policy), every other consensus-level name-auction
//! failure gets its own reason tag here.

use hnsd_consensus_core::tx::Outpoint;
use hnsd_hashes::Hash;
use thiserror::Error;

/// A rejection reason plus an optional ban score, consumed by the P2P layer
/// for peer banning. The score is `None` for failures that are
/// policy-only (never grounds for banning a peer), such as mempool-only
/// non-standardness.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("mandatory-script-verify-flag-failed: {0}")]
    MandatoryScriptVerifyFlagFailed(hnsd_txscript_errors::ScriptError),

    #[error("non-mandatory-script-verify-flag-failed: {0}")]
    NonMandatoryScriptVerifyFlagFailed(hnsd_txscript_errors::ScriptError),

    #[error("bad-covenant-shape: covenant of kind {0} expects {1} items, got {2}")]
    BadCovenantShape(u8, usize, usize),

    #[error("bad-name-length: {0} bytes")]
    BadNameLength(usize),

    #[error("bad-name-hash: item does not equal sha3(name)")]
    BadNameHash,

    #[error("bad-open-height: covenant's openHeight item does not match the NameState's open height")]
    BadOpenHeight,

    #[error("name-not-found: no NameState exists for this name-hash")]
    NameNotFound,

    #[error("name-already-open: an active, non-expired NameState already exists")]
    NameAlreadyOpen,

    #[error("bad-covenant-phase: covenant of kind {0:?} is not valid in the NameState's current phase")]
    BadCovenantPhase(hnsd_consensus_core::tx::CovenantKind),

    #[error("bad-covenant-ancestor: covenant's spent input is not one of the accepted antecedent kinds")]
    BadCovenantAncestor,

    #[error("bad-blind: recomputed blind does not match the BID's blindHash")]
    BadBlind,

    #[error("bad-reveal-value: revealed bid exceeds the recorded highest bid")]
    BadRevealValue,

    #[error("not-reveal-winner: REGISTER/REDEEM input value does not match the expected auction outcome")]
    NotRevealWinner,

    #[error("bad-renewal: RENEW output does not carry a recent block hash")]
    BadRenewal,

    #[error("premature-renewal: renewal attempted before tree_interval + 1 blocks have passed")]
    PrematureRenewal,

    #[error("bad-transfer-lockup: FINALIZE attempted before transfer_lockup blocks have passed")]
    BadTransferLockup,

    #[error("name-expired: NameState has expired and behaves as absent for this action")]
    NameExpired,

    #[error("name-not-owned: this covenant is not an owner-output-continuing action")]
    NameNotOwned,

    #[error("name-revoked: name is within its post-REVOKE cooldown window")]
    NameRevoked,

    #[error("bad-value-conservation: covenant's value does not satisfy the kind's conservation rule")]
    BadValueConservation,

    #[error("bad-claim-proof: airdrop or reserved-name claim proof failed validation")]
    BadClaimProof,

    #[error("bad-ordering: output #{0} does not consume the NameState's owner outpoint {1} at an earlier input index")]
    BadOrdering(u32, Outpoint),

    #[error("bad-tree-root: computed trie root {computed} does not match the committed header root {expected}")]
    BadTreeRoot { expected: Hash, computed: Hash },

    #[error("bad-prevblk: block's declared previous block does not match the chain tip")]
    BadPrevBlock,

    #[error("duplicate-name-action: more than one covenant in this block claims the same output index for name-hash {0}")]
    DuplicateNameAction(Hash),

    #[error("missing-input: input {0} does not reference a known unspent output")]
    MissingInput(Outpoint),

    #[error("conflicting-spend: outpoint {0} is already spent by another pending transaction")]
    Conflict(Outpoint),

    #[error("bad-tx-structure: {0}")]
    BadTransactionStructure(#[from] hnsd_consensus_core::errors::tx::TxRuleError),
}

pub type VerifyResult<T> = std::result::Result<T, VerifyError>;
