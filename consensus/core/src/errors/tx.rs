use crate::constants::{MAX_MONEY, MAX_TX_INPUTS, MAX_TX_OUTPUTS};
use crate::tx::Outpoint;
use hnsd_txscript_errors::ScriptError;
use thiserror::Error;

/// Structural validity rules for a decoded [`crate::tx::Transaction`],
/// independent of covenant/name-auction semantics (those live in
/// `hnsd-names`'s `VerifyError`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxRuleError {
    #[error("transaction has no inputs")]
    NoTxInputs,

    #[error("transaction has duplicate inputs")]
    TxDuplicateInputs,

    #[error("transaction version {0} is unknown")]
    UnknownTxVersion(u32),

    #[error("transaction has {0} inputs where the max allowed is {1}")]
    TooManyInputs(usize, usize),

    #[error("transaction has {0} outputs where the max allowed is {1}")]
    TooManyOutputs(usize, usize),

    #[error("transaction input #{0} witness item is above {1} bytes")]
    TooBigWitnessItem(usize, usize),

    #[error("transaction output #{0} address hash length {1} is out of range 2..=40")]
    InvalidAddressHashLength(usize, usize),

    #[error("transaction total inputs spending amount overflowed u64")]
    InputAmountOverflow,

    #[error("transaction total inputs spending amount is higher than the max allowed of {}", MAX_MONEY)]
    InputAmountTooHigh,

    #[error("transaction output {0} value is higher than the max allowed of {}", MAX_MONEY)]
    TxOutTooHigh(usize),

    #[error("transaction total outputs value overflowed u64")]
    OutputsValueOverflow,

    #[error("transaction total outputs value is higher than the max allowed of {}", MAX_MONEY)]
    TotalTxOutTooHigh,

    #[error("transaction tries to spend {0} while its total inputs amount is {1}")]
    SpendTooHigh(u64, u64),

    #[error("one of the transaction's sequence lock conditions was not met")]
    SequenceLockConditionsAreNotMet,

    #[error("outpoint {0} referenced by an input is missing from the current coin view")]
    MissingTxOutpoint(Outpoint),

    #[error("failed to verify input #{0}'s witness: {1}")]
    SignatureInvalid(usize, ScriptError),
}

pub type TxResult<T> = std::result::Result<T, TxRuleError>;

/// Checks the structural rules that do not require external (coin-view)
/// context: input/output counts, witness item sizes, address shapes, and
/// per-output value bounds.
pub fn check_transaction_structure(tx: &crate::tx::Transaction) -> TxResult<()> {
    if tx.inputs.is_empty() {
        return Err(TxRuleError::NoTxInputs);
    }
    if tx.inputs.len() > MAX_TX_INPUTS {
        return Err(TxRuleError::TooManyInputs(tx.inputs.len(), MAX_TX_INPUTS));
    }
    if tx.outputs.len() > MAX_TX_OUTPUTS {
        return Err(TxRuleError::TooManyOutputs(tx.outputs.len(), MAX_TX_OUTPUTS));
    }

    let mut seen = std::collections::HashSet::with_capacity(tx.inputs.len());
    for input in &tx.inputs {
        if !seen.insert(input.outpoint) {
            return Err(TxRuleError::TxDuplicateInputs);
        }
    }

    let mut total_out: u64 = 0;
    for (i, output) in tx.outputs.iter().enumerate() {
        let hash_len = output.address.hash.len();
        if !(2..=40).contains(&hash_len) {
            return Err(TxRuleError::InvalidAddressHashLength(i, hash_len));
        }
        if output.value > MAX_MONEY {
            return Err(TxRuleError::TxOutTooHigh(i));
        }
        total_out = total_out.checked_add(output.value).ok_or(TxRuleError::OutputsValueOverflow)?;
    }
    if total_out > MAX_MONEY {
        return Err(TxRuleError::TotalTxOutTooHigh);
    }

    Ok(())
}
