use super::sighash_type::SigHashType;
use super::HasherExtensions;
use crate::tx::{Output, Outpoint, Transaction};
use hnsd_hashes::{Hash, Hasher, HasherBase, SigHash, ZERO_HASH};
use std::cell::Cell;

/// Holds the fields used in the calculation of a transaction's sighash that
/// are the same across all of a transaction's inputs, so repeated
/// `calc_signature_hash` calls over each input don't redo the same hashing
/// work (the "quadratic hashing problem").
#[derive(Default)]
pub struct SigHashReusedValues {
    previous_outputs_hash: Cell<Option<Hash>>,
    sequences_hash: Cell<Option<Hash>>,
}

impl SigHashReusedValues {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `hashPrevouts`: zero under `ANYONECANPAY` or `NOINPUT`.
pub fn previous_outputs_hash(tx: &Transaction, hash_type: SigHashType, reused: &SigHashReusedValues) -> Hash {
    if hash_type.is_anyone_can_pay() || hash_type.is_noinput() {
        return ZERO_HASH;
    }
    if let Some(hash) = reused.previous_outputs_hash.get() {
        return hash;
    }
    let mut hasher = SigHash::new();
    for input in &tx.inputs {
        hasher.update(input.outpoint.transaction_id.as_bytes()).write_u32(input.outpoint.index);
    }
    let hash = hasher.finalize();
    reused.previous_outputs_hash.set(Some(hash));
    hash
}

/// `hashSequences`: zero under `ANYONECANPAY` or `NOINPUT`.
pub fn sequences_hash(tx: &Transaction, hash_type: SigHashType, reused: &SigHashReusedValues) -> Hash {
    if hash_type.is_anyone_can_pay() || hash_type.is_noinput() {
        return ZERO_HASH;
    }
    if let Some(hash) = reused.sequences_hash.get() {
        return hash;
    }
    let mut hasher = SigHash::new();
    for input in &tx.inputs {
        hasher.write_u32(input.sequence);
    }
    let hash = hasher.finalize();
    reused.sequences_hash.set(Some(hash));
    hash
}

/// `hashOutputs`: the `ALL`/`NONE`/`SINGLE`/`SINGLEREVERSE` variants.
pub fn outputs_hash(tx: &Transaction, hash_type: SigHashType, input_index: usize) -> Hash {
    if hash_type.is_sighash_none() {
        return ZERO_HASH;
    }

    if hash_type.is_sighash_single() {
        return match tx.outputs.get(input_index) {
            Some(output) => hash_single_output(output),
            None => ZERO_HASH,
        };
    }

    if hash_type.is_sighash_single_reverse() {
        let reversed_index = tx.outputs.len().checked_sub(1 + input_index);
        return match reversed_index.and_then(|i| tx.outputs.get(i)) {
            Some(output) => hash_single_output(output),
            None => ZERO_HASH,
        };
    }

    // SIG_HASH_ALL
    let mut hasher = SigHash::new();
    for output in &tx.outputs {
        write_output(&mut hasher, output);
    }
    hasher.finalize()
}

fn hash_single_output(output: &Output) -> Hash {
    let mut hasher = SigHash::new();
    write_output(&mut hasher, output);
    hasher.finalize()
}

fn write_output(hasher: &mut SigHash, output: &Output) {
    hasher
        .write_u64(output.value)
        .write_u8(output.address.version)
        .write_u8(output.address.hash.len() as u8)
        .update(output.address.hash.as_slice())
        .write_u8(output.covenant.kind as u8)
        .write_var_array(&output.covenant.items);
}

/// Computes the signature hash preimage's digest for input `input_index`
///. `input_value` is the value of the coin being spent;
/// `subscript` is the portion of the witness script from the most recent
/// `OP_CODESEPARATOR` onward.
pub fn calc_signature_hash(
    tx: &Transaction,
    input_index: usize,
    input_value: u64,
    subscript: &[u8],
    hash_type: SigHashType,
    reused_values: &SigHashReusedValues,
) -> Hash {
    let input = &tx.inputs[input_index];

    // under NOINPUT, this input's own outpoint/sequence commitment is zeroed too
    let (outpoint, sequence) =
        if hash_type.is_noinput() { (Outpoint::new(Hash::default(), 0), 0u32) } else { (input.outpoint, input.sequence) };

    let mut hasher = SigHash::new();
    hasher
        .update(previous_outputs_hash(tx, hash_type, reused_values))
        .update(sequences_hash(tx, hash_type, reused_values))
        .update(outpoint.transaction_id.as_bytes())
        .write_u32(outpoint.index)
        .update(hnsd_hashes::sha3_256(subscript))
        .write_u64(input_value)
        .write_u32(sequence)
        .update(outputs_hash(tx, hash_type, input_index))
        .write_u32(tx.locktime)
        .write_u8(hash_type.to_u8());
    hasher.finalize()
}
