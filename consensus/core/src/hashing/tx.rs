use super::{ByteWriter, HasherExtensions};
use crate::tx::{CovenantKind, Input, Output, Transaction};
use hnsd_hashes::Hash;

/// Hash of fields 1-7 of the canonical encoding: commits the
/// witness data in addition to everything `transaction_id` commits.
pub fn transaction_hash(tx: &Transaction) -> Hash {
    let mut w = ByteWriter::default();
    write_transaction_body(&mut w, tx);
    write_witnesses(&mut w, tx);
    hnsd_hashes::blake256(&w.0)
}

/// Not intended for direct use by clients. Instead use `tx.id()`.
///
/// Hash of fields 1-6 of the canonical encoding: the
/// transaction's identity, excluding witness data.
pub(crate) fn transaction_id(tx: &Transaction) -> Hash {
    let mut w = ByteWriter::default();
    write_transaction_body(&mut w, tx);
    hnsd_hashes::blake256(&w.0)
}

fn write_transaction_body(w: &mut ByteWriter, tx: &Transaction) {
    w.write_u32(tx.version).write_len(tx.inputs.len());
    for input in &tx.inputs {
        write_input(w, input);
    }

    w.write_len(tx.outputs.len());
    for output in &tx.outputs {
        write_output(w, output);
    }

    w.write_u32(tx.locktime);
}

fn write_witnesses(w: &mut ByteWriter, tx: &Transaction) {
    for input in &tx.inputs {
        w.write_var_array(&input.witness);
    }
}

#[inline(always)]
fn write_input(w: &mut ByteWriter, input: &Input) {
    w.update(input.outpoint.transaction_id.as_bytes()).write_u32(input.outpoint.index).write_u32(input.sequence);
}

#[inline(always)]
fn write_output(w: &mut ByteWriter, output: &Output) {
    w.write_u64(output.value)
        .write_u8(output.address.version)
        .write_u8(output.address.hash.len() as u8)
        .update(output.address.hash.as_slice());
    write_covenant(w, &output.covenant);
}

#[inline(always)]
fn write_covenant(w: &mut ByteWriter, covenant: &crate::tx::Covenant) {
    w.write_u8(covenant.kind as u8).write_var_array(&covenant.items);
}

/// Re-exported for `hnsd-names`/`hnsd-txscript`, which need the covenant
/// type tag on its own (e.g. for `OP_TYPE`).
pub fn covenant_type_tag(kind: CovenantKind) -> u8 {
    kind as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{Covenant, Outpoint};
    use hnsd_addresses::{Address, Network};

    fn sample_tx() -> Transaction {
        let address = Address::new(Network::Regtest, 0, &[0u8; 20]).unwrap();
        let outpoint = Outpoint::new(Hash::from_le_u64([1, 2, 3, 4]), 0);
        let input = Input::new(outpoint, 0, vec![vec![1, 2, 3]]);
        let output = Output::new(1000, address, Covenant::none());
        Transaction::new(0, vec![input], vec![output], 0)
    }

    #[test]
    fn test_transaction_id_deterministic() {
        let tx = sample_tx();
        assert_eq!(transaction_id(&tx), transaction_id(&tx));
    }

    #[test]
    fn test_witness_mutation_changes_hash_not_id() {
        let mut tx = sample_tx();
        let id_before = transaction_id(&tx);
        let hash_before = transaction_hash(&tx);

        tx.inputs[0].witness = vec![vec![9, 9, 9]];

        assert_eq!(transaction_id(&tx), id_before);
        assert_ne!(transaction_hash(&tx), hash_before);
    }
}
