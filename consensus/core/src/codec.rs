//! Transaction wire encoding. Distinct from `hashing::tx`'s canonical hash
//! preimage: this is the literal byte layout those external collaborators
//! read and write, with compact-size varints for every count/length field.

use crate::tx::{Covenant, CovenantKind, Input, Output, Outpoint, Transaction};
use crate::varint::{read_varint, write_varint, VarIntError};
use hnsd_hashes::Hash;
use std::io::{Read, Write};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error(transparent)]
    VarInt(#[from] VarIntError),
    #[error("unexpected end of buffer")]
    Eof,
    #[error("unknown covenant type tag {0}")]
    UnknownCovenantKind(u8),
    #[error("address hash length {0} out of range 2..=40")]
    InvalidAddressHashLength(usize),
}

impl From<std::io::Error> for CodecError {
    fn from(_: std::io::Error) -> Self {
        CodecError::Eof
    }
}

type Result<T> = std::result::Result<T, CodecError>;

fn read_exact_vec<R: Read>(mut r: R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_hash<R: Read>(mut r: R) -> Result<Hash> {
    let mut buf = [0u8; 32];
    r.read_exact(&mut buf)?;
    Ok(Hash::from(buf))
}

fn read_u32<R: Read>(mut r: R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(mut r: R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_u8<R: Read>(mut r: R) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn write_var_bytes<W: Write>(mut w: W, bytes: &[u8]) -> Result<()> {
    write_varint(&mut w, bytes.len() as u64)?;
    w.write_all(bytes)?;
    Ok(())
}

fn read_var_bytes<R: Read>(mut r: R) -> Result<Vec<u8>> {
    let len = read_varint(&mut r)? as usize;
    read_exact_vec(&mut r, len)
}

fn write_covenant<W: Write>(mut w: W, covenant: &Covenant) -> Result<()> {
    w.write_all(&[covenant.kind as u8])?;
    write_varint(&mut w, covenant.items.len() as u64)?;
    for item in &covenant.items {
        write_var_bytes(&mut w, item)?;
    }
    Ok(())
}

fn read_covenant<R: Read>(mut r: R) -> Result<Covenant> {
    let tag = read_u8(&mut r)?;
    let kind = CovenantKind::from_u8(tag).ok_or(CodecError::UnknownCovenantKind(tag))?;
    let item_count = read_varint(&mut r)?;
    let mut items = Vec::with_capacity(item_count as usize);
    for _ in 0..item_count {
        items.push(read_var_bytes(&mut r)?);
    }
    Ok(Covenant { kind, items })
}

fn write_output<W: Write>(mut w: W, output: &Output, network: hnsd_addresses::Network) -> Result<()> {
    let _ = network;
    w.write_all(&output.value.to_le_bytes())?;
    w.write_all(&[output.address.version])?;
    let hash = output.address.hash.as_slice();
    if !(2..=40).contains(&hash.len()) {
        return Err(CodecError::InvalidAddressHashLength(hash.len()));
    }
    w.write_all(&[hash.len() as u8])?;
    w.write_all(hash)?;
    write_covenant(&mut w, &output.covenant)?;
    Ok(())
}

fn read_output<R: Read>(mut r: R, network: hnsd_addresses::Network) -> Result<Output> {
    let value = read_u64(&mut r)?;
    let version = read_u8(&mut r)?;
    let hash_len = read_u8(&mut r)? as usize;
    if !(2..=40).contains(&hash_len) {
        return Err(CodecError::InvalidAddressHashLength(hash_len));
    }
    let hash = read_exact_vec(&mut r, hash_len)?;
    let address =
        hnsd_addresses::Address::new(network, version, &hash).map_err(|_| CodecError::InvalidAddressHashLength(hash_len))?;
    let covenant = read_covenant(&mut r)?;
    Ok(Output { value, address, covenant })
}

fn write_input<W: Write>(mut w: W, input: &Input) -> Result<()> {
    w.write_all(input.outpoint.transaction_id.as_bytes())?;
    w.write_all(&input.outpoint.index.to_le_bytes())?;
    w.write_all(&input.sequence.to_le_bytes())?;
    Ok(())
}

fn read_input<R: Read>(mut r: R) -> Result<Input> {
    let transaction_id = read_hash(&mut r)?;
    let index = read_u32(&mut r)?;
    let sequence = read_u32(&mut r)?;
    Ok(Input { outpoint: Outpoint::new(transaction_id, index), sequence, witness: Vec::new() })
}

fn write_witness<W: Write>(mut w: W, witness: &[Vec<u8>]) -> Result<()> {
    write_varint(&mut w, witness.len() as u64)?;
    for item in witness {
        write_var_bytes(&mut w, item)?;
    }
    Ok(())
}

fn read_witness<R: Read>(mut r: R) -> Result<Vec<Vec<u8>>> {
    let count = read_varint(&mut r)?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(read_var_bytes(&mut r)?);
    }
    Ok(items)
}

/// Writes a transaction's wire encoding. `network` disambiguates the address bech32 human-readable
/// part on decode only; the wire bytes themselves carry no network tag.
pub fn encode_transaction(tx: &Transaction, network: hnsd_addresses::Network) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&tx.version.to_le_bytes());
    write_varint(&mut buf, tx.inputs.len() as u64).unwrap();
    for input in &tx.inputs {
        write_input(&mut buf, input).unwrap();
    }
    write_varint(&mut buf, tx.outputs.len() as u64).unwrap();
    for output in &tx.outputs {
        write_output(&mut buf, output, network).unwrap();
    }
    buf.extend_from_slice(&tx.locktime.to_le_bytes());
    for input in &tx.inputs {
        write_witness(&mut buf, &input.witness).unwrap();
    }
    buf
}

/// Inverse of [`encode_transaction`].
pub fn decode_transaction(bytes: &[u8], network: hnsd_addresses::Network) -> Result<Transaction> {
    let mut r = bytes;
    let version = read_u32(&mut r)?;
    let input_count = read_varint(&mut r)?;
    let mut inputs = Vec::with_capacity(input_count as usize);
    for _ in 0..input_count {
        inputs.push(read_input(&mut r)?);
    }
    let output_count = read_varint(&mut r)?;
    let mut outputs = Vec::with_capacity(output_count as usize);
    for _ in 0..output_count {
        outputs.push(read_output(&mut r, network)?);
    }
    let locktime = read_u32(&mut r)?;
    for input in &mut inputs {
        input.witness = read_witness(&mut r)?;
    }
    Ok(Transaction { version, inputs, outputs, locktime })
}
