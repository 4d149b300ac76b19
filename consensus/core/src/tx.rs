use crate::hashing;
use borsh::{BorshDeserialize, BorshSchema, BorshSerialize};
use hnsd_addresses::Address;
use hnsd_hashes::Hash;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identity of an unspent output: a transaction fingerprint plus an output
/// index.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize, BorshSerialize, BorshDeserialize, BorshSchema)]
pub struct Outpoint {
    pub transaction_id: Hash,
    pub index: u32,
}

impl Outpoint {
    pub fn new(transaction_id: Hash, index: u32) -> Self {
        Self { transaction_id, index }
    }
}

impl Display for Outpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.transaction_id, self.index)
    }
}

/// The enumerated covenant kinds. The tag alone is carried
/// here; item-shape validation and per-kind semantics live in `hnsd-names`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, BorshSerialize, BorshDeserialize, BorshSchema)]
#[repr(u8)]
pub enum CovenantKind {
    None = 0,
    Claim = 1,
    Open = 2,
    Bid = 3,
    Reveal = 4,
    Redeem = 5,
    Register = 6,
    Update = 7,
    Renew = 8,
    Transfer = 9,
    Finalize = 10,
    Revoke = 11,
}

impl CovenantKind {
    pub fn from_u8(tag: u8) -> Option<Self> {
        use CovenantKind::*;
        Some(match tag {
            0 => None,
            1 => Claim,
            2 => Open,
            3 => Bid,
            4 => Reveal,
            5 => Redeem,
            6 => Register,
            7 => Update,
            8 => Renew,
            9 => Transfer,
            10 => Finalize,
            11 => Revoke,
            _ => return Option::None,
        })
    }
}

impl Display for CovenantKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CovenantKind::None => "NONE",
            CovenantKind::Claim => "CLAIM",
            CovenantKind::Open => "OPEN",
            CovenantKind::Bid => "BID",
            CovenantKind::Reveal => "REVEAL",
            CovenantKind::Redeem => "REDEEM",
            CovenantKind::Register => "REGISTER",
            CovenantKind::Update => "UPDATE",
            CovenantKind::Renew => "RENEW",
            CovenantKind::Transfer => "TRANSFER",
            CovenantKind::Finalize => "FINALIZE",
            CovenantKind::Revoke => "REVOKE",
        };
        f.write_str(s)
    }
}

/// A transaction-output-level rule tag with typed items enforced by
/// consensus. The item count and per-position shape depend on
/// `kind`; interpreting `items` is `hnsd-names`'s job.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, BorshSerialize, BorshDeserialize, BorshSchema)]
pub struct Covenant {
    pub kind: CovenantKind,
    pub items: Vec<Vec<u8>>,
}

impl Covenant {
    pub fn none() -> Self {
        Self { kind: CovenantKind::None, items: Vec::new() }
    }

    pub fn is_name_covenant(&self) -> bool {
        !matches!(self.kind, CovenantKind::None)
    }
}

/// Value in base units, a witness-program address, and a covenant.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, BorshSerialize, BorshDeserialize, BorshSchema)]
pub struct Output {
    pub value: u64,
    pub address: Address,
    pub covenant: Covenant,
}

impl Output {
    pub fn new(value: u64, address: Address, covenant: Covenant) -> Self {
        Self { value, address, covenant }
    }
}

/// An outpoint, a relative-locktime sequence, and a witness. The
/// witness is not covered by the transaction id hash, only by the
/// witness-inclusive hash.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, BorshSerialize, BorshDeserialize, BorshSchema)]
pub struct Input {
    pub outpoint: Outpoint,
    pub sequence: u32,
    pub witness: Vec<Vec<u8>>,
}

impl Input {
    pub fn new(outpoint: Outpoint, sequence: u32, witness: Vec<Vec<u8>>) -> Self {
        Self { outpoint, sequence, witness }
    }
}

/// A transaction: version, ordered inputs, ordered outputs, locktime. Identity is the hash of the canonical encoding without witness
/// data (`id()`); a separate witness-inclusive hash exists for commitment
/// (`hash()`).
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, BorshSerialize, BorshDeserialize, BorshSchema)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub locktime: u32,
}

impl Transaction {
    pub fn new(version: u32, inputs: Vec<Input>, outputs: Vec<Output>, locktime: u32) -> Self {
        Self { version, inputs, outputs, locktime }
    }

    /// Hash of fields 1-6 of the canonical encoding: the
    /// transaction's identity, excluding witness data.
    pub fn id(&self) -> Hash {
        hashing::tx::transaction_id(self)
    }

    /// Hash of fields 1-7 of the canonical encoding: identical to
    /// `id()` but committing the witness data too.
    pub fn hash(&self) -> Hash {
        hashing::tx::transaction_hash(self)
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_address() -> Address {
        Address::new(hnsd_addresses::Network::Regtest, 0, &[0u8; 20]).unwrap()
    }

    #[test]
    fn test_covenant_kind_roundtrip() {
        for tag in 0u8..=11 {
            let kind = CovenantKind::from_u8(tag).unwrap();
            assert_eq!(kind as u8, tag);
        }
        assert!(CovenantKind::from_u8(12).is_none());
    }

    #[test]
    fn test_transaction_id_differs_from_witness_hash() {
        let outpoint = Outpoint::new(Hash::from_le_u64([1, 2, 3, 4]), 0);
        let input_a = Input::new(outpoint, 0, vec![vec![1, 2, 3]]);
        let input_b = Input::new(outpoint, 0, vec![vec![4, 5, 6]]);
        let output = Output::new(1000, sample_address(), Covenant::none());

        let tx_a = Transaction::new(0, vec![input_a], vec![output.clone()], 0);
        let tx_b = Transaction::new(0, vec![input_b], vec![output], 0);

        // witness differs, but the id-hash (witness-free) must agree
        assert_eq!(tx_a.id(), tx_b.id());
        assert_ne!(tx_a.hash(), tx_b.hash());
    }
}
