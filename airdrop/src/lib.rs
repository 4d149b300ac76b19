//! Airdrop and reserved-name claim ingestion:
//! two pure validation paths that turn an externally-supplied proof into the
//! CLAIM-covenant fields a wallet assembles into a transaction. Neither path
//! touches the trie or UTXO set directly — that's `hnsd-consensus`'s
//! `apply_covenant` job once the resulting transaction is broadcast and
//! included in a block (the CLAIM covenant applies identically regardless
//! of which path produced the transaction).

use hnsd_addresses::Address;
use hnsd_consensus_core::rules::name_hash;
use hnsd_consensus_core::tx::{Covenant, CovenantKind};
use hnsd_hashes::Hash;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("airdrop proof does not verify against the commitment root")]
    BadAirdropProof,
    #[error("airdrop proof has an implausible sibling-path length")]
    BadProofShape,
    #[error("reserved-claim proof failed external verification")]
    BadReservedClaimProof,
}

pub type ClaimResult<T> = Result<T, ClaimError>;

/// The fields a successfully validated claim contributes to a CLAIM
/// transaction: `name`/`name_hash` are empty/zero for a pure
/// airdrop claim (no name attached), populated for a reserved-name claim.
/// `into_covenant` carries only `name` into the covenant item list, matching
/// `hnsd-names::apply_claim`'s already-settled simplification of the item
/// shape (see DESIGN.md); the remaining fields describe the plain value
/// output a wallet builds alongside the covenant output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimOutput {
    pub name: Vec<u8>,
    pub name_hash: Hash,
    pub address: Address,
    pub value: u64,
    pub fee: u64,
    pub weak: bool,
    pub commit_hash: Hash,
    pub commit_height: u32,
}

impl ClaimOutput {
    pub fn into_covenant(self) -> Covenant {
        Covenant { kind: CovenantKind::Claim, items: vec![self.name] }
    }
}

/// A flat Merkle audit proof of membership in the airdrop's pre-committed
/// leaf set. Mirrors `hnsd-trie::Proof`'s bit-directed sibling
/// walk, hashed with the plain `blake256` primitive rather than a
/// domain-separated `Hasher` type, since those are private to `hnsd-hashes`
/// (`consensus/src/block.rs` makes the same choice for the same reason).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AirdropProof {
    pub address: Address,
    pub value: u64,
    pub fee: u64,
    pub weak: bool,
    pub leaf_index: u64,
    pub siblings: Vec<Hash>,
}

impl AirdropProof {
    fn leaf_hash(&self) -> Hash {
        let mut bytes = Vec::with_capacity(1 + self.address.hash.len() + 8 + 8 + 1);
        bytes.push(self.address.version);
        bytes.extend_from_slice(&self.address.hash);
        bytes.extend_from_slice(&self.value.to_le_bytes());
        bytes.extend_from_slice(&self.fee.to_le_bytes());
        bytes.push(self.weak as u8);
        hnsd_hashes::blake256(&bytes)
    }
}

/// Verifies `proof` against `commitment_root` and, on success, yields the
/// CLAIM covenant fields for the airdrop path:
/// `{name=empty, addrVersion, addrHash, value, fee, weak}`.
pub fn validate_airdrop_proof(proof: &AirdropProof, commitment_root: &Hash) -> ClaimResult<ClaimOutput> {
    if proof.siblings.len() >= 64 {
        return Err(ClaimError::BadProofShape);
    }

    let mut current = proof.leaf_hash();
    let mut index = proof.leaf_index;
    for sibling in &proof.siblings {
        let mut bytes = Vec::with_capacity(64);
        if index & 1 == 0 {
            bytes.extend_from_slice(current.as_bytes());
            bytes.extend_from_slice(sibling.as_bytes());
        } else {
            bytes.extend_from_slice(sibling.as_bytes());
            bytes.extend_from_slice(current.as_bytes());
        }
        current = hnsd_hashes::blake256(&bytes);
        index >>= 1;
    }

    if current != *commitment_root {
        return Err(ClaimError::BadAirdropProof);
    }

    Ok(ClaimOutput {
        name: Vec::new(),
        name_hash: Hash::default(),
        address: proof.address.clone(),
        value: proof.value,
        fee: proof.fee,
        weak: proof.weak,
        commit_hash: Hash::default(),
        commit_height: 0,
    })
}

/// DNSSEC-style ownership proof for a pre-reserved name: an
/// opaque blob plus the plaintext claim it attests to. The actual DNSSEC
/// chain-of-trust validation is an External Collaborator this
/// crate only defines the seam for, via `ClaimProofVerifier`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservedClaimProof {
    pub name: Vec<u8>,
    pub address: Address,
    pub value: u64,
    pub weak: bool,
    pub commit_hash: Hash,
    pub commit_height: u32,
    pub proof: Vec<u8>,
}

/// The DNSSEC ownership-chain check for a reserved-name claim, supplied by
/// an external collaborator (e.g. a DNSSEC resolver/validator); this crate
/// only shapes a passing result into a `ClaimOutput`.
pub trait ClaimProofVerifier {
    fn verify(&self, name: &[u8], proof: &[u8]) -> bool;
}

/// Validates `proof`'s DNSSEC ownership chain via `verifier` and, on
/// success, yields the CLAIM covenant fields for the reserved-name path:
/// `{nameHash, name, value, weak, commitHash, commitHeight}`.
pub fn validate_reserved_claim<V: ClaimProofVerifier>(proof: &ReservedClaimProof, verifier: &V) -> ClaimResult<ClaimOutput> {
    if !verifier.verify(&proof.name, &proof.proof) {
        return Err(ClaimError::BadReservedClaimProof);
    }

    Ok(ClaimOutput {
        name_hash: name_hash(&proof.name),
        name: proof.name.clone(),
        address: proof.address.clone(),
        value: proof.value,
        fee: 0,
        weak: proof.weak,
        commit_hash: proof.commit_hash,
        commit_height: proof.commit_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hnsd_addresses::Network;

    fn addr() -> Address {
        Address::new(Network::Regtest, 0, &[1u8; 20]).unwrap()
    }

    #[test]
    fn test_airdrop_proof_verifies_against_root() {
        let proof = AirdropProof { address: addr(), value: 1000, fee: 10, weak: false, leaf_index: 0, siblings: vec![Hash::from_le_u64([9, 9, 9, 9])] };
        let leaf = proof.leaf_hash();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(leaf.as_bytes());
        bytes.extend_from_slice(proof.siblings[0].as_bytes());
        let root = hnsd_hashes::blake256(&bytes);

        let output = validate_airdrop_proof(&proof, &root).unwrap();
        assert_eq!(output.value, 1000);
        assert!(output.name.is_empty());
    }

    #[test]
    fn test_airdrop_proof_rejects_wrong_root() {
        let proof = AirdropProof { address: addr(), value: 1000, fee: 10, weak: false, leaf_index: 0, siblings: vec![] };
        assert_eq!(validate_airdrop_proof(&proof, &Hash::from_le_u64([1, 1, 1, 1])), Err(ClaimError::BadAirdropProof));
    }

    struct AlwaysAccepts;
    impl ClaimProofVerifier for AlwaysAccepts {
        fn verify(&self, _name: &[u8], _proof: &[u8]) -> bool {
            true
        }
    }

    struct AlwaysRejects;
    impl ClaimProofVerifier for AlwaysRejects {
        fn verify(&self, _name: &[u8], _proof: &[u8]) -> bool {
            false
        }
    }

    #[test]
    fn test_reserved_claim_accepted_by_verifier() {
        let proof = ReservedClaimProof { name: b"example".to_vec(), address: addr(), value: 0, weak: true, commit_hash: Hash::default(), commit_height: 0, proof: vec![0xab] };
        let output = validate_reserved_claim(&proof, &AlwaysAccepts).unwrap();
        assert_eq!(output.name_hash, name_hash(b"example"));
        assert!(output.weak);
    }

    #[test]
    fn test_reserved_claim_rejected_by_verifier() {
        let proof = ReservedClaimProof { name: b"example".to_vec(), address: addr(), value: 0, weak: false, commit_hash: Hash::default(), commit_height: 0, proof: vec![] };
        assert_eq!(validate_reserved_claim(&proof, &AlwaysRejects), Err(ClaimError::BadReservedClaimProof));
    }
}
