//! Bid-blinding commitment:
//! `blake2b(bid_le_u64 || nonce32)`. A BID commits to this value without
//! revealing the bid; REVEAL publishes `(value, nonce)` so the engine can
//! recompute and compare.

use hnsd_hashes::Hash;

pub const NONCE_LENGTH: usize = 32;

/// Computes `blake2b-256(bid.to_le_bytes() || nonce)` using the plain
/// (non domain-separated) `blake256` primitive, matching the plain-hash
/// convention used for every other name-hash/blind commitment a wallet
/// must be able to recompute without this crate's internal
/// domain-separation tags.
pub fn blind(bid: u64, nonce: &[u8; NONCE_LENGTH]) -> Hash {
    let mut preimage = Vec::with_capacity(8 + NONCE_LENGTH);
    preimage.extend_from_slice(&bid.to_le_bytes());
    preimage.extend_from_slice(nonce);
    hnsd_hashes::blake256(&preimage)
}

/// True if `(bid, nonce)` hashes to `expected` (the BID covenant's stored
/// `blindHash` item).
pub fn verify_blind(expected: &Hash, bid: u64, nonce: &[u8; NONCE_LENGTH]) -> bool {
    blind(bid, nonce) == *expected
}
