//! Plain (non domain-separated) hash primitives exposed as script opcodes
//! and as the covenant/address hash functions.

use crate::Hash;

/// 32-byte blake2b with no key, no domain separation.
pub fn blake256(data: &[u8]) -> Hash {
    let digest = blake2b_simd::Params::new().hash_length(32).to_state().update(data).finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(digest.as_bytes());
    Hash(out)
}

/// 20-byte blake2b with no key, no domain separation.
pub fn blake160(data: &[u8]) -> [u8; 20] {
    let digest = blake2b_simd::Params::new().hash_length(20).to_state().update(data).finalize();
    let mut out = [0u8; 20];
    out.copy_from_slice(digest.as_bytes());
    out
}

pub fn sha3_256(data: &[u8]) -> Hash {
    use sha3::Digest;
    let mut out = [0u8; 32];
    out.copy_from_slice(&sha3::Sha3_256::digest(data));
    Hash(out)
}

pub fn keccak256(data: &[u8]) -> Hash {
    use sha3::Digest;
    let mut out = [0u8; 32];
    out.copy_from_slice(&sha3::Keccak256::digest(data));
    Hash(out)
}

pub fn sha1(data: &[u8]) -> [u8; 20] {
    use sha1::Digest;
    let mut out = [0u8; 20];
    out.copy_from_slice(&sha1::Sha1::digest(data));
    out
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    use sha2::Digest;
    let mut out = [0u8; 32];
    out.copy_from_slice(&sha2::Sha256::digest(data));
    out
}

pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    use ripemd::Digest;
    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd::Ripemd160::digest(data));
    out
}

/// ripemd160(sha256(x))
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// sha256(sha256(x))
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake256_blake160_differ_by_length_only() {
        let full = blake256(b"hello world");
        let short = blake160(b"hello world");
        assert_eq!(&full.as_bytes()[..20], &short[..]);
    }

    #[test]
    fn test_sha3_and_keccak_differ() {
        assert_ne!(sha3_256(b"hello").as_bytes(), keccak256(b"hello").as_bytes());
    }

    #[test]
    fn test_hash160_hash256_composition() {
        assert_eq!(hash160(b"x"), ripemd160(&sha256(b"x")));
        assert_eq!(hash256(b"x"), sha256(&sha256(b"x")));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(sha1(b"abc"), sha1(b"abc"));
        assert_eq!(sha256(b"abc"), sha256(b"abc"));
        assert_eq!(ripemd160(b"abc"), ripemd160(b"abc"));
    }
}
