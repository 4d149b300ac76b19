mod hashers;
mod primitives;

use std::fmt::{Debug, Display, Formatter};
use std::str::{self, FromStr};

pub use hashers::{Hasher, HasherBase, NameStateHash, SigHash, TrieInternalHash, TrieLeafHash};
pub use primitives::{blake160, blake256, hash160, hash256, keccak256, ripemd160, sha1, sha256, sha3_256};

const HASH_SIZE: usize = 32;

pub const ZERO_HASH: Hash = Hash([0u8; HASH_SIZE]);

#[derive(PartialEq, Eq, Clone, Copy, Hash, Default, Debug, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Builds a hash from 4 little-endian `u64` limbs. Handy for constructing
    /// deterministic test fixtures without going through hex.
    pub fn from_le_u64(words: [u64; 4]) -> Self {
        let mut bytes = [0u8; HASH_SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(words.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Hash(bytes)
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl From<Hash> for [u8; HASH_SIZE] {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Hash {
    type Error = std::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(Hash(bytes.try_into()?))
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut hex = [0u8; HASH_SIZE * 2];
        faster_hex::hex_encode(&self.0, &mut hex).expect("the output buffer is exactly twice the input size");
        f.write_str(str::from_utf8(&hex).expect("hex is always valid UTF-8"))
    }
}

impl FromStr for Hash {
    type Err = faster_hex::Error;

    fn from_str(hash_str: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; HASH_SIZE];
        faster_hex::hex_decode(hash_str.as_bytes(), &mut bytes)?;
        Ok(Hash(bytes))
    }
}
