//! Inclusion/exclusion proofs against a trie root -> Proof`), verifiable without the full trie.

use crate::node::{bit_at, internal_hash, leaf_hash};
use hnsd_hashes::{Hash, ZERO_HASH};

/// What the proved path terminates in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminal {
    /// The path reached an empty subtree before consuming the whole key.
    Empty,
    /// The path reached a leaf. If its key equals the proof's target key
    /// this is an inclusion proof; otherwise it's an exclusion proof by
    /// collision (a different name hashes into the same prefix).
    Leaf { key: Hash, value: Vec<u8> },
}

/// A Merkle proof for `key` against some trie root: the sibling hash at
/// each depth walked from the root down to `terminal`, ordered root-first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    pub siblings: Vec<Hash>,
    pub terminal: Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verified {
    Included,
    Excluded,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("proof does not hash to the claimed root")]
    RootMismatch,
    #[error("exclusion proof's colliding leaf does not share key's prefix up to its depth")]
    PrefixMismatch,
}

impl Proof {
    /// Verifies this proof against `root` for `key`, returning whether `key`
    /// is included (with its value reachable via `terminal`) or excluded.
    pub fn verify(&self, root: Hash, key: &Hash) -> Result<Verified, ProofError> {
        if let Terminal::Leaf { key: leaf_key, .. } = &self.terminal {
            if leaf_key != key {
                for depth in 0..self.siblings.len() {
                    if bit_at(leaf_key, depth) != bit_at(key, depth) {
                        return Err(ProofError::PrefixMismatch);
                    }
                }
            }
        }

        let mut current = match &self.terminal {
            Terminal::Empty => ZERO_HASH,
            Terminal::Leaf { key, value } => leaf_hash(key, value),
        };

        for (depth, sibling) in self.siblings.iter().enumerate().rev() {
            current = if bit_at(key, depth) { internal_hash(*sibling, current) } else { internal_hash(current, *sibling) };
        }

        if current != root {
            return Err(ProofError::RootMismatch);
        }

        match &self.terminal {
            Terminal::Leaf { key: leaf_key, .. } if leaf_key == key => Ok(Verified::Included),
            _ => Ok(Verified::Excluded),
        }
    }

    pub fn value(&self, key: &Hash) -> Option<&[u8]> {
        match &self.terminal {
            Terminal::Leaf { key: leaf_key, value } if leaf_key == key => Some(value),
            _ => None,
        }
    }
}
