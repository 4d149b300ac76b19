//! The minimal block shape `ConsensusGate::connect_block` operates on:
//! enough of a header to check chain continuity and the trie-commit-boundary
//! invariant, plus its ordered transactions. Full header
//! fields (PoW, timestamp rules, difficulty) are out of scope for this
//! crate.

use hnsd_consensus_core::tx::Transaction;
use hnsd_hashes::{blake256, Hash};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u32,
    pub prev_block: Hash,
    /// The trie root this block's author claims results from applying every
    /// block's covenant effects up to and including the most recent commit
    /// boundary at or before `height`.
    pub tree_root: Hash,
    pub time: u32,
}

impl BlockHeader {
    /// A block's identity: not a real PoW-chain block hash (that's out of
    /// scope here), just enough to chain `prev_block` pointers between
    /// successive `connect_block` calls.
    pub fn id(&self) -> Hash {
        let mut bytes = Vec::with_capacity(32 + 32 + 4 + 4);
        bytes.extend_from_slice(self.prev_block.as_bytes());
        bytes.extend_from_slice(self.tree_root.as_bytes());
        bytes.extend_from_slice(&self.height.to_le_bytes());
        bytes.extend_from_slice(&self.time.to_le_bytes());
        blake256(&bytes)
    }
}

#[derive(Clone, Debug)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self { header, transactions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_changes_with_height() {
        let base = BlockHeader { height: 1, prev_block: Hash::default(), tree_root: Hash::default(), time: 0 };
        let other = BlockHeader { height: 2, ..base.clone() };
        assert_ne!(base.id(), other.id());
    }
}
