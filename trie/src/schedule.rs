//! Trie commit schedule: between
//! `tree_interval`-spaced commit heights, NameState writes accumulate in an
//! in-memory overlay; at the boundary the overlay is flushed into the
//! authenticated trie and the resulting root is fixed into the block
//! header's `treeRoot` field. Readers between commits still see the latest
//! effective NameState (via the overlay) but proofs only attest to the most
//! recently committed root.

use crate::trie::TrieView;
use hnsd_hashes::Hash;
use std::collections::HashMap;

/// True if `height` is a commit boundary: the first block's writes land at
/// height `tree_interval`, then every `tree_interval` blocks after.
pub fn is_commit_height(height: u32, tree_interval: u32) -> bool {
    tree_interval != 0 && height % tree_interval == 0 && height != 0
}

/// Accumulates NameState writes since the last commit and flushes them into
/// a `TrieView` at commit boundaries.
#[derive(Clone)]
pub struct CommitSchedule {
    tree_interval: u32,
    pending: HashMap<Hash, Option<Vec<u8>>>,
    last_committed_root: Hash,
    last_committed_height: u32,
}

impl CommitSchedule {
    pub fn new(tree_interval: u32, genesis_root: Hash) -> Self {
        Self { tree_interval, pending: HashMap::new(), last_committed_root: genesis_root, last_committed_height: 0 }
    }

    /// Stages a write (or, with `value: None`, a delete) against the
    /// pending overlay. Overwrites any earlier pending write for the same
    /// key within the same commit window.
    pub fn stage(&mut self, key: Hash, value: Option<Vec<u8>>) {
        self.pending.insert(key, value);
    }

    /// Reads through the pending overlay first, falling back to the
    /// underlying committed trie.
    pub fn get<T: TrieView>(&self, trie: &T, key: &Hash) -> Option<Vec<u8>> {
        match self.pending.get(key) {
            Some(Some(value)) => Some(value.clone()),
            Some(None) => None,
            None => trie.get(key),
        }
    }

    /// If `height` is a commit boundary, flushes the pending overlay into
    /// `trie` and returns the new root; the caller compares this against
    /// the block's declared `treeRoot` (`bad-tree-root` on mismatch, spec
    /// §8). Returns `None` on non-boundary heights, leaving the overlay
    /// untouched so later blocks in the same window keep accumulating.
    pub fn commit_if_due<T: TrieView>(&mut self, trie: &mut T, height: u32) -> Option<Hash> {
        if !is_commit_height(height, self.tree_interval) {
            return None;
        }
        for (key, value) in self.pending.drain() {
            match value {
                Some(value) => trie.insert(key, value),
                None => trie.remove(&key),
            }
        }
        let root = trie.root();
        self.last_committed_root = root;
        self.last_committed_height = height;
        Some(root)
    }

    pub fn last_committed_root(&self) -> Hash {
        self.last_committed_root
    }

    pub fn last_committed_height(&self) -> u32 {
        self.last_committed_height
    }
}
