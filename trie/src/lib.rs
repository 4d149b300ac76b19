//! Authenticated Merkle trie view over 32-byte name-hash keys: an in-memory binary radix "Urkel" trie, inclusion/
//! exclusion proofs, and the tree-commit-interval bookkeeping the
//! block-consensus gate uses to fix a block's `treeRoot`.

mod node;
mod proof;
mod schedule;
mod trie;

pub use proof::{Proof, ProofError, Terminal, Verified};
pub use schedule::{is_commit_height, CommitSchedule};
pub use trie::{TrieView, UrkelTrie};
