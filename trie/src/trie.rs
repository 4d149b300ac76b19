//! The trie view: `get`, `insert`, `remove`, `root`, `prove`.

use crate::node::Node;
use crate::proof::{Proof, Terminal};
use hnsd_hashes::Hash;

/// Read-through authenticated key/value view over 32-byte keys. `hnsd-names` stores encoded `NameState`s keyed by
/// `name_hash`; this trait is the seam the block-consensus gate uses
/// so `hnsd-names` never depends on a concrete trie implementation.
pub trait TrieView {
    fn get(&self, key: &Hash) -> Option<Vec<u8>>;
    fn insert(&mut self, key: Hash, value: Vec<u8>);
    fn remove(&mut self, key: &Hash);
    fn root(&self) -> Hash;
    fn prove(&self, key: &Hash) -> Proof;
}

/// In-memory binary radix trie. Every write recomputes
/// hashes lazily on read (`root()`/`prove()`), which is simple and correct
/// but re-walks the whole path each time; a production node would cache
/// per-node hashes and invalidate only the touched path.
#[derive(Clone)]
pub struct UrkelTrie {
    root: Node,
}

impl Default for UrkelTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl UrkelTrie {
    pub fn new() -> Self {
        Self { root: Node::Empty }
    }
}

impl TrieView for UrkelTrie {
    fn get(&self, key: &Hash) -> Option<Vec<u8>> {
        self.root.get(key, 0).map(|v| v.to_vec())
    }

    fn insert(&mut self, key: Hash, value: Vec<u8>) {
        let root = std::mem::replace(&mut self.root, Node::Empty);
        self.root = root.insert(key, value, 0);
    }

    fn remove(&mut self, key: &Hash) {
        let root = std::mem::replace(&mut self.root, Node::Empty);
        self.root = root.remove(key, 0);
    }

    fn root(&self) -> Hash {
        self.root.hash()
    }

    fn prove(&self, key: &Hash) -> Proof {
        let mut siblings = Vec::new();
        let terminal_node = self.root.walk(key, 0, &mut siblings);
        let terminal = match terminal_node {
            Node::Empty => Terminal::Empty,
            Node::Leaf { key, value } => Terminal::Leaf { key, value },
            Node::Internal { .. } => unreachable!("walk always stops at Empty or Leaf"),
        };
        Proof { siblings, terminal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::Verified;

    #[test]
    fn test_insert_remove_root_changes() {
        let mut trie = UrkelTrie::new();
        let empty_root = trie.root();
        trie.insert(Hash::from_le_u64([1, 0, 0, 0]), b"a".to_vec());
        let one_root = trie.root();
        assert_ne!(empty_root, one_root);

        trie.remove(&Hash::from_le_u64([1, 0, 0, 0]));
        assert_eq!(trie.root(), empty_root);
    }

    #[test]
    fn test_deterministic_root_regardless_of_insert_order() {
        let mut a = UrkelTrie::new();
        a.insert(Hash::from_le_u64([1, 0, 0, 0]), b"a".to_vec());
        a.insert(Hash::from_le_u64([2, 0, 0, 0]), b"b".to_vec());

        let mut b = UrkelTrie::new();
        b.insert(Hash::from_le_u64([2, 0, 0, 0]), b"b".to_vec());
        b.insert(Hash::from_le_u64([1, 0, 0, 0]), b"a".to_vec());

        assert_eq!(a.root(), b.root());
    }

    #[test]
    fn test_prove_roundtrips_through_trieview_trait() {
        let mut trie = UrkelTrie::new();
        let key = Hash::from_le_u64([7, 7, 7, 7]);
        trie.insert(key, b"value".to_vec());
        let proof = TrieView::prove(&trie, &key);
        assert_eq!(proof.verify(trie.root(), &key), Ok(Verified::Included));
    }
}
