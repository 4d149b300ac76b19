use std::convert::TryFrom;
use std::fmt;

/// `u8::MAX` is never a valid store prefix, so it doubles as a path separator
/// byte inside composite [`crate::key::DbKey`]s.
pub const SEPARATOR: u8 = u8::MAX;

/// Column-family style prefixes for the key/value data this node persists.
/// Unlike a block-DAG client there is no header/UTXO/reachability store here:
/// everything the core touches is either trie state or name-auction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DatabaseStorePrefixes {
    /// Urkel trie nodes, keyed by node hash.
    TrieNode = 1,
    /// The most recently committed trie root and its commit height.
    TrieRoot = 2,
    /// Encoded `NameState` records, keyed by 32-byte name-hash.
    NameState = 3,
    /// Chain metadata: tip height, tip hash, per-height block index.
    ChainMeta = 4,
    /// Stored block headers/bodies, keyed by block hash.
    Block = 5,
}

impl From<DatabaseStorePrefixes> for u8 {
    fn from(value: DatabaseStorePrefixes) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for DatabaseStorePrefixes {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use DatabaseStorePrefixes::*;
        match value {
            1 => Ok(TrieNode),
            2 => Ok(TrieRoot),
            3 => Ok(NameState),
            4 => Ok(ChainMeta),
            5 => Ok(Block),
            _ => Err(()),
        }
    }
}

impl fmt::Display for DatabaseStorePrefixes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
