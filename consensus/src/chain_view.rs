//! The committed UTXO set a [`crate::gate::ConsensusGate`] reads antecedent
//! outputs from and mutates once a block's covenant effects are fully
//! validated. Trie state lives separately inside
//! `ConsensusGate` itself (a `hnsd-trie::UrkelTrie` plus
//! `hnsd-trie::CommitSchedule`), since the trie-commit-boundary invariant
//! is this module's own responsibility, not something any
//! injected view needs to know about.

use hnsd_consensus_core::tx::{Outpoint, Output};
use hnsd_names::CoinView;
use std::collections::HashMap;

/// The coin-view mutation surface `ConsensusGate` needs once a block's
/// covenant effects pass validation: remove the outputs its inputs spent,
/// add the outputs it created.
pub trait ChainView: CoinView {
    fn spend_output(&mut self, outpoint: &Outpoint);
    fn create_output(&mut self, outpoint: Outpoint, output: Output);
}

/// A plain in-memory UTXO set. The concrete reference `ChainView`
/// implementation for tests and the `hnsd` binary's default configuration;
/// a production deployment backs this with `hnsd-database` instead.
#[derive(Default, Clone)]
pub struct InMemoryUtxoSet {
    outputs: HashMap<Outpoint, Output>,
}

impl InMemoryUtxoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, outpoint: Outpoint, output: Output) {
        self.outputs.insert(outpoint, output);
    }
}

impl CoinView for InMemoryUtxoSet {
    fn get_output(&self, outpoint: &Outpoint) -> Option<Output> {
        self.outputs.get(outpoint).cloned()
    }
}

impl ChainView for InMemoryUtxoSet {
    fn spend_output(&mut self, outpoint: &Outpoint) {
        self.outputs.remove(outpoint);
    }

    fn create_output(&mut self, outpoint: Outpoint, output: Output) {
        self.outputs.insert(outpoint, output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hnsd_addresses::{Address, Network};
    use hnsd_consensus_core::tx::Covenant;
    use hnsd_hashes::Hash;

    #[test]
    fn test_spend_then_lookup_misses() {
        let mut set = InMemoryUtxoSet::new();
        let outpoint = Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0);
        let addr = Address::new(Network::Regtest, 0, &[0u8; 20]).unwrap();
        set.create_output(outpoint, Output::new(10, addr, Covenant::none()));
        assert!(set.get_output(&outpoint).is_some());
        set.spend_output(&outpoint);
        assert!(set.get_output(&outpoint).is_none());
    }
}
