//! Bookkeeping for already-admitted, unconfirmed transactions:
//! their outputs must be visible to dependent mempool transactions, and
//! their spent inputs conflict-check against later submissions.

use hnsd_consensus_core::tx::{Output, Outpoint, Transaction};
use hnsd_hashes::Hash;
use hnsd_names::{CoinView, NameBatch, NameSource, NameState};
use std::collections::{HashMap, HashSet};

/// The mutable state `MempoolAdmission` accumulates across `applyToOverlay`
/// calls: pending coins, pending NameState writes, and the set of outpoints
/// already claimed by an admitted transaction.
#[derive(Default)]
pub struct MempoolOverlay {
    pending_outputs: HashMap<Outpoint, Output>,
    spent_outpoints: HashSet<Outpoint>,
    names: NameBatch,
    /// Transactions admitted so far, in admission order, so a conflicting
    /// block connect can unwind precisely the entries it invalidates.
    admitted: Vec<Transaction>,
}

impl MempoolOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_spent(&self, outpoint: &Outpoint) -> bool {
        self.spent_outpoints.contains(outpoint)
    }

    pub fn pending_output(&self, outpoint: &Outpoint) -> Option<Output> {
        self.pending_outputs.get(outpoint).cloned()
    }

    pub fn name_batch(&self) -> &NameBatch {
        &self.names
    }

    /// Records `tx` as admitted: its outputs become visible to later
    /// lookups, its inputs become spent (future conflicting submissions are
    /// rejected), and any produced `NameState`s land in the names overlay.
    pub fn apply(&mut self, tx: &Transaction, name_writes: Vec<NameState>) {
        let txid = tx.id();
        for input in &tx.inputs {
            self.spent_outpoints.insert(input.outpoint);
        }
        for (index, output) in tx.outputs.iter().enumerate() {
            self.pending_outputs.insert(Outpoint::new(txid, index as u32), output.clone());
        }
        for state in name_writes {
            self.names.put(state);
        }
        self.admitted.push(tx.clone());
    }

    /// Reverts every admitted transaction that conflicts with a
    /// newly-connected block, i.e. that spends an outpoint the block itself
    /// spent. A full rebuild is simplest
    /// and correct: unconfirmed entries have no durable identity beyond
    /// this overlay, so dropping and replaying the survivors is equivalent
    /// to a surgical removal.
    pub fn revert_conflicting(&mut self, block_spent: &HashSet<Outpoint>) {
        let survivors: Vec<Transaction> =
            self.admitted.drain(..).filter(|tx| !tx.inputs.iter().any(|input| block_spent.contains(&input.outpoint))).collect();
        self.pending_outputs.clear();
        self.spent_outpoints.clear();
        self.names = NameBatch::new();
        // Re-threading NameState writes would require re-running apply_covenant
        // for every survivor; callers that need this should re-admit survivors
        // through `MempoolAdmission::verify`/`apply_to_overlay` rather than
        // relying on the stale names recorded here.
        for tx in survivors {
            for input in &tx.inputs {
                self.spent_outpoints.insert(input.outpoint);
            }
            let txid = tx.id();
            for (index, output) in tx.outputs.iter().enumerate() {
                self.pending_outputs.insert(Outpoint::new(txid, index as u32), output.clone());
            }
        }
    }
}

impl CoinView for MempoolOverlay {
    fn get_output(&self, outpoint: &Outpoint) -> Option<Output> {
        self.pending_output(outpoint)
    }
}

impl NameSource for MempoolOverlay {
    fn get_name(&self, name_hash: &Hash) -> Option<NameState> {
        self.names.get(&EmptySource, name_hash)
    }
}

/// `NameBatch::get` needs a fallback `NameSource` for names it hasn't
/// written; the overlay alone (without its confirmed base view) has none.
struct EmptySource;
impl NameSource for EmptySource {
    fn get_name(&self, _name_hash: &Hash) -> Option<NameState> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hnsd_addresses::{Address, Network};
    use hnsd_consensus_core::tx::{Covenant, Input};

    fn addr() -> Address {
        Address::new(Network::Regtest, 0, &[0u8; 20]).unwrap()
    }

    #[test]
    fn test_apply_makes_outputs_visible_and_marks_inputs_spent() {
        let mut overlay = MempoolOverlay::new();
        let input_outpoint = Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0);
        let tx = Transaction::new(0, vec![Input::new(input_outpoint, 0, vec![])], vec![Output::new(100, addr(), Covenant::none())], 0);

        overlay.apply(&tx, vec![]);
        assert!(overlay.is_spent(&input_outpoint));
        assert!(overlay.pending_output(&Outpoint::new(tx.id(), 0)).is_some());
    }

    #[test]
    fn test_revert_conflicting_drops_conflicting_tx() {
        let mut overlay = MempoolOverlay::new();
        let conflicting_outpoint = Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0);
        let survivor_outpoint = Outpoint::new(Hash::from_le_u64([2, 0, 0, 0]), 0);

        let conflicting_tx =
            Transaction::new(0, vec![Input::new(conflicting_outpoint, 0, vec![])], vec![Output::new(100, addr(), Covenant::none())], 0);
        let survivor_tx =
            Transaction::new(0, vec![Input::new(survivor_outpoint, 0, vec![])], vec![Output::new(100, addr(), Covenant::none())], 1);

        overlay.apply(&conflicting_tx, vec![]);
        overlay.apply(&survivor_tx, vec![]);

        let mut block_spent = HashSet::new();
        block_spent.insert(conflicting_outpoint);
        overlay.revert_conflicting(&block_spent);

        assert!(!overlay.is_spent(&conflicting_outpoint));
        assert!(overlay.is_spent(&survivor_outpoint));
        assert!(overlay.pending_output(&Outpoint::new(survivor_tx.id(), 0)).is_some());
        assert!(overlay.pending_output(&Outpoint::new(conflicting_tx.id(), 0)).is_none());
    }
}
