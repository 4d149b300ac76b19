//! The block/tx consensus gate: applies every
//! covenant-bearing output of every transaction in a block to the
//! name-auction state machine, atomically, against the authenticated trie
//! plus the committed UTXO set, following an "exclusive view, validated
//! batch, commit-or-reject" pipeline-stage shape.

use crate::block::Block;
use crate::chain_view::ChainView;
use hnsd_consensus_core::config::params::NetworkParams;
use hnsd_consensus_core::errors::tx::check_transaction_structure;
use hnsd_consensus_core::tx::{CovenantKind, Outpoint, Output};
use hnsd_hashes::Hash;
use hnsd_names::{apply_covenant, resolve_actions, CoinView, NameBatch, NameSource, NameState, RecentBlocks, VerifyError, VerifyResult};
use hnsd_trie::{CommitSchedule, TrieView, UrkelTrie};
use hnsd_txscript::{new_signature_cache, SigCheckJob, SigCheckPool, SignatureCache, VerifyFlags};
use hnsd_txscript_errors::ScriptError;
use log::{debug, info};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// The bounded history of committed block ids `ConsensusGate` checks a
/// RENEW/REGISTER's `renewalBlockHash` against. Never includes the block
/// currently being validated, only ones already connected before it.
struct RecentBlockHistory {
    hashes: VecDeque<Hash>,
    capacity: usize,
}

impl RecentBlockHistory {
    fn new(genesis_tip: Hash, capacity: usize) -> Self {
        let mut hashes = VecDeque::with_capacity(capacity.max(1));
        hashes.push_back(genesis_tip);
        Self { hashes, capacity: capacity.max(1) }
    }

    fn push(&mut self, hash: Hash) {
        if self.hashes.len() >= self.capacity {
            self.hashes.pop_front();
        }
        self.hashes.push_back(hash);
    }

    fn to_vec(&self) -> Vec<Hash> {
        self.hashes.iter().copied().collect()
    }
}

impl RecentBlocks for RecentBlockHistory {
    fn is_recent(&self, hash: &Hash) -> bool {
        self.hashes.contains(hash)
    }
}

/// Reads the effective `NameState` through the pending-commit overlay
/// first, falling back to the last committed trie root; the
/// seam `hnsd-names::apply_covenant` needs without depending on `hnsd-trie`
/// directly.
struct GateNameSource<'a> {
    schedule: &'a CommitSchedule,
    trie: &'a UrkelTrie,
}

impl NameSource for GateNameSource<'_> {
    fn get_name(&self, name_hash: &Hash) -> Option<NameState> {
        self.schedule.get(self.trie, name_hash).and_then(|bytes| NameState::decode(&bytes).ok())
    }
}

/// An owned point-in-time copy of a gate's committed chain view (see
/// [`ConsensusGate::snapshot`]): the same `CommitSchedule`-over-`UrkelTrie`
/// read pattern as `GateNameSource`, plus the UTXO set and a copy of the
/// recent-block-hash history, bundled into a value external readers
/// (mempool admission, a future RPC layer) can hold past the lifetime of
/// any single `SessionReadGuard`.
pub struct GateSnapshot<V> {
    view: V,
    trie: UrkelTrie,
    schedule: CommitSchedule,
    recent_blocks: Vec<Hash>,
}

impl<V: CoinView> CoinView for GateSnapshot<V> {
    fn get_output(&self, outpoint: &Outpoint) -> Option<hnsd_consensus_core::tx::Output> {
        self.view.get_output(outpoint)
    }
}

impl<V> NameSource for GateSnapshot<V> {
    fn get_name(&self, name_hash: &Hash) -> Option<NameState> {
        self.schedule.get(&self.trie, name_hash).and_then(|bytes| NameState::decode(&bytes).ok())
    }
}

impl<V> RecentBlocks for GateSnapshot<V> {
    fn is_recent(&self, hash: &Hash) -> bool {
        self.recent_blocks.contains(hash)
    }
}

/// Applies connected blocks' covenant effects against a `ChainView`'s
/// committed UTXO set and an owned authenticated trie. One `ConsensusGate`
/// is the sole writer for its chain view: callers serialize
/// `connect_block` calls through an `hnsd-consensusmanager::SessionLock`.
pub struct ConsensusGate<V: ChainView> {
    view: V,
    trie: UrkelTrie,
    schedule: CommitSchedule,
    params: Arc<NetworkParams>,
    tip: Hash,
    height: u32,
    recent_blocks: RecentBlockHistory,
    sigcheck: SigCheckPool,
    sig_cache: SignatureCache,
}

impl<V: ChainView> ConsensusGate<V> {
    pub fn new(view: V, params: Arc<NetworkParams>, genesis_tip: Hash, sigcheck_threads: usize) -> Self {
        let trie = UrkelTrie::new();
        let schedule = CommitSchedule::new(params.tree_interval, trie.root());
        let recent_blocks = RecentBlockHistory::new(genesis_tip, params.renewal_maturity as usize);
        Self {
            view,
            trie,
            schedule,
            params,
            tip: genesis_tip,
            height: 0,
            recent_blocks,
            sigcheck: SigCheckPool::new(sigcheck_threads),
            sig_cache: new_signature_cache(100_000),
        }
    }

    pub fn tip(&self) -> Hash {
        self.tip
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn committed_tree_root(&self) -> Hash {
        self.schedule.last_committed_root()
    }

    /// Seeds a coin directly into the view without going through
    /// `connect_block`: the only way an external caller can hand a fresh
    /// gate its first spendable outputs, since nothing upstream of this
    /// crate mints a genesis coinbase.
    pub fn seed_coin(&mut self, outpoint: Outpoint, output: Output) {
        self.view.create_output(outpoint, output);
    }

    /// Looks up a name's current committed state through the same
    /// schedule-over-trie read path `apply_covenant` itself uses.
    pub fn name_state(&self, name_hash: &Hash) -> Option<NameState> {
        GateNameSource { schedule: &self.schedule, trie: &self.trie }.get_name(name_hash)
    }

    /// Looks up a coin directly in the committed view.
    pub fn coin(&self, outpoint: &Outpoint) -> Option<Output> {
        self.view.get_output(outpoint)
    }

    /// An owned, point-in-time copy of the committed chain view: the
    /// `CoinView`/`NameSource` pair `hnsd-mempool::MempoolAdmission` (and any
    /// future RPC/DNS reader) needs, decoupled from this gate's lifetime so
    /// it can outlive a single `SessionReadGuard` borrow. A full deep clone
    /// of the trie and UTXO set, taken once per mempool refresh rather than
    /// per lookup.
    pub fn snapshot(&self) -> GateSnapshot<V>
    where
        V: Clone,
    {
        GateSnapshot { view: self.view.clone(), trie: self.trie.clone(), schedule: self.schedule.clone(), recent_blocks: self.recent_blocks.to_vec() }
    }

    /// Validates and applies `block`'s every output covenant, in tx order
    /// then input/output order within a tx, against the
    /// current view. Every invariant below is checked against read-only
    /// snapshots (the view and cloned trie/schedule state); nothing is
    /// mutated until every check has passed, so any failure leaves the gate
    /// exactly as it was before the call.
    pub fn connect_block(&mut self, block: &Block) -> VerifyResult<()> {
        if block.header.prev_block != self.tip {
            return Err(VerifyError::BadPrevBlock);
        }
        let height = block.header.height;

        for tx in &block.transactions {
            check_transaction_structure(tx)?;
        }

        self.verify_signatures(block)?;

        let batch = self.resolve_covenants(block, height)?;

        let (new_trie, new_schedule) = self.stage_and_commit(batch, height, block.header.tree_root)?;

        // Every check above passed: apply the block's UTXO effects and
        // adopt the staged trie/schedule as the new committed state.
        for tx in &block.transactions {
            let txid = tx.id();
            for input in &tx.inputs {
                self.view.spend_output(&input.outpoint);
            }
            for (index, output) in tx.outputs.iter().enumerate() {
                self.view.create_output(Outpoint::new(txid, index as u32), output.clone());
            }
        }
        self.trie = new_trie;
        self.schedule = new_schedule;
        self.tip = block.header.id();
        self.height = height;
        self.recent_blocks.push(self.tip);

        info!("connected block at height {height}, tip {}", self.tip);
        Ok(())
    }

    /// Verifies every input's witness in parallel over the current
    /// (unmutated) UTXO set.
    fn verify_signatures(&self, block: &Block) -> VerifyResult<()> {
        let mut resolved = Vec::new();
        for tx in &block.transactions {
            for input in &tx.inputs {
                let spent = self.view.get_output(&input.outpoint).ok_or(VerifyError::MissingInput(input.outpoint))?;
                resolved.push(spent);
            }
        }

        let mut jobs = Vec::with_capacity(resolved.len());
        let mut resolved_iter = resolved.iter();
        for tx in &block.transactions {
            for input_index in 0..tx.inputs.len() {
                let spent = resolved_iter.next().expect("one resolved output per input, collected above in the same order");
                jobs.push(SigCheckJob { tx, input_index, spent_address: &spent.address, spent_value: spent.value });
            }
        }

        self.sigcheck.verify_all(&jobs, VerifyFlags::MANDATORY, &self.sig_cache).map_err(script_error_to_verify_error)
    }

    /// Walks every transaction's covenant-bearing outputs in order,
    /// enforcing invariant 2 (at most one input per block spends a given
    /// NameState's owner outpoint) and the one-action-per-name-per-block
    /// rule, and stages the resulting `NameState`s into a `NameBatch`
    /// without touching the committed trie.
    fn resolve_covenants(&self, block: &Block, height: u32) -> VerifyResult<NameBatch> {
        let source = GateNameSource { schedule: &self.schedule, trie: &self.trie };
        let mut batch = NameBatch::new();
        let mut used_owner_outpoints = HashSet::new();
        let mut seen_name_actions = HashSet::new();

        for tx in &block.transactions {
            let actions = resolve_actions(tx, &self.view, height)?;
            for action in &actions {
                if action.covenant.kind == CovenantKind::None {
                    continue;
                }
                if let Some((_, outpoint)) = action.spent_covenant {
                    if !used_owner_outpoints.insert(outpoint) {
                        return Err(VerifyError::Conflict(outpoint));
                    }
                }
                let state = apply_covenant(&source, &batch, action, &self.params, &self.recent_blocks)?;
                if !seen_name_actions.insert(state.name_hash) {
                    return Err(VerifyError::DuplicateNameAction(state.name_hash));
                }
                batch.put(state);
            }
        }

        Ok(batch)
    }

    /// Stages `batch`'s writes into cloned trie/schedule state and, on a
    /// commit boundary, flushes and compares the resulting root against
    /// `declared_tree_root` — entirely against clones, so a `bad-tree-root`
    /// failure never touches the gate's real committed state.
    fn stage_and_commit(&self, batch: NameBatch, height: u32, declared_tree_root: Hash) -> VerifyResult<(UrkelTrie, CommitSchedule)> {
        let mut trial_trie = self.trie.clone();
        let mut trial_schedule = self.schedule.clone();

        for (name_hash, state) in batch.into_writes() {
            trial_schedule.stage(name_hash, Some(state.encode()));
        }

        if let Some(computed) = trial_schedule.commit_if_due(&mut trial_trie, height) {
            if computed != declared_tree_root {
                return Err(VerifyError::BadTreeRoot { expected: declared_tree_root, computed });
            }
            debug!("trie committed at height {height}, root {computed}");
        }

        Ok((trial_trie, trial_schedule))
    }
}

/// Converts a script-verification failure into the two coarse `VerifyError`
/// reasons the propagation policy distinguishes (mirrors `hnsd-mempool`'s
/// identically-named helper): the two discourage-upgradable checks are
/// policy-only, every other script failure is consensus-level.
fn script_error_to_verify_error(err: ScriptError) -> VerifyError {
    use ScriptError::*;
    match err {
        DiscourageUpgradableNops(_) | DiscourageUpgradableWitnessProgram => VerifyError::NonMandatoryScriptVerifyFlagFailed(err),
        _ => VerifyError::MandatoryScriptVerifyFlagFailed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockHeader;
    use crate::chain_view::InMemoryUtxoSet;
    use hnsd_addresses::{Address, Network};
    use hnsd_consensus_core::tx::{Covenant, Input, Output, Transaction};

    /// A reserved-future-version address: `verify_witness`
    /// always accepts these without inspecting the witness, so tests that
    /// aren't exercising script verification itself can use a trivial one.
    fn addr(tag: u8) -> Address {
        Address::new(Network::Regtest, 1, &[tag; 20]).unwrap()
    }

    fn gate() -> ConsensusGate<InMemoryUtxoSet> {
        ConsensusGate::new(InMemoryUtxoSet::new(), NetworkParams::regtest(), Hash::default(), 1)
    }

    #[test]
    fn test_rejects_wrong_prev_block() {
        let mut gate = gate();
        let header = BlockHeader { height: 1, prev_block: Hash::from_le_u64([9, 9, 9, 9]), tree_root: Hash::default(), time: 0 };
        let block = Block::new(header, vec![]);
        assert!(matches!(gate.connect_block(&block), Err(VerifyError::BadPrevBlock)));
    }

    #[test]
    fn test_connects_empty_block_and_advances_tip() {
        let mut gate = gate();
        let header = BlockHeader { height: 1, prev_block: Hash::default(), tree_root: gate.committed_tree_root(), time: 0 };
        let block = Block::new(header.clone(), vec![]);
        gate.connect_block(&block).unwrap();
        assert_eq!(gate.tip(), header.id());
        assert_eq!(gate.height(), 1);
    }

    #[test]
    fn test_plain_value_transfer_moves_utxo() {
        let mut gate = gate();
        let genesis_outpoint = Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0);
        gate.view.create_output(genesis_outpoint, Output::new(1000, addr(1), Covenant::none()));

        let tx = Transaction::new(0, vec![Input::new(genesis_outpoint, 0, vec![vec![]])], vec![Output::new(1000, addr(2), Covenant::none())], 0);
        let header = BlockHeader { height: 1, prev_block: Hash::default(), tree_root: gate.committed_tree_root(), time: 0 };
        let block = Block::new(header, vec![tx.clone()]);

        gate.connect_block(&block).unwrap();
        assert!(gate.view.get_output(&genesis_outpoint).is_none());
        assert!(gate.view.get_output(&Outpoint::new(tx.id(), 0)).is_some());
    }

    #[test]
    fn test_rejects_bad_tree_root_without_mutating_state() {
        let mut gate = gate();
        let header = BlockHeader { height: 5, prev_block: Hash::default(), tree_root: Hash::from_le_u64([1, 1, 1, 1]), time: 0 };

        let open_outpoint = Outpoint::new(Hash::from_le_u64([2, 0, 0, 0]), 0);
        let tx = Transaction::new(
            0,
            vec![Input::new(open_outpoint, 0, vec![])],
            vec![Output::new(0, addr(1), Covenant { kind: CovenantKind::Open, items: vec![b"example".to_vec(), 0u32.to_le_bytes().to_vec()] })],
            0,
        );
        gate.view.create_output(open_outpoint, Output::new(0, addr(1), Covenant::none()));

        let block = Block::new(header, vec![tx]);
        assert!(matches!(gate.connect_block(&block), Err(VerifyError::BadTreeRoot { .. })));
        assert_eq!(gate.height(), 0, "failed connect must not advance height");
        assert_eq!(gate.committed_tree_root(), gate.trie.root(), "clone-then-commit must not mutate the live trie on rejection");
    }
}
