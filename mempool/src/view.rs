//! `MempoolAdmission`: the `verify`/`applyToOverlay` admission adapter,
//! generic over whatever supplies the last confirmed view.

use crate::overlay::MempoolOverlay;
use hnsd_consensus_core::config::params::NetworkParams;
use hnsd_consensus_core::errors::tx::check_transaction_structure;
use hnsd_consensus_core::tx::{CovenantKind, Outpoint, Transaction};
use hnsd_hashes::Hash;
use hnsd_names::{apply_covenant, resolve_actions, CoinView, NameSource, NameState, RecentBlocks, VerifyError, VerifyResult};
use hnsd_txscript::{new_signature_cache, verify_witness, SignatureCache, VerifyFlags};
use std::sync::Arc;

/// The last confirmed chain state: a committed trie view (for `NameSource`),
/// the committed UTXO set (for `CoinView`), and its recent block-hash
/// history (for the `renewalBlockHash` recency check). The block-consensus
/// gate supplies the concrete implementation.
pub trait ConfirmedView: NameSource + CoinView + RecentBlocks {}
impl<T: NameSource + CoinView + RecentBlocks> ConfirmedView for T {}

/// Wraps a confirmed view with a pending-transaction overlay and a
/// `STANDARD_VERIFY_FLAGS` policy.
pub struct MempoolAdmission<V: ConfirmedView> {
    confirmed: V,
    overlay: MempoolOverlay,
    params: Arc<NetworkParams>,
    height: u32,
    sig_cache: SignatureCache,
}

/// Layers the overlay over the confirmed view for `CoinView`/`NameSource`
/// lookups during a single `verify` call.
struct LayeredView<'a, V> {
    confirmed: &'a V,
    overlay: &'a MempoolOverlay,
}

impl<'a, V: ConfirmedView> CoinView for LayeredView<'a, V> {
    fn get_output(&self, outpoint: &Outpoint) -> Option<hnsd_consensus_core::tx::Output> {
        self.overlay.pending_output(outpoint).or_else(|| self.confirmed.get_output(outpoint))
    }
}

impl<'a, V: ConfirmedView> NameSource for LayeredView<'a, V> {
    fn get_name(&self, name_hash: &Hash) -> Option<NameState> {
        self.overlay.name_batch().get(self.confirmed, name_hash)
    }
}

impl<V: ConfirmedView> MempoolAdmission<V> {
    pub fn new(confirmed: V, params: Arc<NetworkParams>, height: u32) -> Self {
        Self { confirmed, overlay: MempoolOverlay::new(), params, height, sig_cache: new_signature_cache(10_000) }
    }

    /// Non-committing pre-validation: structure, no double-spend against
    /// already-admitted entries, witness verification under `flags`, and
    /// covenant-transition validity against the layered view. Does not
    /// mutate the overlay.
    pub fn verify(&self, tx: &Transaction, flags: VerifyFlags) -> VerifyResult<()> {
        check_transaction_structure(tx)?;

        for input in &tx.inputs {
            if self.overlay.is_spent(&input.outpoint) {
                return Err(VerifyError::Conflict(input.outpoint));
            }
        }

        let view = LayeredView { confirmed: &self.confirmed, overlay: &self.overlay };

        for (index, input) in tx.inputs.iter().enumerate() {
            let spent = view.get_output(&input.outpoint).ok_or(VerifyError::MissingInput(input.outpoint))?;
            verify_witness(&input.witness, &spent.address, tx, index, spent.value, flags, &self.sig_cache)
                .map_err(|err| script_error_to_verify_error(err, flags))?;
        }

        let actions = resolve_actions(tx, &view, self.height)?;
        let mut batch = hnsd_names::NameBatch::new();
        for action in &actions {
            if action.covenant.kind != CovenantKind::None {
                let state = apply_covenant(&view, &batch, action, &self.params, &self.confirmed)?;
                batch.put(state);
            }
        }

        Ok(())
    }

    /// Admits `tx` into the overlay after `verify` has accepted it. Recomputes the resulting `NameState`s so the
    /// overlay reflects this transaction's effects for later dependents.
    pub fn apply_to_overlay(&mut self, tx: &Transaction) -> VerifyResult<()> {
        let view = LayeredView { confirmed: &self.confirmed, overlay: &self.overlay };
        let actions = resolve_actions(tx, &view, self.height)?;
        let mut batch = hnsd_names::NameBatch::new();
        for action in &actions {
            if action.covenant.kind != CovenantKind::None {
                let state = apply_covenant(&view, &batch, action, &self.params, &self.confirmed)?;
                batch.put(state);
            }
        }
        let writes: Vec<NameState> = batch.into_writes().into_values().collect();
        drop(view);
        self.overlay.apply(tx, writes);
        Ok(())
    }

    /// Retries admission against a newer confirmed view after the tip
    /// advances: replaces the confirmed
    /// base and drops any overlay entries that conflict with the new tip's
    /// spends.
    pub fn retarget(&mut self, confirmed: V, height: u32, block_spent: &std::collections::HashSet<Outpoint>) {
        self.confirmed = confirmed;
        self.height = height;
        self.overlay.revert_conflicting(block_spent);
    }
}

/// Converts a script-verification failure into the two coarse `VerifyError`
/// reasons the propagation policy distinguishes: the two
/// discourage-upgradable checks are policy-only (mempool/relay, never
/// grounds for banning a peer); every other script failure, including the
/// three mandatory-flag checks, is a consensus-level failure.
fn script_error_to_verify_error(err: hnsd_txscript_errors::ScriptError, _flags: VerifyFlags) -> VerifyError {
    use hnsd_txscript_errors::ScriptError::*;
    match err {
        DiscourageUpgradableNops(_) | DiscourageUpgradableWitnessProgram => VerifyError::NonMandatoryScriptVerifyFlagFailed(err),
        _ => VerifyError::MandatoryScriptVerifyFlagFailed(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hnsd_addresses::{Address, Network};
    use hnsd_consensus_core::tx::{Covenant, Input, Output};
    use std::collections::HashMap;

    struct FakeConfirmed {
        outputs: HashMap<Outpoint, Output>,
        names: HashMap<Hash, NameState>,
    }

    impl CoinView for FakeConfirmed {
        fn get_output(&self, outpoint: &Outpoint) -> Option<Output> {
            self.outputs.get(outpoint).cloned()
        }
    }
    impl NameSource for FakeConfirmed {
        fn get_name(&self, name_hash: &Hash) -> Option<NameState> {
            self.names.get(name_hash).cloned()
        }
    }
    impl RecentBlocks for FakeConfirmed {
        fn is_recent(&self, _hash: &Hash) -> bool {
            true
        }
    }

    fn addr() -> Address {
        Address::new(Network::Regtest, 0, &[7u8; 20]).unwrap()
    }

    #[test]
    fn test_conflict_rejected_after_admission() {
        let confirmed = FakeConfirmed { outputs: HashMap::new(), names: HashMap::new() };
        let mut mempool = MempoolAdmission::new(confirmed, NetworkParams::regtest(), 0);

        let spent = Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0);
        let tx_a = Transaction::new(0, vec![Input::new(spent, 0, vec![])], vec![Output::new(10, addr(), Covenant::none())], 0);
        let tx_b = Transaction::new(0, vec![Input::new(spent, 0, vec![])], vec![Output::new(20, addr(), Covenant::none())], 1);

        mempool.apply_to_overlay(&tx_a).unwrap();
        assert!(matches!(mempool.verify(&tx_b, VerifyFlags::STANDARD), Err(VerifyError::Conflict(_))));
    }

    #[test]
    fn test_missing_input_rejected() {
        let confirmed = FakeConfirmed { outputs: HashMap::new(), names: HashMap::new() };
        let mempool = MempoolAdmission::new(confirmed, NetworkParams::regtest(), 0);
        let missing = Outpoint::new(Hash::from_le_u64([9, 9, 9, 9]), 0);
        let tx = Transaction::new(0, vec![Input::new(missing, 0, vec![])], vec![Output::new(10, addr(), Covenant::none())], 0);
        assert!(matches!(mempool.verify(&tx, VerifyFlags::STANDARD), Err(VerifyError::MissingInput(_))));
    }
}
