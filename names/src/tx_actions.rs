//! Resolves a transaction's covenant-bearing outputs into `CovenantAction`s
//! by pairing each with the input (if any) that spends its accepted
//! antecedent covenant.

use crate::auction::CovenantAction;
use crate::covenant::{accepted_input_kinds, parse_bid, parse_reveal};
use crate::errors::{VerifyError, VerifyResult};
use hnsd_consensus_core::tx::{CovenantKind, Output, Outpoint, Transaction};
use std::collections::HashSet;

/// Looks up the output an input spends, independent of whether that output
/// lives in the confirmed UTXO set or an unconfirmed mempool overlay. The block-consensus gate and the mempool adapter each supply
/// their own implementation over their respective views.
pub trait CoinView {
    fn get_output(&self, outpoint: &Outpoint) -> Option<Output>;
}

/// Verifies a REVEAL's `(name, nonce)` against the blind commitment stored
/// in the BID output it spends.
/// `apply_covenant` itself only has the antecedent's *kind*, not its
/// items, so this is the one place both covenants' items are in scope at
/// once.
fn check_blind(bid_items: &[Vec<u8>], reveal_items: &[Vec<u8>], revealed_value: u64) -> VerifyResult<()> {
    let bid = parse_bid(bid_items)?;
    let reveal = parse_reveal(reveal_items)?;
    if hnsd_consensus_core::rules::name_hash(&reveal.name) != bid.name_hash {
        return Err(VerifyError::BadNameHash);
    }
    if !crate::blind::verify_blind(&bid.blind_hash, revealed_value, &reveal.nonce) {
        return Err(VerifyError::BadBlind);
    }
    Ok(())
}

/// Builds one `CovenantAction` per covenant-bearing output of `tx`, at
/// `current_height`. Each action's antecedent is the first not-yet-claimed
/// input (in input order) whose spent output carries a covenant kind this
/// output's kind accepts; a kind with no accepted antecedents (CLAIM/OPEN/
/// BID) is never paired with one.
pub fn resolve_actions<C: CoinView>(tx: &Transaction, coin_view: &C, current_height: u32) -> VerifyResult<Vec<CovenantAction>> {
    let mut used_inputs = HashSet::new();
    let mut actions = Vec::with_capacity(tx.outputs.len());
    let txid = tx.id();

    for (output_index, output) in tx.outputs.iter().enumerate() {
        if output.covenant.kind == CovenantKind::None {
            continue;
        }

        let mut spent_covenant = None;
        let mut spent_output_value = None;
        let mut spent_input_index = None;

        if let Some(allowed) = accepted_input_kinds(output.covenant.kind) {
            for (input_index, input) in tx.inputs.iter().enumerate() {
                if used_inputs.contains(&input_index) {
                    continue;
                }
                let Some(prev) = coin_view.get_output(&input.outpoint) else { continue };
                if allowed.contains(&prev.covenant.kind) {
                    if output.covenant.kind == CovenantKind::Reveal && prev.covenant.kind == CovenantKind::Bid {
                        check_blind(&prev.covenant.items, &output.covenant.items, output.value)?;
                    }
                    spent_covenant = Some((prev.covenant.kind, input.outpoint));
                    spent_output_value = Some(prev.value);
                    spent_input_index = Some(input_index as u32);
                    used_inputs.insert(input_index);
                    break;
                }
            }
            if spent_covenant.is_none() {
                return Err(VerifyError::BadCovenantAncestor);
            }
        }

        actions.push(CovenantAction {
            covenant: output.covenant.clone(),
            txid,
            output_index: output_index as u32,
            output_value: output.value,
            spent_covenant,
            spent_output_value,
            spent_input_index,
            current_height,
        });
    }

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hnsd_addresses::{Address, Network};
    use hnsd_consensus_core::tx::{Covenant, Input};
    use hnsd_hashes::Hash;
    use std::collections::HashMap;

    struct MapCoinView(HashMap<Outpoint, Output>);
    impl CoinView for MapCoinView {
        fn get_output(&self, outpoint: &Outpoint) -> Option<Output> {
            self.0.get(outpoint).cloned()
        }
    }

    fn addr() -> Address {
        Address::new(Network::Regtest, 0, &[0u8; 20]).unwrap()
    }

    #[test]
    fn test_open_needs_no_antecedent() {
        let tx = Transaction::new(
            0,
            vec![Input::new(Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0), 0, vec![])],
            vec![Output::new(0, addr(), Covenant { kind: CovenantKind::Open, items: vec![b"example".to_vec(), 0u32.to_le_bytes().to_vec()] })],
            0,
        );
        let coin_view = MapCoinView(HashMap::new());
        let actions = resolve_actions(&tx, &coin_view, 0).unwrap();
        assert_eq!(actions.len(), 1);
        assert!(actions[0].spent_covenant.is_none());
    }

    #[test]
    fn test_reveal_pairs_with_bid_input() {
        let name_hash = hnsd_consensus_core::rules::name_hash(b"example");
        let nonce = [3u8; crate::blind::NONCE_LENGTH];
        let blind_hash = crate::blind::blind(500, &nonce);

        let bid_outpoint = Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0);
        let mut outputs = HashMap::new();
        outputs.insert(
            bid_outpoint,
            Output::new(1000, addr(), Covenant { kind: CovenantKind::Bid, items: vec![name_hash.as_bytes().to_vec(), blind_hash.as_bytes().to_vec(), 0u32.to_le_bytes().to_vec()] }),
        );
        let coin_view = MapCoinView(outputs);

        let tx = Transaction::new(
            0,
            vec![Input::new(bid_outpoint, 0, vec![])],
            vec![Output::new(500, addr(), Covenant { kind: CovenantKind::Reveal, items: vec![b"example".to_vec(), nonce.to_vec(), 0u32.to_le_bytes().to_vec()] })],
            0,
        );
        let actions = resolve_actions(&tx, &coin_view, 10).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].spent_covenant, Some((CovenantKind::Bid, bid_outpoint)));
        assert_eq!(actions[0].spent_output_value, Some(1000));
        assert_eq!(actions[0].spent_input_index, Some(0));
    }

    #[test]
    fn test_reveal_rejects_mismatched_blind() {
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let nonce = [7u8; crate::blind::NONCE_LENGTH];
        let wrong_blind_hash = crate::blind::blind(999, &nonce);

        let bid_outpoint = Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0);
        let mut outputs = HashMap::new();
        outputs.insert(
            bid_outpoint,
            Output::new(1000, addr(), Covenant { kind: CovenantKind::Bid, items: vec![name_hash.as_bytes().to_vec(), wrong_blind_hash.as_bytes().to_vec(), 0u32.to_le_bytes().to_vec()] }),
        );
        let coin_view = MapCoinView(outputs);

        let tx = Transaction::new(
            0,
            vec![Input::new(bid_outpoint, 0, vec![])],
            vec![Output::new(500, addr(), Covenant { kind: CovenantKind::Reveal, items: vec![name.to_vec(), nonce.to_vec(), 0u32.to_le_bytes().to_vec()] })],
            0,
        );
        assert!(matches!(resolve_actions(&tx, &coin_view, 10), Err(VerifyError::BadBlind)));
    }

    #[test]
    fn test_missing_antecedent_rejected() {
        let tx = Transaction::new(
            0,
            vec![Input::new(Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0), 0, vec![])],
            vec![Output::new(500, addr(), Covenant { kind: CovenantKind::Reveal, items: vec![b"example".to_vec(), vec![0u8; 32], 0u32.to_le_bytes().to_vec()] })],
            0,
        );
        let coin_view = MapCoinView(HashMap::new());
        assert!(matches!(resolve_actions(&tx, &coin_view, 10), Err(VerifyError::BadCovenantAncestor)));
    }

    #[test]
    fn test_each_input_used_at_most_once() {
        let name_hash = hnsd_consensus_core::rules::name_hash(b"example");
        let nonce = [3u8; crate::blind::NONCE_LENGTH];
        let blind_hash = crate::blind::blind(500, &nonce);

        let bid_outpoint = Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0);
        let mut outputs = HashMap::new();
        outputs.insert(
            bid_outpoint,
            Output::new(1000, addr(), Covenant { kind: CovenantKind::Bid, items: vec![name_hash.as_bytes().to_vec(), blind_hash.as_bytes().to_vec(), 0u32.to_le_bytes().to_vec()] }),
        );
        let coin_view = MapCoinView(outputs);

        let tx = Transaction::new(
            0,
            vec![Input::new(bid_outpoint, 0, vec![])],
            vec![
                Output::new(500, addr(), Covenant { kind: CovenantKind::Reveal, items: vec![b"example".to_vec(), nonce.to_vec(), 0u32.to_le_bytes().to_vec()] }),
                Output::new(500, addr(), Covenant { kind: CovenantKind::Reveal, items: vec![b"example".to_vec(), nonce.to_vec(), 0u32.to_le_bytes().to_vec()] }),
            ],
            0,
        );
        assert!(matches!(resolve_actions(&tx, &coin_view, 10), Err(VerifyError::BadCovenantAncestor)));
    }
}
