//! Walks a single name through every phase of its auction as a sequence of `ConsensusGate::connect_block` calls:
//! OPEN, a losing and a winning BID, their REVEALs, REGISTER, REDEEM,
//! TRANSFER and FINALIZE, rejecting each transition attempted outside its
//! window. Each covenant action for this name gets its own block: a block
//! may carry at most one action per name.
//!
//! Block heights deliberately avoid every multiple of `tree_interval` (5):
//! `connect_block` only requires hash-chaining via `prev_block`, not
//! height continuity, so a run that never lands on a trie-commit boundary
//! never needs the real Urkel root a commit would require computing.

use hnsd_addresses::{Address, Network};
use hnsd_consensus::chain_view::InMemoryUtxoSet;
use hnsd_consensus::{Block, BlockHeader, ConsensusGate};
use hnsd_consensus_core::config::params::NetworkParams;
use hnsd_consensus_core::rules::name_hash;
use hnsd_consensus_core::tx::{Covenant, CovenantKind, Input, Output, Outpoint, Transaction};
use hnsd_hashes::Hash;
use hnsd_names::blind::blind;
use hnsd_names::{NameState, VerifyError};

/// A reserved-future-version address: `verify_witness` accepts these
/// unconditionally, so a block's inputs can carry empty witnesses without
/// exercising script verification itself.
fn addr(tag: u8) -> Address {
    Address::new(Network::Regtest, 1, &[tag; 20]).unwrap()
}

fn genesis_outpoint(tag: u8) -> Outpoint {
    Outpoint::new(Hash::from_le_u64([tag as u64, 0, 0, 0]), 0)
}

fn connect(gate: &mut ConsensusGate<InMemoryUtxoSet>, height: u32, txs: Vec<Transaction>) {
    let header = BlockHeader { height, prev_block: gate.tip(), tree_root: gate.committed_tree_root(), time: height };
    let block = Block::new(header, txs);
    gate.connect_block(&block).unwrap_or_else(|e| panic!("block at height {height} should connect: {e}"));
}

fn expect_rejected(gate: &mut ConsensusGate<InMemoryUtxoSet>, height: u32, txs: Vec<Transaction>) -> VerifyError {
    let tip_before = gate.tip();
    let height_before = gate.height();
    let header = BlockHeader { height, prev_block: gate.tip(), tree_root: gate.committed_tree_root(), time: height };
    let block = Block::new(header, txs);
    let err = gate.connect_block(&block).expect_err(&format!("block at height {height} must be rejected"));
    assert_eq!(gate.tip(), tip_before, "a rejected block must not move the tip");
    assert_eq!(gate.height(), height_before, "a rejected block must not advance height");
    err
}

fn name_state(gate: &ConsensusGate<InMemoryUtxoSet>, name: &[u8]) -> NameState {
    let hash = name_hash(name);
    gate.name_state(&hash).expect("name should exist once OPENed")
}

#[test]
fn test_auction_end_to_end() {
    let name = b"example".as_slice();
    let name_hash_value = name_hash(name);
    let params = NetworkParams::regtest();
    let mut gate = ConsensusGate::new(InMemoryUtxoSet::new(), params.clone(), Hash::default(), 1);

    gate.seed_coin(genesis_outpoint(1), Output::new(1_000_000, addr(1), Covenant::none()));
    gate.seed_coin(genesis_outpoint(2), Output::new(1_000_000, addr(2), Covenant::none()));
    gate.seed_coin(genesis_outpoint(3), Output::new(1_000_000, addr(3), Covenant::none()));

    // Height 1: OPEN starts the auction. BIDDING begins at 1 + tree_interval = 6.
    let open_tx = Transaction::new(
        0,
        vec![Input::new(genesis_outpoint(1), 0, vec![])],
        vec![Output::new(0, addr(1), Covenant { kind: CovenantKind::Open, items: vec![name.to_vec(), 0u32.to_le_bytes().to_vec()] })],
        0,
    );
    connect(&mut gate, 1, vec![open_tx]);
    assert!(name_state(&gate, name).is_bidding(7, &params));
    // The NameState's generation height, cited by every subsequent
    // covenant's `openHeight` item: the block that OPENed it.
    let open_height = name_state(&gate, name).height.to_le_bytes().to_vec();

    // A losing bidder: bids 50_000, reveals honestly, never wins, and is
    // later refunded via REDEEM.
    let losing_nonce = [1u8; 32];
    let losing_bid_value = 50_000u64;
    let losing_blind_hash = blind(losing_bid_value, &losing_nonce);

    // The eventual winner: bids 100_000.
    let winning_nonce = [2u8; 32];
    let winning_bid_value = 100_000u64;
    let winning_blind_hash = blind(winning_bid_value, &winning_nonce);

    let losing_bid_tx = Transaction::new(
        0,
        vec![Input::new(genesis_outpoint(2), 0, vec![])],
        vec![Output::new(
            60_000,
            addr(2),
            Covenant { kind: CovenantKind::Bid, items: vec![name_hash_value.as_bytes().to_vec(), losing_blind_hash.as_bytes().to_vec(), open_height.clone()] },
        )],
        0,
    );
    let winning_bid_tx = Transaction::new(
        0,
        vec![Input::new(genesis_outpoint(3), 0, vec![])],
        vec![Output::new(
            110_000,
            addr(3),
            Covenant { kind: CovenantKind::Bid, items: vec![name_hash_value.as_bytes().to_vec(), winning_blind_hash.as_bytes().to_vec(), open_height.clone()] },
        )],
        0,
    );

    // Height 6 is still OPEN's commit boundary (1 + tree_interval): not yet biddable.
    let err = expect_rejected(&mut gate, 6, vec![losing_bid_tx.clone()]);
    assert!(matches!(err, VerifyError::BadCovenantPhase(CovenantKind::Bid)));

    // A block may carry at most one covenant action per name, so the two
    // bids land in separate blocks, both inside the BIDDING window (7..=11).
    connect(&mut gate, 7, vec![losing_bid_tx.clone()]);
    connect(&mut gate, 8, vec![winning_bid_tx.clone()]);

    let losing_bid_outpoint = Outpoint::new(losing_bid_tx.id(), 0);
    let winning_bid_outpoint = Outpoint::new(winning_bid_tx.id(), 0);

    // REVEAL window is 12..=21.
    let losing_reveal_tx = Transaction::new(
        0,
        vec![Input::new(losing_bid_outpoint, 0, vec![])],
        vec![Output::new(losing_bid_value, addr(2), Covenant { kind: CovenantKind::Reveal, items: vec![name.to_vec(), losing_nonce.to_vec(), open_height.clone()] })],
        0,
    );
    let winning_reveal_tx = Transaction::new(
        0,
        vec![Input::new(winning_bid_outpoint, 0, vec![])],
        vec![Output::new(winning_bid_value, addr(3), Covenant { kind: CovenantKind::Reveal, items: vec![name.to_vec(), winning_nonce.to_vec(), open_height.clone()] })],
        0,
    );

    let err = expect_rejected(&mut gate, 11, vec![losing_reveal_tx.clone()]);
    assert!(matches!(err, VerifyError::BadCovenantPhase(CovenantKind::Reveal)));

    // Height 12: the loser reveals; height 13: the winner reveals.
    connect(&mut gate, 12, vec![losing_reveal_tx.clone()]);
    connect(&mut gate, 13, vec![winning_reveal_tx.clone()]);

    let state_after_reveal = name_state(&gate, name);
    assert_eq!(state_after_reveal.highest, winning_bid_value, "second-price auction tracks the highest reveal");
    assert_eq!(state_after_reveal.value, losing_bid_value, "second-price auction owes the second-highest reveal");
    let winning_reveal_outpoint = Outpoint::new(winning_reveal_tx.id(), 0);
    assert_eq!(state_after_reveal.highest_outpoint, Some(winning_reveal_outpoint));

    let renewal_block_hash = gate.tip();
    let register_tx = Transaction::new(
        0,
        vec![Input::new(winning_reveal_outpoint, 0, vec![])],
        vec![Output::new(
            0,
            addr(3),
            Covenant {
                kind: CovenantKind::Register,
                items: vec![name.to_vec(), b"initial resource data".to_vec(), renewal_block_hash.as_bytes().to_vec(), open_height.clone()],
            },
        )],
        0,
    );

    // Height 21 is still inside the REVEAL window (bidding_end + reveal_period): not yet CLOSED.
    let err = expect_rejected(&mut gate, 21, vec![register_tx.clone()]);
    assert!(matches!(err, VerifyError::BadCovenantPhase(CovenantKind::Register)));

    // Height 22: CLOSED. The winner registers ownership.
    connect(&mut gate, 22, vec![register_tx.clone()]);

    let register_outpoint = Outpoint::new(register_tx.id(), 0);
    let state_after_register = name_state(&gate, name);
    assert_eq!(state_after_register.owner, register_outpoint);
    assert_eq!(state_after_register.data, b"initial resource data".to_vec());
    assert_eq!(state_after_register.renewal, 22);

    // Height 23: the losing bidder redeems their REVEAL output, a separate
    // block since REGISTER already claimed this name's one action at 22.
    let losing_reveal_outpoint = Outpoint::new(losing_reveal_tx.id(), 0);
    let redeem_tx = Transaction::new(
        0,
        vec![Input::new(losing_reveal_outpoint, 0, vec![])],
        vec![Output::new(losing_bid_value, addr(2), Covenant { kind: CovenantKind::Redeem, items: vec![name.to_vec(), open_height.clone()] })],
        0,
    );
    connect(&mut gate, 23, vec![redeem_tx.clone()]);
    assert!(gate.coin(&Outpoint::new(redeem_tx.id(), 0)).is_some(), "redeemed refund output exists");

    // Height 24: the new owner begins transferring the name to another address.
    let transfer_destination = addr(4);
    let transfer_tx = Transaction::new(
        0,
        vec![Input::new(register_outpoint, 0, vec![])],
        vec![Output::new(
            0,
            addr(3),
            Covenant { kind: CovenantKind::Transfer, items: vec![name.to_vec(), transfer_destination.hash.to_vec(), open_height.clone()] },
        )],
        0,
    );
    connect(&mut gate, 24, vec![transfer_tx.clone()]);

    let transfer_outpoint = Outpoint::new(transfer_tx.id(), 0);
    let state_after_transfer = name_state(&gate, name);
    assert_eq!(state_after_transfer.transfer, 24);
    assert_eq!(state_after_transfer.owner, transfer_outpoint, "TRANSFER re-anchors the owner chain to its own output");

    let finalize_tx = Transaction::new(
        0,
        vec![Input::new(transfer_outpoint, 0, vec![])],
        vec![Output::new(0, transfer_destination, Covenant { kind: CovenantKind::Finalize, items: vec![name.to_vec(), open_height.clone()] })],
        0,
    );

    // Height 33 is short of transfer(24) + transfer_lockup(10) = 34.
    let err = expect_rejected(&mut gate, 33, vec![finalize_tx.clone()]);
    assert!(matches!(err, VerifyError::BadTransferLockup));

    // Height 34: the lockup has elapsed, FINALIZE completes the transfer.
    connect(&mut gate, 34, vec![finalize_tx.clone()]);

    let finalize_outpoint = Outpoint::new(finalize_tx.id(), 0);
    let final_state = name_state(&gate, name);
    assert_eq!(final_state.owner, finalize_outpoint);
    assert_eq!(final_state.transfer, 0, "FINALIZE clears the pending-transfer marker");
    assert_eq!(final_state.data, b"initial resource data".to_vec(), "FINALIZE does not disturb the resource record");
}
