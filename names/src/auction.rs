//! The name-auction state transition function:
//! given a covenant-bearing output and the transaction input it's paired
//! with, decide whether the transition is legal and produce the resulting
//! `NameState`.

use crate::blind;
use crate::covenant::{self, accepted_input_kinds};
use crate::errors::{VerifyError, VerifyResult};
use crate::state::NameState;
use hnsd_consensus_core::config::params::NetworkParams;
use hnsd_consensus_core::tx::{Covenant, CovenantKind, Outpoint};
use hnsd_hashes::Hash;

/// Read access to the authenticated name trie,
/// abstracted so `apply_covenant` doesn't depend on `hnsd-trie` directly.
/// The block-consensus gate is expected to implement this over a
/// `hnsd-trie` snapshot plus the in-block overlay.
pub trait NameSource {
    fn get_name(&self, name_hash: &Hash) -> Option<NameState>;
}

/// Recent committed block hashes a RENEW/REGISTER's `renewalBlockHash` item
/// is checked against, so neither can be pre-signed arbitrarily far in
/// advance. The block-consensus gate implements this over the block ids it
/// has itself connected; it never includes the block currently being
/// validated, only ones already committed before it.
pub trait RecentBlocks {
    fn is_recent(&self, hash: &Hash) -> bool;
}

/// A block-local overlay of name-hash -> pending `NameState` writes, applied
/// on top of a `NameSource` so that multiple covenant actions in the same
/// block see each other's effects in transaction order.
#[derive(Default, Clone)]
pub struct NameBatch {
    writes: std::collections::HashMap<Hash, NameState>,
}

impl NameBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<S: NameSource>(&self, source: &S, name_hash: &Hash) -> Option<NameState> {
        self.writes.get(name_hash).cloned().or_else(|| source.get_name(name_hash))
    }

    pub fn put(&mut self, state: NameState) {
        self.writes.insert(state.name_hash, state);
    }

    pub fn into_writes(self) -> std::collections::HashMap<Hash, NameState> {
        self.writes
    }
}

/// Everything `apply_covenant` needs about the output being created and the
/// (optional) prior covenant output consumed to produce it, independent of
/// how the caller represents a full `Transaction`.
pub struct CovenantAction {
    pub covenant: Covenant,
    /// Id of the transaction this output belongs to, so a first-claiming
    /// action (CLAIM/REGISTER/FINALIZE) can record a real owner outpoint
    /// rather than just the output index.
    pub txid: Hash,
    pub output_index: u32,
    pub output_value: u64,
    /// The covenant kind + outpoint of the input this output's action
    /// continues from, if any.
    pub spent_covenant: Option<(CovenantKind, Outpoint)>,
    /// Coin value of the antecedent output named by `spent_covenant`, used
    /// by REDEEM to bound its refund against what the losing REVEAL
    /// actually locked.
    pub spent_output_value: Option<u64>,
    pub spent_input_index: Option<u32>,
    pub current_height: u32,
}

/// Applies one covenant action to the name-auction state machine, returning
/// the resulting `NameState`. Does not mutate `source`/`batch`;
/// callers insert the returned state via `NameBatch::put` once all of a
/// block's other invariants (value conservation across the whole tx, single
/// action per name per block, etc.) are confirmed by the caller.
pub fn apply_covenant<S: NameSource, R: RecentBlocks>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
    recent: &R,
) -> VerifyResult<NameState> {
    let kind = action.covenant.kind;
    let accepted = accepted_input_kinds(kind);

    match accepted {
        None => check_absent_antecedent(action)?,
        Some(allowed) => check_present_antecedent(action, allowed)?,
    }

    match kind {
        CovenantKind::Claim => apply_claim(action),
        CovenantKind::Open => apply_open(source, batch, action, params),
        CovenantKind::Bid => apply_bid(source, batch, action, params),
        CovenantKind::Reveal => apply_reveal(source, batch, action, params),
        CovenantKind::Redeem => apply_redeem(source, batch, action, params),
        CovenantKind::Register => apply_register(source, batch, action, params, recent),
        CovenantKind::Update => apply_update(source, batch, action, params),
        CovenantKind::Renew => apply_renew(source, batch, action, params, recent),
        CovenantKind::Transfer => apply_transfer(source, batch, action, params),
        CovenantKind::Finalize => apply_finalize(source, batch, action, params),
        CovenantKind::Revoke => apply_revoke(source, batch, action, params),
        CovenantKind::None => unreachable!("caller must not route NONE covenants through apply_covenant"),
    }
}

fn check_absent_antecedent(action: &CovenantAction) -> VerifyResult<()> {
    if action.spent_covenant.is_some() {
        return Err(VerifyError::BadCovenantAncestor);
    }
    Ok(())
}

fn check_present_antecedent(action: &CovenantAction, allowed: &[CovenantKind]) -> VerifyResult<()> {
    let (spent_kind, spent_outpoint) = action.spent_covenant.ok_or(VerifyError::BadCovenantAncestor)?;
    if !allowed.contains(&spent_kind) {
        return Err(VerifyError::BadCovenantAncestor);
    }
    // Ordering rule: the spent covenant input must not
    // sit after this action's own output in the same transaction, so a
    // single transaction can't "borrow" a still-pending action against
    // itself out of order. Equal indices are the common case (one input
    // continuing straight into one output) and are allowed.
    let spent_index = action.spent_input_index.ok_or(VerifyError::BadCovenantAncestor)?;
    if spent_index > action.output_index {
        return Err(VerifyError::BadOrdering(action.output_index, spent_outpoint));
    }
    Ok(())
}

/// Checks a continuing covenant's cited `openHeight` against the NameState's
/// own `height`: the anti-replay invariant that keeps an action signed
/// against one generation of a name from being replayed once the name has
/// expired/revoked and been re-opened into a new one.
fn check_open_height(state: &NameState, cited: u32) -> VerifyResult<()> {
    if state.height != cited {
        return Err(VerifyError::BadOpenHeight);
    }
    Ok(())
}

fn apply_claim(action: &CovenantAction) -> VerifyResult<NameState> {
    let claim = covenant::parse_claim(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&claim.name);
    let mut state = NameState::new(claim.name, name_hash, action.current_height);
    state.owner = Outpoint::new(action.txid, action.output_index);
    state.claimed = action.current_height;
    state.renewal = action.current_height;
    Ok(state)
}

fn apply_open<S: NameSource>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
) -> VerifyResult<NameState> {
    let open = covenant::parse_open(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&open.name);

    if let Some(existing) = batch.get(source, &name_hash) {
        if !existing.is_openable(action.current_height, params) {
            return Err(VerifyError::NameAlreadyOpen);
        }
    }

    Ok(NameState::new(open.name, name_hash, action.current_height))
}

fn apply_bid<S: NameSource>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
) -> VerifyResult<NameState> {
    let bid = covenant::parse_bid(&action.covenant.items)?;
    let mut state = batch.get(source, &bid.name_hash).ok_or(VerifyError::NameNotFound)?;
    check_open_height(&state, bid.open_height)?;
    if !state.is_bidding(action.current_height, params) {
        return Err(VerifyError::BadCovenantPhase(CovenantKind::Bid));
    }
    // BID's value is the masked coin value; real value/ownership are
    // determined at REVEAL, so the NameState itself is otherwise unchanged.
    let _ = action.output_value;
    state.name_hash = bid.name_hash;
    Ok(state)
}

/// Applying reveals strictly in increasing `(txid, outputIndex)` order
/// within a block (the caller's responsibility, for tie-break determinism)
/// makes the `>` comparisons below sufficient: an already-recorded leader
/// at a given value is never displaced by a later reveal of the same
/// value, so the earliest-applied, lexicographically smallest tied reveal
/// keeps the win.
fn apply_reveal<S: NameSource>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
) -> VerifyResult<NameState> {
    let reveal = covenant::parse_reveal(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&reveal.name);
    let mut state = batch.get(source, &name_hash).ok_or(VerifyError::NameNotFound)?;
    check_open_height(&state, reveal.open_height)?;

    if !state.is_reveal(action.current_height, params) {
        return Err(VerifyError::BadCovenantPhase(CovenantKind::Reveal));
    }

    // The spent BID's covenant carries `blindHash`; the caller resolves it
    // via the prior output's own covenant items, which `CovenantAction`
    // doesn't carry directly, so verification of `blindHash` itself happens
    // one level up (the caller has access to the spent output's Covenant).
    // Here we only apply the auction-pricing consequence of a valid reveal.
    let revealed_value = action.output_value;

    if state.highest_outpoint.is_none() {
        // First reveal of the auction: it is trivially both the high and
        // second price until a higher (or tying) reveal displaces it.
        state.value = revealed_value;
        state.highest = revealed_value;
        state.highest_outpoint = Some(Outpoint::new(action.txid, action.output_index));
        state.highest_reveal_height = action.current_height;
    } else if revealed_value > state.highest {
        // New leader: previous highest becomes the second price owed on win.
        state.value = state.highest;
        state.highest = revealed_value;
        state.highest_outpoint = Some(Outpoint::new(action.txid, action.output_index));
        state.highest_reveal_height = action.current_height;
    } else if revealed_value > state.value {
        // Doesn't unseat the leader, but raises the second price owed.
        state.value = revealed_value;
    }

    let _ = blind::NONCE_LENGTH;
    Ok(state)
}

fn apply_redeem<S: NameSource>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
) -> VerifyResult<NameState> {
    let redeem = covenant::parse_redeem(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&redeem.name);
    let state = batch.get(source, &name_hash).ok_or(VerifyError::NameNotFound)?;
    check_open_height(&state, redeem.open_height)?;

    if !state.is_closed(action.current_height, params) {
        return Err(VerifyError::BadCovenantPhase(CovenantKind::Redeem));
    }
    // REDEEM is the losing bidders' refund: the spent REVEAL must not be the
    // recorded auction winner.
    let (_, spent_outpoint) = action.spent_covenant.expect("checked by check_present_antecedent");
    if state.highest_outpoint == Some(spent_outpoint) {
        return Err(VerifyError::NotRevealWinner);
    }
    // The refund can't exceed what the spent REVEAL itself locked.
    let locked = action.spent_output_value.expect("checked by check_present_antecedent");
    if action.output_value > locked {
        return Err(VerifyError::BadValueConservation);
    }
    Ok(state)
}

fn apply_register<S: NameSource, R: RecentBlocks>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
    recent: &R,
) -> VerifyResult<NameState> {
    let register = covenant::parse_register(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&register.name);
    let mut state = batch.get(source, &name_hash).ok_or(VerifyError::NameNotFound)?;
    check_open_height(&state, register.open_height)?;

    if !state.is_closed(action.current_height, params) {
        return Err(VerifyError::BadCovenantPhase(CovenantKind::Register));
    }
    let (_, spent_outpoint) = action.spent_covenant.expect("checked by check_present_antecedent");
    if state.highest_outpoint != Some(spent_outpoint) {
        return Err(VerifyError::NotRevealWinner);
    }
    // The winner may only claim ownership at (at most) the second-highest
    // bid; anything above that is not a legal REGISTER value.
    if action.output_value > state.value {
        return Err(VerifyError::BadValueConservation);
    }
    if !recent.is_recent(&register.renewal_block_hash) {
        return Err(VerifyError::BadRenewal);
    }

    state.owner = Outpoint::new(action.txid, action.output_index);
    state.data = register.data;
    state.renewal = action.current_height;
    state.transfer = 0;
    state.revoked = 0;
    state.renewals = 0;
    state.highest_outpoint = None;
    Ok(state)
}

fn apply_update<S: NameSource>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
) -> VerifyResult<NameState> {
    let update = covenant::parse_update(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&update.name);
    let mut state = owned_state(source, batch, name_hash, action, params, update.open_height)?;
    state.data = update.data;
    state.owner = Outpoint::new(action.txid, action.output_index);
    Ok(state)
}

fn apply_renew<S: NameSource, R: RecentBlocks>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
    recent: &R,
) -> VerifyResult<NameState> {
    let renew = covenant::parse_renew(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&renew.name);
    let mut state = owned_state(source, batch, name_hash, action, params, renew.open_height)?;

    if action.current_height < state.renewal + params.tree_interval + 1 {
        return Err(VerifyError::PrematureRenewal);
    }
    if !recent.is_recent(&renew.renewal_block_hash) {
        return Err(VerifyError::BadRenewal);
    }
    state.renewal = action.current_height;
    state.renewals += 1;
    state.owner = Outpoint::new(action.txid, action.output_index);
    Ok(state)
}

fn apply_transfer<S: NameSource>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
) -> VerifyResult<NameState> {
    let transfer = covenant::parse_transfer(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&transfer.name);
    let mut state = owned_state(source, batch, name_hash, action, params, transfer.open_height)?;
    state.transfer = action.current_height;
    state.owner = Outpoint::new(action.txid, action.output_index);
    Ok(state)
}

fn apply_finalize<S: NameSource>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
) -> VerifyResult<NameState> {
    let finalize = covenant::parse_finalize(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&finalize.name);
    let mut state = owned_state(source, batch, name_hash, action, params, finalize.open_height)?;

    if state.transfer == 0 || action.current_height < state.transfer + params.transfer_lockup {
        return Err(VerifyError::BadTransferLockup);
    }
    state.owner = Outpoint::new(action.txid, action.output_index);
    state.transfer = 0;
    Ok(state)
}

fn apply_revoke<S: NameSource>(
    source: &S,
    batch: &NameBatch,
    action: &CovenantAction,
    params: &NetworkParams,
) -> VerifyResult<NameState> {
    let revoke = covenant::parse_revoke(&action.covenant.items)?;
    let name_hash = hnsd_consensus_core::rules::name_hash(&revoke.name);
    let mut state = owned_state(source, batch, name_hash, action, params, revoke.open_height)?;
    state.revoked = action.current_height;
    state.transfer = 0;
    Ok(state)
}

/// Shared precondition for UPDATE/RENEW/TRANSFER/FINALIZE/REVOKE: the name
/// must exist, its cited `openHeight` must match the current generation,
/// it must not be expired or within its REVOKE cooldown, and the spent
/// antecedent output must be the recorded owner outpoint.
fn owned_state<S: NameSource>(
    source: &S,
    batch: &NameBatch,
    name_hash: Hash,
    action: &CovenantAction,
    params: &NetworkParams,
    cited_open_height: u32,
) -> VerifyResult<NameState> {
    let state = batch.get(source, &name_hash).ok_or(VerifyError::NameNotFound)?;
    check_open_height(&state, cited_open_height)?;
    if state.is_expired(action.current_height, params) {
        return Err(VerifyError::NameExpired);
    }
    if state.is_revoked(action.current_height, params) {
        return Err(VerifyError::NameRevoked);
    }
    let (_, spent_outpoint) = action.spent_covenant.expect("checked by check_present_antecedent");
    if state.owner != spent_outpoint {
        return Err(VerifyError::NameNotOwned);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptySource;
    impl NameSource for EmptySource {
        fn get_name(&self, _name_hash: &Hash) -> Option<NameState> {
            None
        }
    }

    struct SingleSource(NameState);
    impl NameSource for SingleSource {
        fn get_name(&self, name_hash: &Hash) -> Option<NameState> {
            (self.0.name_hash == *name_hash).then(|| self.0.clone())
        }
    }

    struct AllRecent;
    impl RecentBlocks for AllRecent {
        fn is_recent(&self, _hash: &Hash) -> bool {
            true
        }
    }

    struct NoneRecent;
    impl RecentBlocks for NoneRecent {
        fn is_recent(&self, _hash: &Hash) -> bool {
            false
        }
    }

    fn open_height_item(height: u32) -> Vec<u8> {
        height.to_le_bytes().to_vec()
    }

    fn open_action(name: &[u8], height: u32) -> CovenantAction {
        CovenantAction {
            covenant: Covenant { kind: CovenantKind::Open, items: vec![name.to_vec(), open_height_item(0)] },
            txid: Hash::default(),
            output_index: 0,
            output_value: 0,
            spent_covenant: None,
            spent_output_value: None,
            spent_input_index: None,
            current_height: height,
        }
    }

    #[test]
    fn test_open_on_fresh_name_succeeds() {
        let params = NetworkParams::regtest();
        let source = EmptySource;
        let batch = NameBatch::new();
        let action = open_action(b"example", 0);
        let state = apply_covenant(&source, &batch, &action, &params, &AllRecent).unwrap();
        assert_eq!(state.name, b"example");
        assert_eq!(state.height, 0);
    }

    #[test]
    fn test_open_rejects_unexpected_antecedent() {
        let params = NetworkParams::regtest();
        let source = EmptySource;
        let batch = NameBatch::new();
        let mut action = open_action(b"example", 0);
        action.spent_covenant = Some((CovenantKind::Register, Outpoint::new(Hash::default(), 0)));
        action.spent_input_index = Some(0);
        assert!(matches!(apply_covenant(&source, &batch, &action, &params, &AllRecent), Err(VerifyError::BadCovenantAncestor)));
    }

    #[test]
    fn test_bid_requires_bidding_phase() {
        let params = NetworkParams::regtest();
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let opened = NameState::new(name.to_vec(), name_hash, 0);
        let source = SingleSource(opened);
        let batch = NameBatch::new();

        let action = CovenantAction {
            covenant: Covenant { kind: CovenantKind::Bid, items: vec![name_hash.as_bytes().to_vec(), vec![0u8; 32], open_height_item(0)] },
            txid: Hash::default(),
            output_index: 0,
            output_value: 1000,
            spent_covenant: None,
            spent_output_value: None,
            spent_input_index: None,
            current_height: 0, // before bidding_start, should fail
        };
        assert!(matches!(apply_covenant(&source, &batch, &action, &params, &AllRecent), Err(VerifyError::BadCovenantPhase(_))));
    }

    #[test]
    fn test_bid_succeeds_in_window() {
        let params = NetworkParams::regtest();
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let opened = NameState::new(name.to_vec(), name_hash, 0);
        let source = SingleSource(opened);
        let batch = NameBatch::new();

        let action = CovenantAction {
            covenant: Covenant { kind: CovenantKind::Bid, items: vec![name_hash.as_bytes().to_vec(), vec![0u8; 32], open_height_item(0)] },
            txid: Hash::default(),
            output_index: 0,
            output_value: 1000,
            spent_covenant: None,
            spent_output_value: None,
            spent_input_index: None,
            current_height: params.tree_interval + 1,
        };
        let state = apply_covenant(&source, &batch, &action, &params, &AllRecent).unwrap();
        assert_eq!(state.name_hash, name_hash);
    }

    #[test]
    fn test_bid_rejects_stale_open_height() {
        let params = NetworkParams::regtest();
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let opened = NameState::new(name.to_vec(), name_hash, 10);
        let source = SingleSource(opened);
        let batch = NameBatch::new();

        let action = CovenantAction {
            covenant: Covenant { kind: CovenantKind::Bid, items: vec![name_hash.as_bytes().to_vec(), vec![0u8; 32], open_height_item(0)] },
            txid: Hash::default(),
            output_index: 0,
            output_value: 1000,
            spent_covenant: None,
            spent_output_value: None,
            spent_input_index: None,
            current_height: 10 + params.tree_interval + 1,
        };
        assert!(matches!(apply_covenant(&source, &batch, &action, &params, &AllRecent), Err(VerifyError::BadOpenHeight)));
    }

    #[test]
    fn test_reveal_tracks_vickrey_pricing() {
        let params = NetworkParams::regtest();
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let mut state = NameState::new(name.to_vec(), name_hash, 0);
        let reveal_height = params.tree_interval + params.bidding_period + 1;

        // first reveal: bid of 500
        let action_a = CovenantAction {
            covenant: Covenant { kind: CovenantKind::Reveal, items: vec![name.to_vec(), vec![0u8; 32], open_height_item(0)] },
            txid: Hash::from_le_u64([10, 0, 0, 0]),
            output_index: 0,
            output_value: 500,
            spent_covenant: Some((CovenantKind::Bid, Outpoint::new(Hash::from_le_u64([1, 0, 0, 0]), 0))),
            spent_output_value: Some(500),
            spent_input_index: Some(0),
            current_height: reveal_height,
        };
        let source = SingleSource(state.clone());
        let batch = NameBatch::new();
        state = apply_covenant(&source, &batch, &action_a, &params, &AllRecent).unwrap();
        assert_eq!(state.highest, 500);
        assert_eq!(state.value, 500);

        // second reveal: bid of 800, a new higher leader
        let action_b = CovenantAction {
            covenant: Covenant { kind: CovenantKind::Reveal, items: vec![name.to_vec(), vec![0u8; 32], open_height_item(0)] },
            txid: Hash::from_le_u64([20, 0, 0, 0]),
            output_index: 1,
            output_value: 800,
            spent_covenant: Some((CovenantKind::Bid, Outpoint::new(Hash::from_le_u64([2, 0, 0, 0]), 0))),
            spent_output_value: Some(800),
            spent_input_index: Some(0),
            current_height: reveal_height,
        };
        let source_b = SingleSource(state.clone());
        state = apply_covenant(&source_b, &batch, &action_b, &params, &AllRecent).unwrap();
        assert_eq!(state.highest, 800);
        assert_eq!(state.value, 500, "second price stays the previous leader's bid");
        assert_eq!(state.highest_outpoint, Some(Outpoint::new(Hash::from_le_u64([20, 0, 0, 0]), 1)), "winner is identified by the REVEAL's own outpoint, not the BID it spent");
    }

    #[test]
    fn test_redeem_rejects_the_winning_reveal() {
        let params = NetworkParams::regtest();
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let mut state = NameState::new(name.to_vec(), name_hash, 0);
        let winner_outpoint = Outpoint::new(Hash::from_le_u64([9, 0, 0, 0]), 0);
        state.highest = 800;
        state.value = 500;
        state.highest_outpoint = Some(winner_outpoint);

        let closed_height = params.tree_interval + params.bidding_period + params.reveal_period + 1;
        let source = SingleSource(state);
        let batch = NameBatch::new();

        let action = CovenantAction {
            covenant: Covenant { kind: CovenantKind::Redeem, items: vec![name.to_vec(), open_height_item(0)] },
            txid: Hash::default(),
            output_index: 0,
            output_value: 0,
            spent_covenant: Some((CovenantKind::Reveal, winner_outpoint)),
            spent_output_value: Some(800),
            spent_input_index: Some(0),
            current_height: closed_height,
        };
        assert!(matches!(apply_covenant(&source, &batch, &action, &params, &AllRecent), Err(VerifyError::NotRevealWinner)));
    }

    #[test]
    fn test_redeem_rejects_refund_above_locked_value() {
        let params = NetworkParams::regtest();
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let mut state = NameState::new(name.to_vec(), name_hash, 0);
        let winner_outpoint = Outpoint::new(Hash::from_le_u64([9, 0, 0, 0]), 0);
        let loser_outpoint = Outpoint::new(Hash::from_le_u64([8, 0, 0, 0]), 0);
        state.highest = 800;
        state.value = 500;
        state.highest_outpoint = Some(winner_outpoint);

        let closed_height = params.tree_interval + params.bidding_period + params.reveal_period + 1;
        let source = SingleSource(state);
        let batch = NameBatch::new();

        let action = CovenantAction {
            covenant: Covenant { kind: CovenantKind::Redeem, items: vec![name.to_vec(), open_height_item(0)] },
            txid: Hash::default(),
            output_index: 0,
            output_value: 1000,
            spent_covenant: Some((CovenantKind::Reveal, loser_outpoint)),
            spent_output_value: Some(300),
            spent_input_index: Some(0),
            current_height: closed_height,
        };
        assert!(matches!(apply_covenant(&source, &batch, &action, &params, &AllRecent), Err(VerifyError::BadValueConservation)));
    }

    #[test]
    fn test_register_rejects_value_above_second_price() {
        let params = NetworkParams::regtest();
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let mut state = NameState::new(name.to_vec(), name_hash, 0);
        let winner_outpoint = Outpoint::new(Hash::from_le_u64([9, 0, 0, 0]), 0);
        state.highest = 800;
        state.value = 500;
        state.highest_outpoint = Some(winner_outpoint);

        let closed_height = params.tree_interval + params.bidding_period + params.reveal_period + 1;
        let source = SingleSource(state);
        let batch = NameBatch::new();

        let action = CovenantAction {
            covenant: Covenant {
                kind: CovenantKind::Register,
                items: vec![name.to_vec(), b"data".to_vec(), vec![1u8; 32], open_height_item(0)],
            },
            txid: Hash::default(),
            output_index: 0,
            output_value: 600,
            spent_covenant: Some((CovenantKind::Reveal, winner_outpoint)),
            spent_output_value: Some(800),
            spent_input_index: Some(0),
            current_height: closed_height,
        };
        assert!(matches!(apply_covenant(&source, &batch, &action, &params, &AllRecent), Err(VerifyError::BadValueConservation)));
    }

    #[test]
    fn test_register_rejects_stale_renewal_block_hash() {
        let params = NetworkParams::regtest();
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let mut state = NameState::new(name.to_vec(), name_hash, 0);
        let winner_outpoint = Outpoint::new(Hash::from_le_u64([9, 0, 0, 0]), 0);
        state.highest = 800;
        state.value = 500;
        state.highest_outpoint = Some(winner_outpoint);

        let closed_height = params.tree_interval + params.bidding_period + params.reveal_period + 1;
        let source = SingleSource(state);
        let batch = NameBatch::new();

        let action = CovenantAction {
            covenant: Covenant {
                kind: CovenantKind::Register,
                items: vec![name.to_vec(), b"data".to_vec(), vec![1u8; 32], open_height_item(0)],
            },
            txid: Hash::default(),
            output_index: 0,
            output_value: 500,
            spent_covenant: Some((CovenantKind::Reveal, winner_outpoint)),
            spent_output_value: Some(800),
            spent_input_index: Some(0),
            current_height: closed_height,
        };
        assert!(matches!(apply_covenant(&source, &batch, &action, &params, &NoneRecent), Err(VerifyError::BadRenewal)));
    }

    #[test]
    fn test_renew_rejects_stale_renewal_block_hash() {
        let params = NetworkParams::regtest();
        let name = b"example";
        let name_hash = hnsd_consensus_core::rules::name_hash(name);
        let owner_outpoint = Outpoint::new(Hash::from_le_u64([5, 0, 0, 0]), 0);
        let mut state = NameState::new(name.to_vec(), name_hash, 0);
        state.owner = owner_outpoint;
        state.renewal = 0;

        let source = SingleSource(state);
        let batch = NameBatch::new();

        let action = CovenantAction {
            covenant: Covenant { kind: CovenantKind::Renew, items: vec![name.to_vec(), vec![2u8; 32], open_height_item(0)] },
            txid: Hash::default(),
            output_index: 0,
            output_value: 0,
            spent_covenant: Some((CovenantKind::Register, owner_outpoint)),
            spent_output_value: Some(0),
            spent_input_index: Some(0),
            current_height: params.tree_interval + 2,
        };
        assert!(matches!(apply_covenant(&source, &batch, &action, &params, &NoneRecent), Err(VerifyError::BadRenewal)));
    }
}
