//! Per-kind covenant item shapes and the accepted-antecedent table. `hnsd_consensus_core::tx::Covenant` only carries an untyped
//! `Vec<Vec<u8>>` item list; this module gives each kind's items names and
//! validates their shape before `auction::apply_covenant` reasons about them.

use crate::errors::{VerifyError, VerifyResult};
use hnsd_consensus_core::rules::{is_valid_name, name_hash};
use hnsd_consensus_core::tx::CovenantKind;
use hnsd_hashes::Hash;

fn expect_len(kind: CovenantKind, items: &[Vec<u8>], expected: usize) -> VerifyResult<()> {
    if items.len() != expected {
        return Err(VerifyError::BadCovenantShape(kind as u8, expected, items.len()));
    }
    Ok(())
}

fn read_name(bytes: &[u8]) -> VerifyResult<Vec<u8>> {
    if !is_valid_name(bytes) {
        return Err(VerifyError::BadNameLength(bytes.len()));
    }
    Ok(bytes.to_vec())
}

fn check_name_hash(item: &[u8], name: &[u8]) -> VerifyResult<()> {
    let expected = Hash::try_from(item).map_err(|_| VerifyError::BadNameHash)?;
    if expected != name_hash(name) {
        return Err(VerifyError::BadNameHash);
    }
    Ok(())
}

/// Reads a trailing 4-byte little-endian `openHeight` item, the value every
/// continuing covenant must carry so `apply_covenant` can check it against
/// the NameState's own `height` (the generation the action targets).
fn parse_open_height(item: &[u8]) -> VerifyResult<u32> {
    let bytes: [u8; 4] = item.try_into().map_err(|_| VerifyError::BadOpenHeight)?;
    Ok(u32::from_le_bytes(bytes))
}

fn parse_block_hash(item: &[u8]) -> VerifyResult<Hash> {
    Hash::try_from(item).map_err(|_| VerifyError::BadRenewal)
}

/// `[name]`: claims a pre-reserved or airdropped name directly
/// to ownership, bypassing the auction. Has no prior NameState to cite, so
/// unlike every other kind it carries no openHeight item.
pub struct ClaimItems {
    pub name: Vec<u8>,
}

pub fn parse_claim(items: &[Vec<u8>]) -> VerifyResult<ClaimItems> {
    expect_len(CovenantKind::Claim, items, 1)?;
    Ok(ClaimItems { name: read_name(&items[0])? })
}

/// `[name, openHeight]`: opens a name for auction, starting its BIDDING
/// window `tree_interval` blocks from now. `openHeight` is the literal
/// sentinel `0`, marking that this action starts a fresh generation rather
/// than continuing one.
pub struct OpenItems {
    pub name: Vec<u8>,
    pub open_height: u32,
}

pub fn parse_open(items: &[Vec<u8>]) -> VerifyResult<OpenItems> {
    expect_len(CovenantKind::Open, items, 2)?;
    let open_height = parse_open_height(&items[1])?;
    if open_height != 0 {
        return Err(VerifyError::BadOpenHeight);
    }
    Ok(OpenItems { name: read_name(&items[0])?, open_height })
}

/// `[nameHash, blindHash, openHeight]`: a sealed bid. The name itself is not
/// revealed on-chain at this stage, only its hash, so the output carries
/// `nameHash` rather than the literal `name` bytes.
pub struct BidItems {
    pub name_hash: Hash,
    pub blind_hash: Hash,
    pub open_height: u32,
}

pub fn parse_bid(items: &[Vec<u8>]) -> VerifyResult<BidItems> {
    expect_len(CovenantKind::Bid, items, 3)?;
    let name_hash = Hash::try_from(items[0].as_slice()).map_err(|_| VerifyError::BadNameHash)?;
    let blind_hash = Hash::try_from(items[1].as_slice()).map_err(|_| VerifyError::BadBlind)?;
    let open_height = parse_open_height(&items[2])?;
    Ok(BidItems { name_hash, blind_hash, open_height })
}

/// `[name, nonce, openHeight]`: opens a sealed bid,
/// publishing the real bid value as the output's coin value and the nonce
/// used to blind it.
pub struct RevealItems {
    pub name: Vec<u8>,
    pub nonce: [u8; crate::blind::NONCE_LENGTH],
    pub open_height: u32,
}

pub fn parse_reveal(items: &[Vec<u8>]) -> VerifyResult<RevealItems> {
    expect_len(CovenantKind::Reveal, items, 3)?;
    let name = read_name(&items[0])?;
    let nonce: [u8; crate::blind::NONCE_LENGTH] =
        items[1].as_slice().try_into().map_err(|_| VerifyError::BadBlind)?;
    let open_height = parse_open_height(&items[2])?;
    Ok(RevealItems { name, nonce, open_height })
}

/// `[name, openHeight]`: the losing bidders' refund path, spendable by
/// anyone who holds a losing REVEAL once the auction has CLOSED.
pub struct RedeemItems {
    pub name: Vec<u8>,
    pub open_height: u32,
}

pub fn parse_redeem(items: &[Vec<u8>]) -> VerifyResult<RedeemItems> {
    expect_len(CovenantKind::Redeem, items, 2)?;
    let open_height = parse_open_height(&items[1])?;
    Ok(RedeemItems { name: read_name(&items[0])?, open_height })
}

/// `[name, data, renewalBlockHash, openHeight]`: the auction winner claims
/// ownership and attaches the initial resource record. `renewalBlockHash`
/// must cite a recent block, the same recency rule RENEW carries, so a
/// REGISTER can't be pre-signed arbitrarily far in advance either.
pub struct RegisterItems {
    pub name: Vec<u8>,
    pub data: Vec<u8>,
    pub renewal_block_hash: Hash,
    pub open_height: u32,
}

pub fn parse_register(items: &[Vec<u8>]) -> VerifyResult<RegisterItems> {
    expect_len(CovenantKind::Register, items, 4)?;
    let name = read_name(&items[0])?;
    if items[1].len() > crate::state::MAX_RESOURCE_SIZE {
        return Err(VerifyError::BadCovenantShape(CovenantKind::Register as u8, 4, items.len()));
    }
    let renewal_block_hash = parse_block_hash(&items[2])?;
    let open_height = parse_open_height(&items[3])?;
    Ok(RegisterItems { name, data: items[1].clone(), renewal_block_hash, open_height })
}

/// `[name, data, openHeight]`: replaces the resource record while keeping
/// ownership and the renewal clock unchanged.
pub struct UpdateItems {
    pub name: Vec<u8>,
    pub data: Vec<u8>,
    pub open_height: u32,
}

pub fn parse_update(items: &[Vec<u8>]) -> VerifyResult<UpdateItems> {
    expect_len(CovenantKind::Update, items, 3)?;
    let name = read_name(&items[0])?;
    if items[1].len() > crate::state::MAX_RESOURCE_SIZE {
        return Err(VerifyError::BadCovenantShape(CovenantKind::Update as u8, 3, items.len()));
    }
    let open_height = parse_open_height(&items[2])?;
    Ok(UpdateItems { name, data: items[1].clone(), open_height })
}

/// `[name, renewalBlockHash, openHeight]`: resets the renewal clock without
/// touching the resource record, keeping an otherwise-unchanged name from
/// expiring. `renewalBlockHash` must cite a recent block, so a renewal
/// can't be pre-signed arbitrarily far in the future.
pub struct RenewItems {
    pub name: Vec<u8>,
    pub renewal_block_hash: Hash,
    pub open_height: u32,
}

pub fn parse_renew(items: &[Vec<u8>]) -> VerifyResult<RenewItems> {
    expect_len(CovenantKind::Renew, items, 3)?;
    let name = read_name(&items[0])?;
    let renewal_block_hash = parse_block_hash(&items[1])?;
    let open_height = parse_open_height(&items[2])?;
    Ok(RenewItems { name, renewal_block_hash, open_height })
}

/// `[name, address, openHeight]`: begins transferring ownership to
/// `address`, subject to `transfer_lockup` before FINALIZE can complete it.
pub struct TransferItems {
    pub name: Vec<u8>,
    pub address: Vec<u8>,
    pub open_height: u32,
}

pub fn parse_transfer(items: &[Vec<u8>]) -> VerifyResult<TransferItems> {
    expect_len(CovenantKind::Transfer, items, 3)?;
    let name = read_name(&items[0])?;
    let open_height = parse_open_height(&items[2])?;
    Ok(TransferItems { name, address: items[1].clone(), open_height })
}

/// `[name, openHeight]`: completes a pending TRANSFER once
/// `transfer_lockup` blocks have elapsed.
pub struct FinalizeItems {
    pub name: Vec<u8>,
    pub open_height: u32,
}

pub fn parse_finalize(items: &[Vec<u8>]) -> VerifyResult<FinalizeItems> {
    expect_len(CovenantKind::Finalize, items, 2)?;
    let open_height = parse_open_height(&items[1])?;
    Ok(FinalizeItems { name: read_name(&items[0])?, open_height })
}

/// `[name, openHeight]`: forcibly revokes ownership, e.g. on detection of a
/// protocol violation; starts the `revocation_delay` cooldown before the
/// name becomes openable again.
pub struct RevokeItems {
    pub name: Vec<u8>,
    pub open_height: u32,
}

pub fn parse_revoke(items: &[Vec<u8>]) -> VerifyResult<RevokeItems> {
    expect_len(CovenantKind::Revoke, items, 2)?;
    let open_height = parse_open_height(&items[1])?;
    Ok(RevokeItems { name: read_name(&items[0])?, open_height })
}

/// The set of covenant kinds whose *output* may legally be spent to produce
/// a new covenant of `kind` on its matching input. `None` means `kind` is only ever the first covenant action for a
/// name (it creates or replaces a `NameState`, rather than continuing one
/// via a spent prior covenant output).
pub fn accepted_input_kinds(kind: CovenantKind) -> Option<&'static [CovenantKind]> {
    use CovenantKind::*;
    match kind {
        None | Claim | Open | Bid => Option::None,
        Reveal => Some(&[Bid]),
        Redeem | Register => Some(&[Reveal]),
        Update | Renew | Transfer => Some(&[Register, Update, Renew, Finalize]),
        Finalize => Some(&[Transfer]),
        Revoke => Some(&[Register, Update, Renew, Transfer, Finalize]),
    }
}
