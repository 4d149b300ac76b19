//! The per-name record maintained in the authenticated trie, its phase
//! predicates, and its wire encoding.

use hnsd_consensus_core::config::params::NetworkParams;
use hnsd_consensus_core::tx::Outpoint;
use hnsd_consensus_core::varint::{read_varint, write_varint};
use hnsd_hashes::Hash;

/// Maximum size of a name's resource-record blob.
pub const MAX_RESOURCE_SIZE: usize = 512;

/// The auction phase a NameState is currently in. `Closed` and
/// `Expired`/`Revoked` are not mutually exclusive per §4.6 (an expired name
/// is also, trivially, past `Closed`); callers that need a
/// single phase tag should check `is_expired`/`is_revoked` before falling
/// back to this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Bidding,
    Reveal,
    Closed,
}

/// The per-name record. `highest_outpoint`/`highest_reveal_height`
/// are auxiliary bookkeeping with **no wire-encoding counterpart**: the tie-break rule needs to know not just the numeric second-price
/// (`value`/`highest`) but which specific REVEAL is the eligible winner, so
/// REGISTER/REDEEM can be told apart. They are only meaningful while the
/// auction is still in its BIDDING/REVEAL/CLOSED window and are reset once
/// REGISTER commits ownership (at which point `owner` is authoritative).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameState {
    pub name: Vec<u8>,
    pub name_hash: Hash,
    pub height: u32,
    pub renewal: u32,
    pub owner: Outpoint,
    pub value: u64,
    pub highest: u64,
    pub data: Vec<u8>,
    pub transfer: u32,
    pub revoked: u32,
    pub claimed: u32,
    pub renewals: u32,
    pub weak: bool,

    pub highest_outpoint: Option<Outpoint>,
    pub highest_reveal_height: u32,
}

impl NameState {
    pub fn new(name: Vec<u8>, name_hash: Hash, height: u32) -> Self {
        Self {
            name,
            name_hash,
            height,
            renewal: height,
            owner: Outpoint::new(Hash::default(), u32::MAX),
            value: 0,
            highest: 0,
            data: Vec::new(),
            transfer: 0,
            revoked: 0,
            claimed: 0,
            renewals: 0,
            weak: false,
            highest_outpoint: None,
            highest_reveal_height: 0,
        }
    }

    fn bidding_start(&self, params: &NetworkParams) -> u32 {
        self.height + params.tree_interval
    }

    fn bidding_end(&self, params: &NetworkParams) -> u32 {
        self.bidding_start(params) + params.bidding_period
    }

    fn reveal_end(&self, params: &NetworkParams) -> u32 {
        self.bidding_end(params) + params.reveal_period
    }

    /// BIDDING: `h_o + tree_interval < current <= h_o + tree_interval + bidding_period`.
    pub fn is_bidding(&self, current: u32, params: &NetworkParams) -> bool {
        current > self.bidding_start(params) && current <= self.bidding_end(params)
    }

    /// REVEAL: BIDDING end `< current <= BIDDING end + reveal_period`.
    pub fn is_reveal(&self, current: u32, params: &NetworkParams) -> bool {
        current > self.bidding_end(params) && current <= self.reveal_end(params)
    }

    /// CLOSED: strictly after the REVEAL window ends.
    pub fn is_closed(&self, current: u32, params: &NetworkParams) -> bool {
        current > self.reveal_end(params)
    }

    /// `current - renewal >= renewal_window` -> behaves as absent for OPEN
    /// purposes.
    pub fn is_expired(&self, current: u32, params: &NetworkParams) -> bool {
        current.saturating_sub(self.renewal) >= params.renewal_window
    }

    /// `revoked > 0 && current - revoked < revocation_delay`.
    pub fn is_revoked(&self, current: u32, params: &NetworkParams) -> bool {
        self.revoked > 0 && current.saturating_sub(self.revoked) < params.revocation_delay
    }

    /// True once this NameState no longer blocks a fresh OPEN of the same
    /// name: either it expired from inactivity, or it was revoked and the
    /// cooldown has elapsed.
    pub fn is_openable(&self, current: u32, params: &NetworkParams) -> bool {
        if self.revoked > 0 {
            return !self.is_revoked(current, params);
        }
        self.is_expired(current, params)
    }

    /// The auction phase at `current`, or `None` once the name has settled
    /// into ownership (CLOSED behaves as "auction over"; ownership actions
    /// from then on are gated by `owner`/`is_expired`/`is_revoked` instead).
    pub fn phase(&self, current: u32, params: &NetworkParams) -> Option<Phase> {
        if self.is_bidding(current, params) {
            Some(Phase::Bidding)
        } else if self.is_reveal(current, params) {
            Some(Phase::Reveal)
        } else if self.is_closed(current, params) {
            Some(Phase::Closed)
        } else {
            None
        }
    }

    /// Wire encoding: `name_len:u8, name, name_hash[32],
    /// height:u32, renewal:u32, owner_txid[32], owner_index:u32, value:u64,
    /// highest:u64, data_len:varint, data, transfer:u32, revoked:u32,
    /// claimed:u32, renewals:u32, weak:u8`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.name.len() + self.data.len());
        out.push(self.name.len() as u8);
        out.extend_from_slice(&self.name);
        out.extend_from_slice(self.name_hash.as_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.renewal.to_le_bytes());
        out.extend_from_slice(self.owner.transaction_id.as_bytes());
        out.extend_from_slice(&self.owner.index.to_le_bytes());
        out.extend_from_slice(&self.value.to_le_bytes());
        out.extend_from_slice(&self.highest.to_le_bytes());
        write_varint(&mut out, self.data.len() as u64).expect("writing to a Vec never fails");
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.transfer.to_le_bytes());
        out.extend_from_slice(&self.revoked.to_le_bytes());
        out.extend_from_slice(&self.claimed.to_le_bytes());
        out.extend_from_slice(&self.renewals.to_le_bytes());
        out.push(self.weak as u8);
        out
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = bytes;
        let name_len = read_u8(&mut r)? as usize;
        let name = read_exact(&mut r, name_len)?;
        let name_hash = Hash::from(read_array::<32>(&mut r)?);
        let height = read_u32(&mut r)?;
        let renewal = read_u32(&mut r)?;
        let owner_txid = Hash::from(read_array::<32>(&mut r)?);
        let owner_index = read_u32(&mut r)?;
        let value = read_u64(&mut r)?;
        let highest = read_u64(&mut r)?;
        let data_len = read_varint(&mut r).map_err(|_| DecodeError::Eof)? as usize;
        let data = read_exact(&mut r, data_len)?;
        let transfer = read_u32(&mut r)?;
        let revoked = read_u32(&mut r)?;
        let claimed = read_u32(&mut r)?;
        let renewals = read_u32(&mut r)?;
        let weak = read_u8(&mut r)? != 0;
        Ok(Self {
            name,
            name_hash,
            height,
            renewal,
            owner: Outpoint::new(owner_txid, owner_index),
            value,
            highest,
            data,
            transfer,
            revoked,
            claimed,
            renewals,
            weak,
            highest_outpoint: None,
            highest_reveal_height: 0,
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of buffer while decoding a NameState")]
    Eof,
}

fn read_u8(r: &mut &[u8]) -> Result<u8, DecodeError> {
    let (byte, rest) = r.split_first().ok_or(DecodeError::Eof)?;
    *r = rest;
    Ok(*byte)
}

fn read_array<const N: usize>(r: &mut &[u8]) -> Result<[u8; N], DecodeError> {
    if r.len() < N {
        return Err(DecodeError::Eof);
    }
    let (head, rest) = r.split_at(N);
    *r = rest;
    Ok(head.try_into().expect("split_at guarantees exact length"))
}

fn read_exact(r: &mut &[u8], len: usize) -> Result<Vec<u8>, DecodeError> {
    if r.len() < len {
        return Err(DecodeError::Eof);
    }
    let (head, rest) = r.split_at(len);
    *r = rest;
    Ok(head.to_vec())
}

fn read_u32(r: &mut &[u8]) -> Result<u32, DecodeError> {
    Ok(u32::from_le_bytes(read_array::<4>(r)?))
}

fn read_u64(r: &mut &[u8]) -> Result<u64, DecodeError> {
    Ok(u64::from_le_bytes(read_array::<8>(r)?))
}
