use crate::network::NetworkType;
use hnsd_hashes::Hash;
use std::sync::Arc;

/// Maps a name's rollout bucket (derived from its `name_hash`) to the block
/// height at which it becomes biddable via `OPEN`. Names reserved outright
/// (claimable via CLAIM, never auctioned) are not part of this schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RolloutSchedule {
    /// Number of rollout buckets the reserved-name set is partitioned into.
    pub bucket_count: u32,
}

impl RolloutSchedule {
    /// Height at which `name_hash` leaves the reserved set and becomes
    /// openable, spaced `tree_interval` blocks apart per bucket.
    pub fn biddable_height(&self, name_hash: &Hash, tree_interval: u32) -> u32 {
        if self.bucket_count == 0 {
            return 0;
        }
        let bucket = u32::from_le_bytes(name_hash.as_bytes()[0..4].try_into().unwrap()) % self.bucket_count;
        bucket * tree_interval
    }
}

/// Consensus-critical network parameters: the block-count windows driving
/// the name-auction phase machine, plus the reserved-name
/// rollout schedule and airdrop commitment root consumed by `hnsd-airdrop`.
/// Passed around as an explicit, immutable, `Clone`-able value (or behind an
/// `Arc`) rather than read from process-wide global state.
#[derive(Clone, Debug)]
pub struct NetworkParams {
    pub network: NetworkType,

    /// Blocks between successive trie-commit heights.
    pub tree_interval: u32,
    /// Length of the BIDDING window following an OPEN's commit.
    pub bidding_period: u32,
    /// Length of the REVEAL window following BIDDING's end.
    pub reveal_period: u32,
    /// Minimum age, in blocks, a pending TRANSFER must reach before FINALIZE.
    pub transfer_lockup: u32,
    /// Blocks of inactivity since `renewal` after which a NameState expires.
    pub renewal_window: u32,
    /// Blocks a REVOKEd name stays unopenable.
    pub revocation_delay: u32,
    /// How many blocks back a RENEW/REGISTER's `renewalBlockHash` may lag
    /// the chain tip and still count as recent; prevents either from being
    /// pre-signed arbitrarily far in advance.
    pub renewal_maturity: u32,

    /// Reserved-name claim-window rollout schedule.
    pub rollout: RolloutSchedule,
    /// Commitment root the airdrop proof-of-membership is checked against.
    pub airdrop_commitment_root: Hash,
}

impl NetworkParams {
    pub fn mainnet() -> Arc<Self> {
        Arc::new(Self {
            network: NetworkType::Mainnet,
            tree_interval: 36,
            bidding_period: 2880,
            reveal_period: 2016,
            transfer_lockup: 288,
            renewal_window: 2 * 144 * 365,
            revocation_delay: 2 * 144 * 30,
            renewal_maturity: 2 * 144,
            rollout: RolloutSchedule { bucket_count: 52 },
            airdrop_commitment_root: Hash::default(),
        })
    }

    pub fn testnet() -> Arc<Self> {
        Arc::new(Self {
            network: NetworkType::Testnet,
            tree_interval: 36,
            bidding_period: 1440,
            reveal_period: 1008,
            transfer_lockup: 144,
            renewal_window: 144 * 90,
            revocation_delay: 144 * 7,
            renewal_maturity: 144,
            rollout: RolloutSchedule { bucket_count: 52 },
            airdrop_commitment_root: Hash::default(),
        })
    }

    pub fn simnet() -> Arc<Self> {
        Arc::new(Self {
            network: NetworkType::Simnet,
            tree_interval: 6,
            bidding_period: 12,
            reveal_period: 12,
            transfer_lockup: 6,
            renewal_window: 288,
            revocation_delay: 36,
            renewal_maturity: 12,
            rollout: RolloutSchedule { bucket_count: 4 },
            airdrop_commitment_root: Hash::default(),
        })
    }

    /// Short, fast windows for driving a full auction lifecycle in tests.
    pub fn regtest() -> Arc<Self> {
        Arc::new(Self {
            network: NetworkType::Regtest,
            tree_interval: 5,
            bidding_period: 5,
            reveal_period: 10,
            transfer_lockup: 10,
            renewal_window: 50,
            revocation_delay: 10,
            renewal_maturity: 20,
            rollout: RolloutSchedule { bucket_count: 1 },
            airdrop_commitment_root: Hash::default(),
        })
    }

    pub fn for_network(network: NetworkType) -> Arc<Self> {
        match network {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
            NetworkType::Regtest => Self::regtest(),
            NetworkType::Simnet => Self::simnet(),
        }
    }
}
