extern crate alloc;
extern crate core;
extern crate self as consensus_core;

use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasher, Hasher};

pub use hnsd_hashes::Hash;

pub mod codec;
pub mod config;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod network;
pub mod rules;
pub mod tx;
pub mod varint;

/// Map from a 32-byte hash to `V`, keyed by a hash that is already
/// uniformly distributed, so no further mixing is needed.
pub type IdentityHashMap<V> = HashMap<Hash, V, PassthroughHasher>;

/// Same as [`IdentityHashMap`] but a `HashSet`.
pub type IdentityHashSet = HashSet<Hash, PassthroughHasher>;

pub trait HashMapCustomHasher {
    fn new() -> Self;
    fn with_capacity(capacity: usize) -> Self;
}

// HashMap::new and HashMap::with_capacity are only implemented on Hasher=RandomState
// to avoid type inference problems, so we need to provide our own versions.
impl<V> HashMapCustomHasher for IdentityHashMap<V> {
    #[inline(always)]
    fn new() -> Self {
        Self::with_hasher(PassthroughHasher::new())
    }
    #[inline(always)]
    fn with_capacity(cap: usize) -> Self {
        Self::with_capacity_and_hasher(cap, PassthroughHasher::new())
    }
}

impl HashMapCustomHasher for IdentityHashSet {
    #[inline(always)]
    fn new() -> Self {
        Self::with_hasher(PassthroughHasher::new())
    }
    #[inline(always)]
    fn with_capacity(cap: usize) -> Self {
        Self::with_capacity_and_hasher(cap, PassthroughHasher::new())
    }
}

/// `hnsd_hashes::Hash` writes 4 u64s so we just use the last one as the hash here.
#[derive(Default, Clone, Copy)]
pub struct PassthroughHasher(u64);

impl PassthroughHasher {
    #[inline(always)]
    pub const fn new() -> Self {
        Self(0)
    }
}

impl Hasher for PassthroughHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.0
    }
    #[inline(always)]
    fn write_u64(&mut self, v: u64) {
        self.0 = v;
    }
    #[cold]
    fn write(&mut self, _: &[u8]) {
        unimplemented!("use write_u64")
    }
}

impl BuildHasher for PassthroughHasher {
    type Hasher = Self;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        Self(0)
    }
}
