//! The single-writer/multi-reader contract over a chain view:
//! [`SessionLock`] wraps a readers-first lock (`ReadersFirstRwLock`) and
//! generalizes a session/instance pair originally tied to a trait-object
//! consensus handle to any shared chain-view value. Everything tying the
//! original crate to consensus staging/swapping (`ConsensusManager`,
//! `ConsensusFactory`, `StagingConsensus`, `BlockProcessingBatch`) modeled a
//! DAG-reorg scheme this project doesn't have, and was dropped.

mod readers_lock;
mod session;

pub use readers_lock::{ReadersFirstRwLock, ReadersFirstRwLockReadGuard};
pub use session::{SessionLock, SessionReadGuard, SessionWriteGuard};
