//! Rough in-memory size estimation, used by the mempool to bound its total
//! resident size without a precise allocator hook.

use std::mem::size_of;

pub trait MemSizeEstimator {
    /// Returns an approximate byte count for this value, including heap
    /// allocations owned by it. The default is a gross under-estimate
    /// (stack size only); types with heap-allocated fields should override.
    fn estimate_mem_bytes(&self) -> usize
    where
        Self: Sized,
    {
        size_of::<Self>()
    }
}
