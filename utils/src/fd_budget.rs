//! Tracks a slice of the process-wide open-file-descriptor limit so a single
//! RocksDB instance doesn't starve the rest of the node of file descriptors.

use std::cmp::min;
use std::sync::atomic::{AtomicI32, Ordering};

static ACQUIRED: AtomicI32 = AtomicI32::new(0);

/// Returns the soft limit on open file descriptors for this process, as
/// reported by the OS (`RLIMIT_NOFILE` on unix, `_getmaxstdio` on Windows).
pub fn limit() -> i32 {
    #[cfg(target_os = "windows")]
    {
        rlimit::getmaxstdio() as i32
    }
    #[cfg(not(target_os = "windows"))]
    {
        rlimit::getrlimit(rlimit::Resource::NOFILE).map(|(soft, _hard)| soft as i32).unwrap_or(256)
    }
}

/// Returns `requested` clamped to whatever headroom remains in the process
/// file-descriptor budget, reserving `min_reserved` for the rest of the
/// process (sockets, log files, other DB instances).
pub fn try_acquire(requested: i32, min_reserved: i32) -> Result<FDGuard, String> {
    let headroom = (limit() - min_reserved).max(0);
    let already = ACQUIRED.load(Ordering::SeqCst);
    let available = headroom - already;
    if available <= 0 {
        return Err(format!("no file descriptor budget remaining (limit {headroom}, already acquired {already})"));
    }
    let granted = min(requested, available);
    ACQUIRED.fetch_add(granted, Ordering::SeqCst);
    Ok(FDGuard { amount: granted })
}

/// RAII handle over a slice of the process file-descriptor budget. Returns
/// the slice to the shared counter on drop.
#[derive(Debug)]
pub struct FDGuard {
    amount: i32,
}

impl FDGuard {
    pub fn amount(&self) -> i32 {
        self.amount
    }
}

impl Drop for FDGuard {
    fn drop(&mut self) {
        ACQUIRED.fetch_sub(self.amount, Ordering::SeqCst);
    }
}
