#[cfg(feature = "fd_budget")]
pub mod fd_budget;
pub mod hex;
#[cfg(feature = "mem_size")]
pub mod mem_size;
pub mod networking;
pub mod refs;
pub mod serde_bytes;
pub mod serde_bytes_fixed_ref;
