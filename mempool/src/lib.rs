//! Mempool admission adapter: wraps the
//! name-auction transition function (`hnsd-names`) with a view layered over
//! the last committed trie root plus an overlay of already-admitted,
//! unconfirmed transactions, and a `STANDARD_VERIFY_FLAGS` policy layer.

mod overlay;
mod view;

pub use overlay::MempoolOverlay;
pub use view::{ConfirmedView, MempoolAdmission};
