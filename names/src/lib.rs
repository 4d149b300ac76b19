//! The name-auction state machine: covenant item shapes, the bid-blinding
//! commitment, the per-name record and its phase predicates, and the
//! transition function that ties them together.

pub mod auction;
pub mod blind;
pub mod covenant;
pub mod errors;
pub mod state;
pub mod tx_actions;

pub use auction::{apply_covenant, CovenantAction, NameBatch, NameSource, RecentBlocks};
pub use errors::{VerifyError, VerifyResult};
pub use state::{NameState, Phase};
pub use tx_actions::{resolve_actions, CoinView};
