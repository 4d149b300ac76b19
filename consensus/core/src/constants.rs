/// Current latest supported transaction version.
pub const TX_VERSION: u32 = 0;

/// One unit of the protocol currency equals `10^EXP` base units (GLOSSARY
/// "Base units"), and the supply is bounded well under `u64::MAX`.
pub const CURRENCY_EXPONENT: u32 = 6;
const EXP_10: u64 = 1_000_000;
pub const MAX_MONEY: u64 = 2_040_000_000 * EXP_10;

/// Name byte-length bounds.
pub const MIN_NAME_LENGTH: usize = 1;
pub const MAX_NAME_LENGTH: usize = 63;

/// Maximum size of a name's resource-record blob.
pub const MAX_RESOURCE_SIZE: usize = 512;

/// Upper bound on the number of inputs/outputs a transaction may carry,
/// independent of any block-size limit, so covenant application and
/// signature verification stay boundable in the worst case.
pub const MAX_TX_INPUTS: usize = 20_000;
pub const MAX_TX_OUTPUTS: usize = 20_000;

/// Disables relative-locktime interpretation of an input's sequence number
/// for `OP_CHECKSEQUENCEVERIFY`.
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;
