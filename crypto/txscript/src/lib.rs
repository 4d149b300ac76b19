//! Witness script interpreter and sighash-adjacent machinery: script-number encoding, the opcode/engine
//! dispatcher, and the witness verifier that dispatches on address
//! version/length before running a script through the engine.

pub mod builder;
pub mod caches;
pub mod data_stack;
pub mod engine;
pub mod flags;
pub mod num;
pub mod opcodes;
pub mod sigcheck_pool;
pub mod witness;

pub use engine::{ScriptSource, SignatureCache, TxScriptEngine, SIGNATURE_LENGTH};
pub use flags::VerifyFlags;
pub use num::ScriptNum;
pub use sigcheck_pool::{SigCheckJob, SigCheckPool};
pub use witness::{new_signature_cache, verify_witness};
