//! Witness verification: dispatches on the
//! spending address's witness-program version/length, synthesizes or
//! extracts the redeem script, and runs it through [`crate::engine`].

use crate::builder::p2pkh_script;
use crate::caches::Cache;
use crate::data_stack::Stack;
use crate::engine::{ScriptSource, SignatureCache, TxScriptEngine, MAX_SCRIPT_PUSH, MAX_SCRIPT_SIZE};
use crate::flags::VerifyFlags;
use hnsd_addresses::Address;
use hnsd_consensus_core::hashing::sighash::SigHashReusedValues;
use hnsd_consensus_core::tx::Transaction;
use hnsd_txscript_errors::ScriptError;

pub use crate::caches::TxScriptCacheCounters;

/// Reserved for witness-program versions 1..=30: no script runs, the spend
/// always succeeds.
const FUTURE_WITNESS_MIN_VERSION: u8 = 1;
const NULLDATA_VERSION: u8 = 31;

/// Verifies `witness` as a spend of `address` carrying `input_value`, at
/// `input_index` of `tx`, under `flags`. `sig_cache` amortizes
/// repeated `CHECKSIG` calls against the same (sighash, sig, pubkey) triple
/// across inputs in a block.
pub fn verify_witness(
    witness: &[Vec<u8>],
    address: &Address,
    tx: &Transaction,
    input_index: usize,
    input_value: u64,
    flags: VerifyFlags,
    sig_cache: &SignatureCache,
) -> Result<(), ScriptError> {
    if address.version == NULLDATA_VERSION {
        return Err(ScriptError::OpReturn);
    }

    if address.version > 0 {
        if flags.contains(crate::flags::DISCOURAGE_UPGRADABLE_WITNESS_PROGRAM) {
            return Err(ScriptError::DiscourageUpgradableWitnessProgram);
        }
        return Ok(());
    }

    for item in witness {
        if item.len() > MAX_SCRIPT_PUSH {
            return Err(ScriptError::PushSize(item.len(), MAX_SCRIPT_PUSH));
        }
    }

    let script = match address.hash.len() {
        20 => {
            let [sig, pubkey] = <[Vec<u8>; 2]>::try_from(witness.to_vec()).map_err(|_| ScriptError::WitnessProgramWitnessEmpty)?;
            let script = p2pkh_script(&address.hash);
            return run(&script, vec![sig, pubkey], tx, input_index, input_value, flags, sig_cache);
        }
        32 => {
            let script = witness.last().ok_or(ScriptError::WitnessProgramWitnessEmpty)?.clone();
            if script.len() > MAX_SCRIPT_SIZE {
                return Err(ScriptError::ScriptSize(script.len(), MAX_SCRIPT_SIZE));
            }
            let committed = hnsd_hashes::sha3_256(&script);
            if committed.as_bytes().as_slice() != address.hash.as_slice() {
                return Err(ScriptError::WitnessProgramMismatch);
            }
            script
        }
        len => return Err(ScriptError::WitnessProgramWrongLength(len)),
    };

    let initial_stack: Stack = witness[..witness.len() - 1].to_vec();
    run(&script, initial_stack, tx, input_index, input_value, flags, sig_cache)
}

#[allow(clippy::too_many_arguments)]
fn run(
    script: &[u8],
    initial_stack: Stack,
    tx: &Transaction,
    input_index: usize,
    input_value: u64,
    flags: VerifyFlags,
    sig_cache: &SignatureCache,
) -> Result<(), ScriptError> {
    let reused_values = SigHashReusedValues::new();
    let source = ScriptSource::TxInput { tx, input_index, prevout_value: input_value };
    let mut engine = TxScriptEngine::new(script, initial_stack, source, flags, sig_cache, &reused_values)?;
    engine.execute()?;
    engine.check_error_condition()
}

/// Convenience constructor for a fresh, unshared signature-verification
/// cache; production callers share one `SignatureCache` across a whole
/// block's worth of inputs.
pub fn new_signature_cache(size: u64) -> SignatureCache {
    Cache::new(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hnsd_addresses::Network;
    use hnsd_consensus_core::hashing::sighash::calc_signature_hash;
    use hnsd_consensus_core::hashing::sighash_type::SIG_HASH_ALL;
    use hnsd_consensus_core::hashing::sighash_type::SigHashType;
    use hnsd_consensus_core::tx::{Covenant, Input, Output, Outpoint};

    fn sample_tx(address: &Address) -> Transaction {
        let input = Input::new(Outpoint::new(hnsd_consensus_core::Hash::default(), 0), 0, vec![]);
        let output = Output::new(1000, address.clone(), Covenant::none());
        Transaction::new(0, vec![input], vec![output], 0)
    }

    #[test]
    fn test_p2pkh_witness_program_20() {
        let secp = secp256k1::Secp256k1::new();
        let keypair = secp256k1::Keypair::new(&secp, &mut rand::thread_rng());
        let (xonly, _) = keypair.x_only_public_key();
        let hash20 = hnsd_hashes::blake160(&xonly.serialize());
        let address = Address::new(Network::Regtest, 0, &hash20).unwrap();

        let tx = sample_tx(&address);
        let script = p2pkh_script(&hash20);
        let reused = SigHashReusedValues::new();
        let sighash = calc_signature_hash(&tx, 0, 1000, &script, SigHashType::from_u8(SIG_HASH_ALL.to_u8()).unwrap(), &reused);
        let message = secp256k1::Message::from_digest_slice(sighash.as_bytes()).unwrap();
        let sig = keypair.sign_schnorr(message);
        let mut sig_bytes = sig.as_ref().to_vec();
        sig_bytes.push(SIG_HASH_ALL.to_u8());

        let cache = new_signature_cache(16);
        let witness = vec![sig_bytes, xonly.serialize().to_vec()];
        assert!(verify_witness(&witness, &address, &tx, 0, 1000, VerifyFlags::STANDARD, &cache).is_ok());
    }

    #[test]
    fn test_committed_script_witness_program_32() {
        let script = crate::builder::ScriptBuilder::new().add_op(crate::opcodes::OP_TRUE).into_bytes();
        let hash32 = hnsd_hashes::sha3_256(&script);
        let address = Address::new(Network::Regtest, 0, hash32.as_bytes()).unwrap();
        let tx = sample_tx(&address);
        let cache = new_signature_cache(16);
        let witness = vec![script];
        assert!(verify_witness(&witness, &address, &tx, 0, 1000, VerifyFlags::STANDARD, &cache).is_ok());
    }

    #[test]
    fn test_committed_script_mismatch_fails() {
        let script = crate::builder::ScriptBuilder::new().add_op(crate::opcodes::OP_TRUE).into_bytes();
        let wrong_hash = hnsd_hashes::sha3_256(b"not the script");
        let address = Address::new(Network::Regtest, 0, wrong_hash.as_bytes()).unwrap();
        let tx = sample_tx(&address);
        let cache = new_signature_cache(16);
        let witness = vec![script];
        assert!(matches!(
            verify_witness(&witness, &address, &tx, 0, 1000, VerifyFlags::STANDARD, &cache),
            Err(ScriptError::WitnessProgramMismatch)
        ));
    }

    #[test]
    fn test_nulldata_version_fails() {
        let address = Address::new(Network::Regtest, 31, &[0u8; 20]).unwrap();
        let tx = sample_tx(&address);
        let cache = new_signature_cache(16);
        assert!(matches!(verify_witness(&[], &address, &tx, 0, 1000, VerifyFlags::STANDARD, &cache), Err(ScriptError::OpReturn)));
    }

    #[test]
    fn test_future_version_reserved_succeeds_without_script() {
        let address = Address::new(Network::Regtest, 1, &[0u8; 20]).unwrap();
        let tx = sample_tx(&address);
        let cache = new_signature_cache(16);
        assert!(verify_witness(&[], &address, &tx, 0, 1000, VerifyFlags::STANDARD, &cache).is_ok());
    }

    #[test]
    fn test_wrong_hash_length_fails() {
        let address = Address::new(Network::Regtest, 0, &[0u8; 21]).unwrap();
        let tx = sample_tx(&address);
        let cache = new_signature_cache(16);
        assert!(matches!(
            verify_witness(&[], &address, &tx, 0, 1000, VerifyFlags::STANDARD, &cache),
            Err(ScriptError::WitnessProgramWrongLength(21))
        ));
    }
}
