//! The witness-script interpreter and the `CHECKSIG` family's
//! signature verification. A flat `match` over plain `u8` opcodes, not a
//! const-generic struct per opcode — see DESIGN.md for why.

use crate::caches::Cache;
use crate::data_stack::{DataStack, Stack};
use crate::flags::{self, VerifyFlags};
use crate::num::ScriptNum;
use crate::opcodes::*;
use hnsd_consensus_core::hashing::sighash::{calc_signature_hash, SigHashReusedValues};
use hnsd_consensus_core::hashing::sighash_type::SigHashType;
use hnsd_consensus_core::tx::Transaction;
use hnsd_txscript_errors::ScriptError;
use secp256k1::schnorr;
use secp256k1::{Message, XOnlyPublicKey};

pub const MAX_SCRIPT_SIZE: usize = 10_000;
pub const MAX_SCRIPT_OPS: usize = 201;
pub const MAX_SCRIPT_STACK: usize = 1_000;
pub const MAX_SCRIPT_PUSH: usize = 520;
pub const MAX_SCRIPT_NUM_SIZE: usize = 4;
pub const MAX_LOCKTIME_SIZE: usize = 5;
/// 64-byte Schnorr signature + 1 sighash-type byte.
pub const SIGNATURE_LENGTH: usize = 65;

/// `n/2`, big-endian, for the secp256k1 curve order. A signature whose `s`
/// scalar exceeds this fails the `LOW_S` encoding check.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4,
    0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

pub type SignatureCache = Cache<(hnsd_consensus_core::Hash, Vec<u8>, Vec<u8>), bool>;

/// Where the engine draws its transaction-introspection context from.
/// `StandAlone` scripts (used in tests and by `hnsd-names`' covenant-pattern
/// fixtures) have no transaction at all: `OP_TYPE`/`OP_CHECKOUTPUT`/
/// `CHECKSIG`/`CHECKLOCKTIMEVERIFY`/`CHECKSEQUENCEVERIFY` all fail against
/// them.
pub enum ScriptSource<'a> {
    TxInput { tx: &'a Transaction, input_index: usize, prevout_value: u64 },
    StandAlone,
}

impl<'a> ScriptSource<'a> {
    fn tx_context(&self) -> Result<(&'a Transaction, usize, u64), ScriptError> {
        match self {
            ScriptSource::TxInput { tx, input_index, prevout_value } => Ok((tx, *input_index, *prevout_value)),
            ScriptSource::StandAlone => Err(ScriptError::NoScripts),
        }
    }
}

pub struct TxScriptEngine<'a> {
    script: &'a [u8],
    pc: usize,
    dstack: Stack,
    astack: Stack,
    cond_stack: Vec<bool>,
    num_ops: usize,
    last_separator: usize,
    flags: VerifyFlags,
    source: ScriptSource<'a>,
    sig_cache: &'a SignatureCache,
    reused_values: &'a SigHashReusedValues,
}

impl<'a> TxScriptEngine<'a> {
    pub fn new(
        script: &'a [u8],
        initial_stack: Stack,
        source: ScriptSource<'a>,
        flags: VerifyFlags,
        sig_cache: &'a SignatureCache,
        reused_values: &'a SigHashReusedValues,
    ) -> Result<Self, ScriptError> {
        if script.len() > MAX_SCRIPT_SIZE {
            return Err(ScriptError::ScriptSize(script.len(), MAX_SCRIPT_SIZE));
        }
        Ok(Self {
            script,
            pc: 0,
            dstack: initial_stack,
            astack: Vec::new(),
            cond_stack: Vec::new(),
            num_ops: 0,
            last_separator: 0,
            flags,
            source,
            sig_cache,
            reused_values,
        })
    }

    #[inline]
    fn executing(&self) -> bool {
        self.cond_stack.iter().all(|&taken| taken)
    }

    /// Runs the script to completion. Does not itself check the final stack state — call
    /// `check_error_condition` after.
    pub fn execute(&mut self) -> Result<(), ScriptError> {
        while self.pc < self.script.len() {
            self.step()?;
        }
        if !self.cond_stack.is_empty() {
            return Err(ScriptError::UnbalancedConditional);
        }
        if self.dstack.len() + self.astack.len() > MAX_SCRIPT_STACK {
            return Err(ScriptError::StackSize(self.dstack.len() + self.astack.len(), MAX_SCRIPT_STACK));
        }
        Ok(())
    }

    /// Requires exactly one truthy value left on the stack.
    pub fn check_error_condition(&self) -> Result<(), ScriptError> {
        if self.dstack.len() != 1 {
            return Err(ScriptError::EvalFalse);
        }
        if !self.dstack.last_raw::<1>().map(|[v]| is_truthy(&v)).unwrap_or(false) {
            return Err(ScriptError::EvalFalse);
        }
        Ok(())
    }

    fn step(&mut self) -> Result<(), ScriptError> {
        let pos = self.pc;
        let code = self.script[pos];
        self.pc += 1;

        // Pushes execute even inside a non-taken branch only insofar as the
        // cursor must still advance past their inline data; the value is
        // simply not pushed onto the stack.
        if let Some(data) = self.read_push_data(code, pos)? {
            if self.executing() {
                if data.len() > MAX_SCRIPT_PUSH {
                    return Err(ScriptError::PushSize(data.len(), MAX_SCRIPT_PUSH));
                }
                self.dstack.push(data);
            }
            return Ok(());
        }

        if let Some(value) = small_int_value(code) {
            if self.executing() {
                self.dstack.push_num(ScriptNum(value));
            }
            return Ok(());
        }

        // Flow-control opcodes always run, even in a non-taken branch, so
        // nesting can be tracked; everything else is skipped.
        if !matches!(code, OP_IF | OP_NOTIF | OP_ELSE | OP_ENDIF | OP_VERIF | OP_VERNOTIF) && !self.executing() {
            return Ok(());
        }

        if !matches!(code, OP_IF | OP_NOTIF | OP_ELSE | OP_ENDIF) {
            self.num_ops += 1;
            if self.num_ops > MAX_SCRIPT_OPS {
                return Err(ScriptError::OpCount(MAX_SCRIPT_OPS));
            }
        }

        if is_disabled(code) {
            return Err(ScriptError::DisabledOpcode(code, pos));
        }

        self.execute_opcode(code, pos)
    }

    /// Reads inline push data for the opcode at `pos`, advancing `self.pc`
    /// past it. Returns `None` for opcodes that are not pushes.
    fn read_push_data(&mut self, code: u8, pos: usize) -> Result<Option<Vec<u8>>, ScriptError> {
        let len = if is_small_data_push(code) {
            code as usize
        } else {
            match code {
                OP_PUSHDATA1 => {
                    let n = self.take(1)?[0] as usize;
                    n
                }
                OP_PUSHDATA2 => {
                    let b = self.take(2)?;
                    u16::from_le_bytes([b[0], b[1]]) as usize
                }
                OP_PUSHDATA4 => {
                    let b = self.take(4)?;
                    u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize
                }
                OP_FALSE => return Ok(Some(Vec::new())),
                _ => return Ok(None),
            }
        };
        if len > MAX_SCRIPT_PUSH {
            return Err(ScriptError::PushSize(len, MAX_SCRIPT_PUSH));
        }
        let bytes = self.take(len)?;
        let _ = pos;
        Ok(Some(bytes.to_vec()))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ScriptError> {
        if self.pc + n > self.script.len() {
            return Err(ScriptError::PushSize(n, self.script.len() - self.pc));
        }
        let slice = &self.script[self.pc..self.pc + n];
        self.pc += n;
        Ok(slice)
    }

    fn minimal(&self) -> bool {
        self.flags.contains(flags::MINIMALDATA)
    }

    fn execute_opcode(&mut self, code: u8, pos: usize) -> Result<(), ScriptError> {
        match code {
            OP_NOP => {}
            OP_VER | OP_RESERVED | OP_RESERVED1 | OP_RESERVED2 => return Err(ScriptError::BadOpcode(code, pos)),

            OP_IF | OP_NOTIF => {
                let taken = if self.executing() {
                    let [raw] = self.dstack.pop_raw::<1>()?;
                    if self.minimal() && !(raw.is_empty() || raw.len() == 1) {
                        return Err(ScriptError::MinimalIf(pos));
                    }
                    let truthy = is_truthy(&raw);
                    if code == OP_IF {
                        truthy
                    } else {
                        !truthy
                    }
                } else {
                    // value irrelevant while skipping; push a placeholder level
                    false
                };
                self.cond_stack.push(taken);
            }
            OP_ELSE => {
                let top = self.cond_stack.last_mut().ok_or(ScriptError::UnbalancedConditional)?;
                *top = !*top;
            }
            OP_ENDIF => {
                self.cond_stack.pop().ok_or(ScriptError::UnbalancedConditional)?;
            }
            OP_VERIF | OP_VERNOTIF => return Err(ScriptError::BadOpcode(code, pos)),

            OP_VERIFY => {
                if !self.dstack.pop_bool()? {
                    return Err(ScriptError::Verify(pos));
                }
            }
            OP_RETURN => return Err(ScriptError::OpReturn),

            OP_TOALTSTACK => {
                let [v] = self.dstack.pop_raw::<1>()?;
                self.astack.push(v);
            }
            OP_FROMALTSTACK => {
                let v = self.astack.pop().ok_or(ScriptError::InvalidAltstackOperation(pos))?;
                self.dstack.push(v);
            }
            OP_2DROP => self.dstack.drop_item::<2>()?,
            OP_2DUP => self.dstack.dup_item::<2>()?,
            OP_3DUP => self.dstack.dup_item::<3>()?,
            OP_2OVER => self.dstack.over_item::<2>()?,
            OP_2ROT => self.dstack.rot_item::<2>()?,
            OP_2SWAP => self.dstack.swap_item::<2>()?,
            OP_IFDUP => {
                let [v] = self.dstack.last_raw::<1>()?;
                if is_truthy(&v) {
                    self.dstack.push(v);
                }
            }
            OP_DEPTH => self.dstack.push_num(ScriptNum(self.dstack.len() as i64)),
            OP_DROP => self.dstack.drop_item::<1>()?,
            OP_DUP => self.dstack.dup_item::<1>()?,
            OP_NIP => {
                let [a, b] = self.dstack.pop_raw::<2>()?;
                let _ = a;
                self.dstack.push(b);
            }
            OP_OVER => self.dstack.over_item::<1>()?,
            OP_PICK | OP_ROLL => {
                let n = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
                if n < 0 || n as usize >= self.dstack.len() {
                    return Err(ScriptError::InvalidStackOperation(n.max(0) as usize, pos));
                }
                let idx = self.dstack.len() - 1 - n as usize;
                let item = self.dstack[idx].clone();
                if code == OP_ROLL {
                    self.dstack.remove(idx);
                }
                self.dstack.push(item);
            }
            OP_ROT => self.dstack.rot_item::<1>()?,
            OP_SWAP => self.dstack.swap_item::<1>()?,
            OP_TUCK => {
                let [a, b] = self.dstack.pop_raw::<2>()?;
                self.dstack.push(b.clone());
                self.dstack.push(a);
                self.dstack.push(b);
            }

            OP_SIZE => {
                let [v] = self.dstack.last_raw::<1>()?;
                self.dstack.push_num(ScriptNum(v.len() as i64));
            }
            OP_EQUAL => {
                let [a, b] = self.dstack.pop_raw::<2>()?;
                self.dstack.push_bool(a == b);
            }
            OP_EQUALVERIFY => {
                let [a, b] = self.dstack.pop_raw::<2>()?;
                if a != b {
                    return Err(ScriptError::EqualVerify(pos));
                }
            }

            OP_1ADD => self.unary_num_op(pos, |n| Some(n + 1))?,
            OP_1SUB => self.unary_num_op(pos, |n| Some(n - 1))?,
            OP_NEGATE => self.unary_num_op(pos, |n| Some(-n))?,
            OP_ABS => self.unary_num_op(pos, |n| Some(n.abs()))?,
            OP_NOT => self.unary_num_op(pos, |n| Some((n == 0) as i64))?,
            OP_0NOTEQUAL => self.unary_num_op(pos, |n| Some((n != 0) as i64))?,

            OP_ADD => self.binary_num_op(pos, |a, b| Some(a + b))?,
            OP_SUB => self.binary_num_op(pos, |a, b| Some(a - b))?,
            OP_BOOLAND => self.binary_num_op(pos, |a, b| Some((a != 0 && b != 0) as i64))?,
            OP_BOOLOR => self.binary_num_op(pos, |a, b| Some((a != 0 || b != 0) as i64))?,
            OP_NUMEQUAL => self.binary_num_op(pos, |a, b| Some((a == b) as i64))?,
            OP_NUMNOTEQUAL => self.binary_num_op(pos, |a, b| Some((a != b) as i64))?,
            OP_LESSTHAN => self.binary_num_op(pos, |a, b| Some((a < b) as i64))?,
            OP_GREATERTHAN => self.binary_num_op(pos, |a, b| Some((a > b) as i64))?,
            OP_LESSTHANOREQUAL => self.binary_num_op(pos, |a, b| Some((a <= b) as i64))?,
            OP_GREATERTHANOREQUAL => self.binary_num_op(pos, |a, b| Some((a >= b) as i64))?,
            OP_MIN => self.binary_num_op(pos, |a, b| Some(a.min(b)))?,
            OP_MAX => self.binary_num_op(pos, |a, b| Some(a.max(b)))?,
            OP_NUMEQUALVERIFY => {
                let a = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
                let b = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
                if a != b {
                    return Err(ScriptError::NumEqualVerify(pos));
                }
            }
            OP_WITHIN => {
                let max = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
                let min = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
                let x = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
                self.dstack.push_bool(x >= min && x < max);
            }

            OP_BLAKE160 => self.hash_op(|d| hnsd_hashes::blake160(d).to_vec())?,
            OP_BLAKE256 => self.hash_op(|d| hnsd_hashes::blake256(d).as_bytes().to_vec())?,
            OP_SHA3 => self.hash_op(|d| hnsd_hashes::sha3_256(d).as_bytes().to_vec())?,
            OP_KECCAK256 => self.hash_op(|d| hnsd_hashes::keccak256(d).as_bytes().to_vec())?,
            OP_SHA256 => self.hash_op(|d| hnsd_hashes::sha256(d).to_vec())?,
            OP_SHA1 => self.hash_op(|d| hnsd_hashes::sha1(d).to_vec())?,
            OP_RIPEMD160 => self.hash_op(|d| hnsd_hashes::ripemd160(d).to_vec())?,
            OP_HASH160 => self.hash_op(|d| hnsd_hashes::hash160(d).to_vec())?,
            OP_HASH256 => self.hash_op(|d| hnsd_hashes::hash256(d).to_vec())?,

            OP_CODESEPARATOR => self.last_separator = self.pc,

            OP_CHECKSIG => {
                let ok = self.check_sig(pos)?;
                self.dstack.push_bool(ok);
            }
            OP_CHECKSIGVERIFY => {
                if !self.check_sig(pos)? {
                    return Err(ScriptError::CheckSigVerify(pos));
                }
            }
            OP_CHECKMULTISIG => {
                let ok = self.check_multisig(pos)?;
                self.dstack.push_bool(ok);
            }
            OP_CHECKMULTISIGVERIFY => {
                if !self.check_multisig(pos)? {
                    return Err(ScriptError::CheckMultisigVerify(pos));
                }
            }

            OP_CHECKLOCKTIMEVERIFY => self.check_locktime(pos)?,
            OP_CHECKSEQUENCEVERIFY => self.check_sequence(pos)?,

            OP_TYPE => {
                let (tx, input_index, _) = self.source.tx_context()?;
                let kind = tx.outputs.get(input_index).map(|o| o.covenant.kind as u8 as i64).unwrap_or(0);
                self.dstack.push_num(ScriptNum(kind));
            }
            OP_CHECKOUTPUT => {
                let ok = self.check_output(pos)?;
                self.dstack.push_bool(ok);
            }

            _ => return Err(ScriptError::BadOpcode(code, pos)),
        }
        Ok(())
    }

    fn unary_num_op(&mut self, _pos: usize, f: impl Fn(i64) -> Option<i64>) -> Result<(), ScriptError> {
        let n = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
        self.dstack.push_num(ScriptNum(f(n).unwrap_or(0)));
        Ok(())
    }

    fn binary_num_op(&mut self, _pos: usize, f: impl Fn(i64, i64) -> Option<i64>) -> Result<(), ScriptError> {
        let b = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
        let a = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
        self.dstack.push_num(ScriptNum(f(a, b).unwrap_or(0)));
        Ok(())
    }

    fn hash_op(&mut self, f: impl Fn(&[u8]) -> Vec<u8>) -> Result<(), ScriptError> {
        let [v] = self.dstack.pop_raw::<1>()?;
        self.dstack.push(f(&v));
        Ok(())
    }

    /// Subscript fed into `CHECKSIG`: the script from the most recent
    /// `OP_CODESEPARATOR` to the end.
    fn subscript(&self) -> &'a [u8] {
        &self.script[self.last_separator..]
    }

    fn check_sig(&mut self, pos: usize) -> Result<bool, ScriptError> {
        let [sig_and_type, pubkey_bytes] = self.dstack.pop_raw::<2>()?;
        if sig_and_type.is_empty() {
            return Ok(false);
        }
        verify_one_signature(
            &sig_and_type,
            &pubkey_bytes,
            self.subscript(),
            &self.source,
            self.sig_cache,
            self.reused_values,
            pos,
        )
    }

    fn check_multisig(&mut self, pos: usize) -> Result<bool, ScriptError> {
        let pubkey_count = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
        if !(0..=20).contains(&pubkey_count) {
            return Err(ScriptError::PubkeyCount(pubkey_count, pos));
        }
        let mut pubkeys = Vec::with_capacity(pubkey_count as usize);
        for _ in 0..pubkey_count {
            let [pk] = self.dstack.pop_raw::<1>()?;
            pubkeys.push(pk);
        }
        // pop_raw pops from the stack top downward, so pubkeys came off in
        // reverse script order; restore script order (first-pushed first).
        pubkeys.reverse();

        let sig_count = self.dstack.pop_num(self.minimal(), MAX_SCRIPT_NUM_SIZE)?.as_i64();
        if sig_count < 0 || sig_count > pubkey_count {
            return Err(ScriptError::SigCount(sig_count, pos));
        }
        let mut sigs = Vec::with_capacity(sig_count as usize);
        for _ in 0..sig_count {
            let [sig] = self.dstack.pop_raw::<1>()?;
            sigs.push(sig);
        }
        sigs.reverse();

        let subscript = self.subscript();
        let mut pk_iter = pubkeys.iter();
        let mut all_empty = true;
        for sig in &sigs {
            if !sig.is_empty() {
                all_empty = false;
            }
            let mut matched = false;
            for pk in pk_iter.by_ref() {
                if sig.is_empty() {
                    matched = false;
                    break;
                }
                if verify_one_signature(sig, pk, subscript, &self.source, self.sig_cache, self.reused_values, pos)? {
                    matched = true;
                    break;
                }
            }
            if !matched {
                if self.flags.contains(flags::NULLFAIL) && !all_empty {
                    return Err(ScriptError::NullFail);
                }
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn check_locktime(&mut self, pos: usize) -> Result<(), ScriptError> {
        let (tx, _, _) = self.source.tx_context()?;
        let locktime = self.dstack.last_num(self.minimal(), MAX_LOCKTIME_SIZE)?.as_i64();
        if locktime < 0 {
            return Err(ScriptError::NegativeLocktime(pos));
        }
        if (locktime as u64) > tx.locktime as u64 {
            return Err(ScriptError::UnsatisfiedLocktime(pos));
        }
        Ok(())
    }

    fn check_sequence(&mut self, pos: usize) -> Result<(), ScriptError> {
        let (tx, input_index, _) = self.source.tx_context()?;
        let sequence = self.dstack.last_num(self.minimal(), MAX_LOCKTIME_SIZE)?.as_i64();
        if sequence < 0 {
            return Err(ScriptError::NegativeLocktime(pos));
        }
        if (sequence as u64) > tx.inputs[input_index].sequence as u64 {
            return Err(ScriptError::UnsatisfiedLocktime(pos));
        }
        Ok(())
    }

    /// `OP_CHECKOUTPUT`: pops `(expectedValue, addressHash,
    /// addressVersion)` and checks them against the same-index output of
    /// the spending transaction. `expectedValue == 0` means "same value as
    /// the input being spent."
    fn check_output(&mut self, pos: usize) -> Result<bool, ScriptError> {
        let (tx, input_index, input_value) = self.source.tx_context()?;
        let expected_value = self.dstack.pop_num(self.minimal(), 8)?.as_i64();
        let [address_hash] = self.dstack.pop_raw::<1>()?;
        let address_version = self.dstack.pop_num(self.minimal(), 1)?.as_i64();
        if !(0..=255).contains(&address_version) {
            return Err(ScriptError::PubkeyEncoding(pos));
        }
        let Some(output) = tx.outputs.get(input_index) else {
            return Ok(false);
        };
        let wanted_value = if expected_value == 0 { input_value } else { expected_value as u64 };
        Ok(output.value == wanted_value && output.address.version as i64 == address_version && output.address.hash.as_slice() == address_hash.as_slice())
    }
}

/// Verifies a single 65-byte `[64-byte Schnorr sig || sighash byte]` against
/// a 32-byte x-only pubkey.
fn verify_one_signature(
    sig_and_type: &[u8],
    pubkey_bytes: &[u8],
    subscript: &[u8],
    source: &ScriptSource,
    sig_cache: &SignatureCache,
    reused_values: &SigHashReusedValues,
    pos: usize,
) -> Result<bool, ScriptError> {
    if sig_and_type.len() != SIGNATURE_LENGTH {
        return Err(ScriptError::SigEncoding(pos));
    }
    let (sig_bytes, hash_type_byte) = sig_and_type.split_at(64);
    if sig_bytes[32..64] > SECP256K1_HALF_ORDER[..] {
        return Err(ScriptError::SigEncoding(pos));
    }
    let hash_type = SigHashType::from_u8(hash_type_byte[0]).map_err(|_| ScriptError::SigEncoding(pos))?;

    if pubkey_bytes.len() != 32 {
        return Err(ScriptError::PubkeyEncoding(pos));
    }
    let pubkey = XOnlyPublicKey::from_slice(pubkey_bytes).map_err(|_| ScriptError::PubkeyEncoding(pos))?;
    let signature = schnorr::Signature::from_slice(sig_bytes).map_err(|_| ScriptError::SigEncoding(pos))?;

    let (tx, input_index, input_value) = source.tx_context()?;
    let sighash = calc_signature_hash(tx, input_index, input_value, subscript, hash_type, reused_values);

    let cache_key = (sighash, sig_and_type.to_vec(), pubkey_bytes.to_vec());
    if let Some(cached) = sig_cache.get(&cache_key) {
        return Ok(cached);
    }

    let message = Message::from_digest_slice(sighash.as_bytes()).expect("sighash is always 32 bytes");
    let valid = signature.verify(&message, &pubkey).is_ok();
    sig_cache.insert(cache_key, valid);
    Ok(valid)
}

fn is_truthy(raw: &[u8]) -> bool {
    match raw.split_last() {
        None => false,
        Some((&last, rest)) => last & 0x7f != 0 || rest.iter().any(|&b| b != 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{p2pkh_script, ScriptBuilder};
    use hnsd_consensus_core::hashing::sighash_type::SIG_HASH_ALL;
    use hnsd_consensus_core::tx::{Covenant, CovenantKind, Input, Output, Outpoint, Transaction};
    use hnsd_addresses::{Address, Network};

    fn sample_tx_spending(covenant_kind: CovenantKind) -> Transaction {
        let address = Address::new(Network::Regtest, 0, &[0u8; 20]).unwrap();
        let input = Input::new(Outpoint::new(hnsd_consensus_core::Hash::default(), 0), 0, vec![]);
        let output = Output::new(1000, address, Covenant { kind: covenant_kind, items: vec![] });
        Transaction::new(0, vec![input], vec![output], 0)
    }

    fn run_standalone(script: &[u8], stack: Stack) -> Result<(), ScriptError> {
        let cache = SignatureCache::new(16);
        let reused = SigHashReusedValues::new();
        let mut engine = TxScriptEngine::new(script, stack, ScriptSource::StandAlone, VerifyFlags::STANDARD, &cache, &reused)?;
        engine.execute()?;
        engine.check_error_condition()
    }

    #[test]
    fn test_equal_true() {
        let script = ScriptBuilder::new().add_data(b"a").add_data(b"a").add_op(OP_EQUAL).into_bytes();
        assert!(run_standalone(&script, vec![]).is_ok());
    }

    #[test]
    fn test_equal_false() {
        let script = ScriptBuilder::new().add_data(b"a").add_data(b"b").add_op(OP_EQUAL).into_bytes();
        assert!(matches!(run_standalone(&script, vec![]), Err(ScriptError::EvalFalse)));
    }

    #[test]
    fn test_if_else_endif() {
        let script =
            ScriptBuilder::new().add_i64(0).add_op(OP_IF).add_i64(0).add_op(OP_ELSE).add_i64(1).add_op(OP_ENDIF).into_bytes();
        assert!(run_standalone(&script, vec![]).is_ok());
    }

    #[test]
    fn test_unbalanced_conditional_rejected() {
        let script = ScriptBuilder::new().add_i64(1).add_op(OP_IF).add_i64(1).into_bytes();
        assert!(matches!(run_standalone(&script, vec![]), Err(ScriptError::UnbalancedConditional)));
    }

    #[test]
    fn test_disabled_opcode_rejected() {
        let script = ScriptBuilder::new().add_data(b"a").add_data(b"b").add_op(OP_CAT).into_bytes();
        assert!(matches!(run_standalone(&script, vec![]), Err(ScriptError::DisabledOpcode(OP_CAT, _))));
    }

    #[test]
    fn test_p2pkh_signature_flow() {
        let secp = secp256k1::Secp256k1::new();
        let keypair = secp256k1::Keypair::new(&secp, &mut rand::thread_rng());
        let (xonly, _) = keypair.x_only_public_key();

        let hash20 = hnsd_hashes::blake160(&xonly.serialize());
        let script = p2pkh_script(&hash20);

        let tx = sample_tx_spending(CovenantKind::None);
        let reused = SigHashReusedValues::new();
        let sighash = calc_signature_hash(&tx, 0, 1000, &script, SigHashType::from_u8(SIG_HASH_ALL.to_u8()).unwrap(), &reused);
        let message = Message::from_digest_slice(sighash.as_bytes()).unwrap();
        let sig = keypair.sign_schnorr(message);

        let mut sig_bytes = sig.as_ref().to_vec();
        sig_bytes.push(SIG_HASH_ALL.to_u8());

        let cache = SignatureCache::new(16);
        let stack: Stack = vec![sig_bytes, xonly.serialize().to_vec()];
        let source = ScriptSource::TxInput { tx: &tx, input_index: 0, prevout_value: 1000 };
        let mut engine = TxScriptEngine::new(&script, stack, source, VerifyFlags::STANDARD, &cache, &reused).unwrap();
        engine.execute().unwrap();
        assert!(engine.check_error_condition().is_ok());
    }

    #[test]
    fn test_p2pkh_signature_tamper_fails() {
        let secp = secp256k1::Secp256k1::new();
        let keypair = secp256k1::Keypair::new(&secp, &mut rand::thread_rng());
        let (xonly, _) = keypair.x_only_public_key();
        let hash20 = hnsd_hashes::blake160(&xonly.serialize());
        let script = p2pkh_script(&hash20);

        let tx = sample_tx_spending(CovenantKind::None);
        let reused = SigHashReusedValues::new();
        let sighash = calc_signature_hash(&tx, 0, 1000, &script, SigHashType::from_u8(SIG_HASH_ALL.to_u8()).unwrap(), &reused);
        let message = Message::from_digest_slice(sighash.as_bytes()).unwrap();
        let sig = keypair.sign_schnorr(message);
        let mut sig_bytes = sig.as_ref().to_vec();
        sig_bytes[0] ^= 0xff;
        sig_bytes.push(SIG_HASH_ALL.to_u8());

        let cache = SignatureCache::new(16);
        let stack: Stack = vec![sig_bytes, xonly.serialize().to_vec()];
        let source = ScriptSource::TxInput { tx: &tx, input_index: 0, prevout_value: 1000 };
        let mut engine = TxScriptEngine::new(&script, stack, source, VerifyFlags::STANDARD, &cache, &reused).unwrap();
        engine.execute().unwrap();
        assert!(matches!(engine.check_error_condition(), Err(ScriptError::EvalFalse)));
    }

    #[test]
    fn test_op_type_matches_output_covenant() {
        // fromScript([OP_TYPE, OP_<RENEW>, OP_EQUAL]) for a RENEW (type 8) output
        let script = ScriptBuilder::new().add_op(OP_TYPE).add_i64(CovenantKind::Renew as i64).add_op(OP_EQUAL).into_bytes();
        let tx = sample_tx_spending(CovenantKind::Renew);
        let cache = SignatureCache::new(16);
        let reused = SigHashReusedValues::new();
        let source = ScriptSource::TxInput { tx: &tx, input_index: 0, prevout_value: 1000 };
        let mut engine = TxScriptEngine::new(&script, vec![], source, VerifyFlags::STANDARD, &cache, &reused).unwrap();
        engine.execute().unwrap();
        assert!(engine.check_error_condition().is_ok());

        // a different output covenant type fails
        let tx_wrong = sample_tx_spending(CovenantKind::Update);
        let source_wrong = ScriptSource::TxInput { tx: &tx_wrong, input_index: 0, prevout_value: 1000 };
        let mut engine_wrong = TxScriptEngine::new(&script, vec![], source_wrong, VerifyFlags::STANDARD, &cache, &reused).unwrap();
        engine_wrong.execute().unwrap();
        assert!(matches!(engine_wrong.check_error_condition(), Err(ScriptError::EvalFalse)));
    }

    #[test]
    fn test_op_checkoutput_matches_value_and_address() {
        let address = Address::new(Network::Regtest, 0, &[0u8; 20]).unwrap();
        let script = ScriptBuilder::new()
            .add_i64(address.version as i64)
            .add_data(address.hash.as_slice())
            .add_i64(1000)
            .add_op(OP_CHECKOUTPUT)
            .into_bytes();
        let tx = sample_tx_spending(CovenantKind::None);
        let cache = SignatureCache::new(16);
        let reused = SigHashReusedValues::new();
        let source = ScriptSource::TxInput { tx: &tx, input_index: 0, prevout_value: 1000 };
        let mut engine = TxScriptEngine::new(&script, vec![], source, VerifyFlags::STANDARD, &cache, &reused).unwrap();
        engine.execute().unwrap();
        assert!(engine.check_error_condition().is_ok());
    }

    #[test]
    fn test_op_checkoutput_zero_value_means_same_as_input() {
        let address = Address::new(Network::Regtest, 0, &[0u8; 20]).unwrap();
        let script =
            ScriptBuilder::new().add_i64(address.version as i64).add_data(address.hash.as_slice()).add_i64(0).add_op(OP_CHECKOUTPUT).into_bytes();
        let tx = sample_tx_spending(CovenantKind::None);
        let cache = SignatureCache::new(16);
        let reused = SigHashReusedValues::new();
        let source = ScriptSource::TxInput { tx: &tx, input_index: 0, prevout_value: 1000 };
        let mut engine = TxScriptEngine::new(&script, vec![], source, VerifyFlags::STANDARD, &cache, &reused).unwrap();
        engine.execute().unwrap();
        assert!(engine.check_error_condition().is_ok());
    }
}
