//! Opcode byte values and small push/stack-number helpers.
//!
//! Unlike the const-generic `OpCode<const CODE: u8>` struct-per-opcode system
//! this crate is descended from, opcodes here are plain `u8` constants
//! matched in `engine::TxScriptEngine::execute_opcode` — see DESIGN.md for
//! why the const-generic machinery was dropped.

/// `0x01..=0x4b`: push the following N bytes, N = the opcode value itself.
pub const OP_DATA_MIN: u8 = 0x01;
pub const OP_DATA_MAX: u8 = 0x4b;

pub const OP_FALSE: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_RESERVED: u8 = 0x50;
pub const OP_TRUE: u8 = 0x51;
pub const OP_2: u8 = 0x52;
pub const OP_16: u8 = 0x60;

pub const OP_NOP: u8 = 0x61;
pub const OP_VER: u8 = 0x62;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_VERIF: u8 = 0x65;
pub const OP_VERNOTIF: u8 = 0x66;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_RETURN: u8 = 0x6a;

pub const OP_TOALTSTACK: u8 = 0x6b;
pub const OP_FROMALTSTACK: u8 = 0x6c;
pub const OP_2DROP: u8 = 0x6d;
pub const OP_2DUP: u8 = 0x6e;
pub const OP_3DUP: u8 = 0x6f;
pub const OP_2OVER: u8 = 0x70;
pub const OP_2ROT: u8 = 0x71;
pub const OP_2SWAP: u8 = 0x72;
pub const OP_IFDUP: u8 = 0x73;
pub const OP_DEPTH: u8 = 0x74;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_NIP: u8 = 0x77;
pub const OP_OVER: u8 = 0x78;
pub const OP_PICK: u8 = 0x79;
pub const OP_ROLL: u8 = 0x7a;
pub const OP_ROT: u8 = 0x7b;
pub const OP_SWAP: u8 = 0x7c;
pub const OP_TUCK: u8 = 0x7d;

pub const OP_CAT: u8 = 0x7e;
pub const OP_SUBSTR: u8 = 0x7f;
pub const OP_LEFT: u8 = 0x80;
pub const OP_RIGHT: u8 = 0x81;
pub const OP_SIZE: u8 = 0x82;
pub const OP_INVERT: u8 = 0x83;
pub const OP_AND: u8 = 0x84;
pub const OP_OR: u8 = 0x85;
pub const OP_XOR: u8 = 0x86;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_RESERVED1: u8 = 0x89;
pub const OP_RESERVED2: u8 = 0x8a;

pub const OP_1ADD: u8 = 0x8b;
pub const OP_1SUB: u8 = 0x8c;
pub const OP_2MUL: u8 = 0x8d;
pub const OP_2DIV: u8 = 0x8e;
pub const OP_NEGATE: u8 = 0x8f;
pub const OP_ABS: u8 = 0x90;
pub const OP_NOT: u8 = 0x91;
pub const OP_0NOTEQUAL: u8 = 0x92;
pub const OP_ADD: u8 = 0x93;
pub const OP_SUB: u8 = 0x94;
pub const OP_MUL: u8 = 0x95;
pub const OP_DIV: u8 = 0x96;
pub const OP_MOD: u8 = 0x97;
pub const OP_LSHIFT: u8 = 0x98;
pub const OP_RSHIFT: u8 = 0x99;
pub const OP_BOOLAND: u8 = 0x9a;
pub const OP_BOOLOR: u8 = 0x9b;
pub const OP_NUMEQUAL: u8 = 0x9c;
pub const OP_NUMEQUALVERIFY: u8 = 0x9d;
pub const OP_NUMNOTEQUAL: u8 = 0x9e;
pub const OP_LESSTHAN: u8 = 0x9f;
pub const OP_GREATERTHAN: u8 = 0xa0;
pub const OP_LESSTHANOREQUAL: u8 = 0xa1;
pub const OP_GREATERTHANOREQUAL: u8 = 0xa2;
pub const OP_MIN: u8 = 0xa3;
pub const OP_MAX: u8 = 0xa4;
pub const OP_WITHIN: u8 = 0xa5;

// Hash opcodes: widened from the original 2-opcode set
// (OpSha256/OpBlake2b, needed only for P2SH) to the full 9-primitive set,
// reusing slots previously spent on ECDSA-flavored CHECKSIG/CHECKMULTISIG
// variants this project has no use for (sighashes here are always
// Schnorr-style).
pub const OP_BLAKE160: u8 = 0xa6;
pub const OP_SHA3: u8 = 0xa7;
pub const OP_SHA256: u8 = 0xa8;
pub const OP_KECCAK256: u8 = 0xa9;
pub const OP_BLAKE256: u8 = 0xaa;
pub const OP_SHA1: u8 = 0xab;

pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;
pub const OP_CHECKLOCKTIMEVERIFY: u8 = 0xb0;
pub const OP_CHECKSEQUENCEVERIFY: u8 = 0xb1;

pub const OP_RIPEMD160: u8 = 0xb2;
pub const OP_HASH160: u8 = 0xb3;
pub const OP_HASH256: u8 = 0xb4;
pub const OP_CODESEPARATOR: u8 = 0xb5;

// Introspection opcodes: no precedent in the original opcode
// set, new for this engine.
pub const OP_TYPE: u8 = 0xb6;
pub const OP_CHECKOUTPUT: u8 = 0xb7;

/// True for the `OP_DATA_1..=OP_DATA_75` direct-push range.
#[inline]
pub fn is_small_data_push(code: u8) -> bool {
    (OP_DATA_MIN..=OP_DATA_MAX).contains(&code)
}

/// True for `OP_1NEGATE` and `OP_2..=OP_16` (`OP_1` aliases `OP_TRUE`).
#[inline]
pub fn small_int_value(code: u8) -> Option<i64> {
    match code {
        OP_1NEGATE => Some(-1),
        OP_TRUE..=OP_16 => Some((code - OP_TRUE + 1) as i64),
        _ => None,
    }
}

/// Opcodes disabled outright regardless of execution state.
#[inline]
pub fn is_disabled(code: u8) -> bool {
    matches!(
        code,
        OP_CAT
            | OP_SUBSTR
            | OP_LEFT
            | OP_RIGHT
            | OP_INVERT
            | OP_AND
            | OP_OR
            | OP_XOR
            | OP_2MUL
            | OP_2DIV
            | OP_MUL
            | OP_DIV
            | OP_MOD
            | OP_LSHIFT
            | OP_RSHIFT
    )
}
