//! Name validity and name-hash rules shared by
//! every crate that needs to ask "is this a name" without pulling in the
//! auction state machine itself.

use crate::constants::{MAX_NAME_LENGTH, MIN_NAME_LENGTH};
use hnsd_hashes::Hash;

/// True for a 1..=63 byte lowercase DNS label: `[a-z0-9-]`, not starting or
/// ending with a hyphen. Mirrors the character set a human would type into a
/// bid; the wire layer never sees anything else.
pub fn is_valid_name(name: &[u8]) -> bool {
    if !(MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&name.len()) {
        return false;
    }
    if name[0] == b'-' || name[name.len() - 1] == b'-' {
        return false;
    }
    name.iter().all(|&b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// `sha3_256(name)`, deliberately *not* domain-separated`, independent of this implementation's internal hash set).
pub fn name_hash(name: &[u8]) -> Hash {
    hnsd_hashes::sha3_256(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name(b"abcde"));
        assert!(is_valid_name(b"a"));
        assert!(is_valid_name(b"a-b-c"));
        assert!(is_valid_name(&[b'a'; 63]));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_name(b""));
        assert!(!is_valid_name(&[b'a'; 64]));
        assert!(!is_valid_name(b"-abc"));
        assert!(!is_valid_name(b"abc-"));
        assert!(!is_valid_name(b"ABC"));
        assert!(!is_valid_name(b"a_b"));
        assert!(!is_valid_name("café".as_bytes()));
    }

    #[test]
    fn test_name_hash_matches_plain_sha3() {
        assert_eq!(name_hash(b"abcde"), hnsd_hashes::sha3_256(b"abcde"));
    }
}
