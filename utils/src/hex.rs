//! Hex formatting helper used by `Debug` impls on binary-heavy wire types
//! (signature scripts, covenant items, witness stack entries).

pub trait ToHex {
    fn to_hex(&self) -> String;
}

impl<T: AsRef<[u8]>> ToHex for T {
    fn to_hex(&self) -> String {
        let bytes = self.as_ref();
        let mut out = vec![0u8; bytes.len() * 2];
        faster_hex::hex_encode(bytes, &mut out).expect("output buffer is exactly twice the input size");
        String::from_utf8(out).expect("hex is always valid UTF-8")
    }
}
