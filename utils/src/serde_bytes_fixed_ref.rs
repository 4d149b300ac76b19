//! Same as [`crate::serde_bytes`] but for fixed-size `[u8; N]`-backed types
//! that expose `as_bytes`/`from` conversions (e.g. `hnsd_hashes::Hash`).

use serde::{Deserializer, Serializer};

pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    crate::serde_bytes::serialize(value.as_ref(), serializer)
}

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> TryFrom<&'a [u8]>,
{
    let bytes = crate::serde_bytes::deserialize(deserializer)?;
    T::try_from(&bytes).map_err(|_| serde::de::Error::custom("wrong fixed-size byte length"))
}
