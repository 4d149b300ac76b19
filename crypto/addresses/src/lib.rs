use borsh::{BorshDeserialize, BorshSchema, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};
use thiserror::Error;

mod bech32;

/// Witness-program version reserved for unspendable, data-carrying outputs
/// (OP_RETURN-equivalent).
pub const NULLDATA_VERSION: u8 = 31;

const MIN_HASH_LEN: usize = 2;
const MAX_HASH_LEN: usize = 40;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum AddressError {
    #[error("invalid network prefix {0}")]
    InvalidPrefix(String),

    #[error("prefix is missing")]
    MissingPrefix,

    #[error("invalid witness program version {0}")]
    InvalidVersion(u8),

    #[error("witness program hash length {0} out of range 2..=40")]
    InvalidHashLength(usize),

    #[error("invalid character {0}")]
    DecodingError(char),

    #[error("checksum is invalid")]
    BadChecksum,
}

#[derive(
    PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize, BorshSchema,
)]
pub enum Network {
    #[serde(rename = "hns")]
    Main,
    #[serde(rename = "hnst")]
    Test,
    #[serde(rename = "hnsr")]
    Regtest,
    #[serde(rename = "hnss")]
    Simnet,
    #[cfg(test)]
    A,
    #[cfg(test)]
    B,
}

impl Network {
    fn hrp(&self) -> &'static str {
        match self {
            Network::Main => "hns",
            Network::Test => "hnst",
            Network::Regtest => "hnsr",
            Network::Simnet => "hnss",
            #[cfg(test)]
            Network::A => "a",
            #[cfg(test)]
            Network::B => "b",
        }
    }

    #[inline(always)]
    fn is_test(&self) -> bool {
        #[cfg(not(test))]
        return matches!(self, Network::Regtest | Network::Simnet | Network::Test);
        #[cfg(test)]
        matches!(self, Network::A | Network::B | Network::Regtest | Network::Simnet | Network::Test)
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hrp())
    }
}

impl TryFrom<&str> for Network {
    type Error = AddressError;

    fn try_from(prefix: &str) -> Result<Self, Self::Error> {
        match prefix {
            "hns" => Ok(Network::Main),
            "hnst" => Ok(Network::Test),
            "hnsr" => Ok(Network::Regtest),
            "hnss" => Ok(Network::Simnet),
            #[cfg(test)]
            "a" => Ok(Network::A),
            #[cfg(test)]
            "b" => Ok(Network::B),
            _ => Err(AddressError::InvalidPrefix(prefix.to_string())),
        }
    }
}

/// Size of the backing store for a witness program hash. Large enough to hold
/// the maximum 40-byte hash without spilling to the heap.
pub const HASH_VECTOR_SIZE: usize = 40;

pub type HashVec = SmallVec<[u8; HASH_VECTOR_SIZE]>;

/// A witness-program address: `(version, hash)` bech32-encoded with a
/// network-specific human-readable prefix. Version 31 marks an unspendable
/// nulldata output; versions 1..=30 are reserved for future witness programs
/// and execute no script.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug, Hash)]
pub struct Address {
    pub network: Network,
    pub version: u8,
    pub hash: HashVec,
}

impl Address {
    pub fn new(network: Network, version: u8, hash: &[u8]) -> Result<Self, AddressError> {
        if version > 31 {
            return Err(AddressError::InvalidVersion(version));
        }
        if !network.is_test() && !(MIN_HASH_LEN..=MAX_HASH_LEN).contains(&hash.len()) {
            return Err(AddressError::InvalidHashLength(hash.len()));
        }
        Ok(Self { network, version, hash: HashVec::from_slice(hash) })
    }

    pub fn is_nulldata(&self) -> bool {
        self.version == NULLDATA_VERSION
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.network, self.encode_payload())
    }
}

//
// Borsh serializers are implemented manually since SmallVec has no native
// Borsh support.
//

impl BorshSerialize for Address {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        borsh::BorshSerialize::serialize(&self.network, writer)?;
        borsh::BorshSerialize::serialize(&self.version, writer)?;
        borsh::BorshSerialize::serialize(&self.hash.as_slice(), writer)?;
        Ok(())
    }
}

impl BorshDeserialize for Address {
    fn deserialize(buf: &mut &[u8]) -> std::io::Result<Self> {
        let network: Network = borsh::BorshDeserialize::deserialize(buf)?;
        let version: u8 = borsh::BorshDeserialize::deserialize(buf)?;
        let hash: Vec<u8> = borsh::BorshDeserialize::deserialize(buf)?;
        Self::new(network, version, &hash).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }
}

impl BorshSchema for Address {
    fn add_definitions_recursively(
        definitions: &mut std::collections::HashMap<borsh::schema::Declaration, borsh::schema::Definition>,
    ) {
        let fields = borsh::schema::Fields::NamedFields(std::vec![
            ("network".to_string(), <Network>::declaration()),
            ("version".to_string(), <u8>::declaration()),
            ("hash".to_string(), <Vec<u8>>::declaration())
        ]);
        let definition = borsh::schema::Definition::Struct { fields };
        Self::add_definition(Self::declaration(), definition, definitions);
        <Network>::add_definitions_recursively(definitions);
        <Vec<u8>>::add_definitions_recursively(definitions);
    }

    fn declaration() -> borsh::schema::Declaration {
        "Address".to_string()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().try_into()
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.split_once(':') {
            Some((network, payload)) => Address::decode_payload(network.try_into()?, payload),
            None => Err(AddressError::MissingPrefix),
        }
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.try_into().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn cases() -> Vec<(Address, &'static str)> {
        vec![
            (Address::new(Network::A, 0, b"").unwrap(), "a:qqeq69uvrh"),
            (Address::new(Network::A, 8, b"").unwrap(), "a:pq99546ray"),
            (Address::new(Network::B, 8, b" ").unwrap(), "b:pqsqzsjd64fv"),
            (Address::new(Network::B, 8, b"-").unwrap(), "b:pqksmhczf8ud"),
        ]
    }

    #[test]
    fn check_round_trip_through_string() {
        for (address, _) in cases() {
            let address_str: String = address.clone().into();
            let decoded: Address = address_str.try_into().unwrap();
            assert_eq!(address, decoded);
        }
    }

    #[test]
    fn check_errors() {
        let bad_char: Result<Address, AddressError> = "a:qqeq69uvr1".try_into();
        assert!(matches!(bad_char, Err(AddressError::DecodingError('1'))));

        let missing_prefix: Result<Address, AddressError> = "qqeq69uvrh".try_into();
        assert_eq!(missing_prefix, Err(AddressError::MissingPrefix));

        let unknown_prefix: Result<Address, AddressError> = "nope:qqeq69uvrh".try_into();
        assert_eq!(unknown_prefix, Err(AddressError::InvalidPrefix("nope".into())));
    }

    #[test]
    fn check_hash_length_bounds() {
        assert!(Address::new(Network::Main, 0, &[0u8; 1]).is_err());
        assert!(Address::new(Network::Main, 0, &[0u8; 41]).is_err());
        assert!(Address::new(Network::Main, 0, &[0u8; 20]).is_ok());
        assert!(Address::new(Network::Main, 0, &[0u8; 40]).is_ok());
    }

    #[test]
    fn check_nulldata_version() {
        let addr = Address::new(Network::Main, NULLDATA_VERSION, &[0u8; 20]).unwrap();
        assert!(addr.is_nulldata());
    }
}
