//! BLAKE2b-256, the hash every Skynet identifier is built from.

use std::fmt;

use blake2::{Blake2b, Digest, digest::consts::U32};

use crate::{encoding::encode_utf8_string, error::ValidationError};

type Blake2b256 = Blake2b<U32>;

/// Length of a [`Hash`] in bytes.
pub const HASH_LENGTH: usize = 32;

/// A BLAKE2b-256 digest.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    /// BLAKE2b-256 of no input at all.
    pub const EMPTY: Hash = Hash::from_bytes([
        14, 87, 81, 192, 38, 229, 67, 178, 232, 171, 46, 176, 96, 153, 218, 161, 209, 229, 223, 71,
        119, 143, 119, 135, 250, 171, 69, 205, 241, 47, 227, 168,
    ]);

    pub fn new(buf: impl AsRef<[u8]>) -> Self {
        hash_all(&[buf.as_ref()])
    }

    pub const fn from_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses exactly 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let bytes = hex::decode(s).map_err(|_| ValidationError::InvalidHex {
            name: "hash",
            value: s.to_owned(),
        })?;
        let arr: [u8; HASH_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ValidationError::length("hash", HASH_LENGTH, bytes.len()))?;
        Ok(Self(arr))
    }

    /// First 5 bytes as hex, for log lines.
    pub fn fmt_short(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.0[..5])
    }
}

/// Hashes the concatenation of `parts`.
///
/// Every multi-field hash in the protocol goes through here so that the
/// concatenation order is the only thing that distinguishes them.
pub fn hash_all(parts: &[&[u8]]) -> Hash {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; HASH_LENGTH];
    hasher.finalize_into((&mut out).into());
    Hash(out)
}

/// Hashes a human-readable data key into the 32-byte key used by the registry.
pub fn hash_data_key(data_key: &str) -> Hash {
    Hash::new(encode_utf8_string(data_key))
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LENGTH]> for Hash {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.fmt_short())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
