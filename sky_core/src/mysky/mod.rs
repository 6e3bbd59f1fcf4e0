//! Path-keyed encryption material for the encrypted filesystem.
//!
//! Every file or directory path gets its own path seed, derived segment by
//! segment from a root path seed. A path seed yields the key entropy for the
//! file's contents and a tweak under which the encrypted file is stored in
//! the registry. The discoverable tweak is the public counterpart: anyone who
//! knows the path can compute it.
//!
//! ```text
//! Seed --derive_root_path_seed--> PathSeed ("/")
//!                                    |
//!            derive_encrypted_file_seed("app.hns/data/file.json")
//!                                    v
//!                                 PathSeed --+--> key entropy [32]
//!                                            +--> encrypted tweak (Hash)
//! ```
//!
//! All hashing here is SHA-512 truncated to 32 bytes, with fixed salts for
//! domain separation, except the discoverable tweak which uses the registry's
//! BLAKE2b.

mod derive;
mod encrypted_files;
mod tweak;

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

pub use derive::{
    derive_encrypted_file_key_entropy, derive_encrypted_file_seed, derive_encrypted_file_tweak,
    derive_encrypted_path_seed, derive_root_path_seed,
};
pub use encrypted_files::{
    ENCRYPTED_FILE_OVERHEAD, EncryptionError, check_padded_block, decrypt_file_bytes,
    encrypt_file_bytes, encrypt_file_bytes_with_nonce, pad_file_size,
};
pub use tweak::derive_discoverable_file_tweak;

use crate::{Hash, Seed, error::ValidationError};

/// Length of a [`PathSeed`] in bytes.
pub const ENCRYPTION_PATH_SEED_LENGTH: usize = 32;

/// Secret from which one path's encryption material is derived.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PathSeed([u8; ENCRYPTION_PATH_SEED_LENGTH]);

impl fmt::Debug for PathSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PathSeed(..)")
    }
}

impl PathSeed {
    pub const fn from_bytes(bytes: [u8; ENCRYPTION_PATH_SEED_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let arr: [u8; ENCRYPTION_PATH_SEED_LENGTH] = bytes.try_into().map_err(|_| {
            ValidationError::length("path seed", ENCRYPTION_PATH_SEED_LENGTH, bytes.len())
        })?;
        Ok(Self(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let mut bytes = hex::decode(s.trim()).map_err(|_| ValidationError::InvalidHex {
            name: "path seed",
            value: "<redacted>".to_owned(),
        })?;
        let seed = Self::from_slice(&bytes);
        bytes.zeroize();
        seed
    }

    pub fn as_bytes(&self) -> &[u8; ENCRYPTION_PATH_SEED_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Everything needed to store one encrypted file.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionMaterial {
    /// Key for [`encrypt_file_bytes`] / [`decrypt_file_bytes`].
    pub key_entropy: [u8; 32],
    /// Data key of the registry entry holding the encrypted file.
    #[zeroize(skip)]
    pub encrypted_tweak: Hash,
    /// Data key of the unencrypted counterpart of the same path.
    #[zeroize(skip)]
    pub discoverable_tweak: Hash,
}

impl fmt::Debug for EncryptionMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionMaterial")
            .field("key_entropy", &"..")
            .field("encrypted_tweak", &self.encrypted_tweak)
            .field("discoverable_tweak", &self.discoverable_tweak)
            .finish()
    }
}

impl EncryptionMaterial {
    /// Derives the material for the file at `path` under the user's root `seed`.
    pub fn derive(seed: &Seed, path: &str) -> Result<Self, ValidationError> {
        let path_seed = derive_encrypted_path_seed(seed, path, false)?;
        Ok(Self {
            key_entropy: derive_encrypted_file_key_entropy(&path_seed),
            encrypted_tweak: derive_encrypted_file_tweak(&path_seed),
            discoverable_tweak: derive_discoverable_file_tweak(path)?,
        })
    }
}

/// Splits `path` into its non-empty segments.
///
/// Surrounding whitespace and slashes are ignored and repeated slashes
/// collapse, so `" /a//b/ "` and `"a/b"` name the same path. A path with no
/// segments is rejected.
pub(crate) fn sanitize_path(path: &str) -> Result<Vec<&str>, ValidationError> {
    let segments: Vec<&str> = path
        .trim()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        return Err(ValidationError::InvalidPath(path.to_owned()));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_seed() -> Seed {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        Seed::from_bytes(bytes)
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("a/b").unwrap(), vec!["a", "b"]);
        assert_eq!(sanitize_path(" /a//b/ ").unwrap(), vec!["a", "b"]);
        assert_eq!(sanitize_path("file.json").unwrap(), vec!["file.json"]);

        for path in ["", "/", "  ", "///"] {
            assert_eq!(
                sanitize_path(path),
                Err(ValidationError::InvalidPath(path.to_owned()))
            );
        }
    }

    #[test]
    fn test_path_seed_length_validated() {
        assert!(PathSeed::from_slice(&[0u8; 32]).is_ok());
        assert_eq!(
            PathSeed::from_slice(&[0u8; 31]),
            Err(ValidationError::length("path seed", 32, 31))
        );
        assert_eq!(
            PathSeed::from_slice(&[0u8; 33]),
            Err(ValidationError::length("path seed", 32, 33))
        );
        assert!(matches!(
            PathSeed::from_hex("xyz"),
            Err(ValidationError::InvalidHex { .. })
        ));
    }

    #[test]
    fn test_encryption_material_known_values() {
        let material = EncryptionMaterial::derive(&counting_seed(), "app.hns/data/file.json").unwrap();

        assert_eq!(
            hex::encode(material.key_entropy),
            "bb624f1044b69a9f780a5ccb1b65d12baf4d8a041e902685f15ca8a4eb29e5f0"
        );
        assert_eq!(
            material.encrypted_tweak.to_hex(),
            "a1582d712a73ecf93e086540463d65b0baa678d84ba9d307caa4b21e74241af2"
        );
        assert_eq!(
            material.discoverable_tweak.to_hex(),
            "c5cb826068f12c93e3f1ab4a67e5d2270816398589321def8fb9f92538d1b447"
        );
    }

    #[test]
    fn test_encryption_material_debug_hides_key() {
        let material = EncryptionMaterial::derive(&counting_seed(), "a/b").unwrap();
        let debug = format!("{material:?}");
        assert!(!debug.contains(&hex::encode(material.key_entropy)));
    }

    #[test]
    fn test_encryption_material_rejects_empty_path() {
        assert!(matches!(
            EncryptionMaterial::derive(&counting_seed(), "//"),
            Err(ValidationError::InvalidPath(_))
        ));
    }
}
