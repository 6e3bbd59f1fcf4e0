//! Error taxonomy shared by the core components.
//!
//! Every error carries the offending value so callers can report it without
//! re-deriving context. Skylink parse failures live next to the codec in
//! [`crate::skylink::ParseError`]; encryption failures in
//! [`crate::mysky::EncryptionError`].

use crate::{mysky::EncryptionError, skylink::ParseError};

/// A required value had the wrong shape: length, encoding or bounds.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("invalid length for {name}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid hex for {name}: {value:?}")]
    InvalidHex { name: &'static str, value: String },

    #[error("data too long: {actual} bytes (max: {max})")]
    DataTooLong { actual: usize, max: usize },

    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    #[error("invalid public key string {0:?}: expected 'ed25519:<hex>'")]
    InvalidPublicKeyString(String),

    #[error("unsupported key algorithm {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("size {0} cannot be padded")]
    PaddingOverflow(u64),
}

impl ValidationError {
    pub(crate) fn length(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            name,
            expected,
            actual,
        }
    }
}

/// Signing or verification could not be carried out on the given input.
///
/// A well-formed signature that simply does not verify is *not* an error;
/// verification returns `Ok(false)` for it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SignatureError {
    #[error("public key {0} is not a valid ed25519 point")]
    MalformedPublicKey(String),

    #[error("private key does not match its embedded public key")]
    MalformedPrivateKey,

    #[error("signature verification failed for public key {0}")]
    InvalidSignature(String),
}

/// A revision number broke the registry's ordering rules.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RevisionError {
    #[error("revision {} is reserved and cannot be stored", u64::MAX)]
    SentinelRevision,

    #[error("revision {attempted} is not greater than the current revision {previous}")]
    NotMonotonic { previous: u64, attempted: u64 },

    #[error("current revision {previous} cannot be incremented")]
    Exhausted { previous: u64 },
}

/// The operating system's secure randomness source failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("entropy source unavailable: {0}")]
pub struct EntropyError(pub String);

/// Union of every error the core can return.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Revision(#[from] RevisionError),

    #[error(transparent)]
    Entropy(#[from] EntropyError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_carry_offending_values() {
        let err = ValidationError::length("seed", 32, 31);
        assert_eq!(
            err.to_string(),
            "invalid length for seed: expected 32 bytes, got 31"
        );

        let err = RevisionError::NotMonotonic {
            previous: 4,
            attempted: 4,
        };
        assert!(err.to_string().contains("revision 4"));
        assert!(
            RevisionError::SentinelRevision
                .to_string()
                .contains("18446744073709551615")
        );
    }

    #[test]
    fn test_error_from_conversions() {
        let err: Error = RevisionError::SentinelRevision.into();
        assert!(matches!(err, Error::Revision(RevisionError::SentinelRevision)));

        let err: Error = ParseError::UnsupportedVersion(3).into();
        assert!(matches!(err, Error::Parse(ParseError::UnsupportedVersion(3))));
    }
}
