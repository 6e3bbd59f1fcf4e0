//! JSON shape of registry writes as portals accept them.

use serde::{Deserialize, Serialize};

use super::{DataKey, RegistryEntry, SignedRegistryEntry};
use crate::{Error, PublicKey, Signature, error::ValidationError};

const ED25519_ALGORITHM: &str = "ed25519";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePublicKey {
    pub algorithm: String,
    pub key: Vec<u8>,
}

/// Body of a registry write.
///
/// Byte fields serialize as JSON arrays of numbers and the data key as hex,
/// which is what portals expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntryRequest {
    pub publickey: WirePublicKey,
    pub datakey: String,
    pub revision: u64,
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl From<&SignedRegistryEntry> for RegistryEntryRequest {
    fn from(signed: &SignedRegistryEntry) -> Self {
        let entry = signed.entry();
        Self {
            publickey: WirePublicKey {
                algorithm: ED25519_ALGORITHM.to_owned(),
                key: signed.public_key().as_bytes().to_vec(),
            },
            datakey: entry.data_key().hash().to_hex(),
            revision: entry.revision(),
            data: entry.data().to_vec(),
            signature: signed.signature().as_bytes().to_vec(),
        }
    }
}

impl TryFrom<RegistryEntryRequest> for SignedRegistryEntry {
    type Error = Error;

    /// Validates every field. The signature itself is not checked.
    fn try_from(request: RegistryEntryRequest) -> Result<Self, Self::Error> {
        if request.publickey.algorithm != ED25519_ALGORITHM {
            return Err(ValidationError::UnsupportedAlgorithm(request.publickey.algorithm).into());
        }
        let public_key = PublicKey::from_slice(&request.publickey.key)?;
        let signature = Signature::from_slice(&request.signature)?;
        let data_key = DataKey::from_hex(&request.datakey)?;
        let entry = RegistryEntry::new(data_key, request.data, request.revision)?;
        Ok(SignedRegistryEntry::new(entry, signature, public_key))
    }
}
