use bytes::Bytes;

use super::{DataKey, MAX_ENTRY_DATA_LENGTH, MAX_REVISION};
use crate::{
    Error, Hash, KeyPair, PrivateKey, PublicKey, Signature,
    encoding::{encode_prefixed_bytes, encode_u64},
    error::{RevisionError, SignatureError, ValidationError},
    hash::hash_all,
};

/// An unsigned registry entry.
///
/// Validated on construction and immutable afterwards, so every value of
/// this type can be signed and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    data_key: DataKey,
    data: Bytes,
    revision: u64,
}

impl RegistryEntry {
    /// Builds an entry, rejecting data over [`MAX_ENTRY_DATA_LENGTH`] bytes
    /// and the reserved [`MAX_REVISION`].
    pub fn new(
        data_key: impl Into<DataKey>,
        data: impl Into<Bytes>,
        revision: u64,
    ) -> Result<Self, Error> {
        let data = data.into();
        if data.len() > MAX_ENTRY_DATA_LENGTH {
            return Err(ValidationError::DataTooLong {
                actual: data.len(),
                max: MAX_ENTRY_DATA_LENGTH,
            }
            .into());
        }
        if revision == MAX_REVISION {
            return Err(RevisionError::SentinelRevision.into());
        }

        Ok(Self {
            data_key: data_key.into(),
            data,
            revision,
        })
    }

    pub fn data_key(&self) -> &DataKey {
        &self.data_key
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The canonical byte string signatures are computed over, before hashing:
    ///
    /// ```text
    /// data_key_hash (32) || u64le(len(data)) || data || u64le(revision)
    /// ```
    pub fn signing_message(&self) -> Vec<u8> {
        let data_key = self.data_key.hash();
        let data = encode_prefixed_bytes(&self.data);
        [
            data_key.as_bytes().as_slice(),
            data.as_slice(),
            encode_u64(self.revision).as_slice(),
        ]
        .concat()
    }

    /// Hash of [`RegistryEntry::signing_message`]; this is what gets signed.
    pub fn hash(&self) -> Hash {
        hash_all(&[&self.signing_message()])
    }
}

/// Signs `entry` with `private_key`.
///
/// Fails with [`SignatureError::MalformedPrivateKey`] when the public half of
/// the key does not belong to its seed.
pub fn sign_entry(private_key: &PrivateKey, entry: &RegistryEntry) -> Result<Signature, SignatureError> {
    private_key.sign(entry.hash().as_bytes())
}

/// Checks the signature on `signed` against `public_key`.
///
/// The key is passed explicitly so that callers verify against the key
/// they looked the entry up under, not the one the entry claims.
pub fn verify_entry(
    public_key: &PublicKey,
    signed: &SignedRegistryEntry,
) -> Result<bool, SignatureError> {
    public_key.verify(signed.entry.hash().as_bytes(), &signed.signature)
}

/// A registry entry together with its signature and signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRegistryEntry {
    entry: RegistryEntry,
    signature: Signature,
    public_key: PublicKey,
}

impl SignedRegistryEntry {
    /// Assembles a signed entry without checking the signature.
    ///
    /// Used for entries received from elsewhere; call
    /// [`SignedRegistryEntry::verify`] before trusting one.
    pub fn new(entry: RegistryEntry, signature: Signature, public_key: PublicKey) -> Self {
        Self {
            entry,
            signature,
            public_key,
        }
    }

    pub fn sign(entry: RegistryEntry, key_pair: &KeyPair) -> Self {
        let signature = key_pair.sign(entry.hash().as_bytes());
        Self {
            entry,
            signature,
            public_key: *key_pair.public_key(),
        }
    }

    pub fn entry(&self) -> &RegistryEntry {
        &self.entry
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn into_entry(self) -> RegistryEntry {
        self.entry
    }

    /// Checks the signature against the embedded public key.
    pub fn verify(&self) -> Result<bool, SignatureError> {
        verify_entry(&self.public_key, self)
    }

    /// Like [`SignedRegistryEntry::verify`], but a mismatch is an error.
    pub fn verified(self) -> Result<Self, SignatureError> {
        if self.verify()? {
            Ok(self)
        } else {
            Err(SignatureError::InvalidSignature(self.public_key.to_string()))
        }
    }
}
