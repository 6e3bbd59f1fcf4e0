//! Seeds, Ed25519 keypairs and child-seed derivation.
//!
//! ## Key Derivation Chain
//!
//! ```text
//! root seed [32 bytes]  (OS randomness, stored bytes, or a passphrase)
//!     |
//!     +-- ed25519 (RFC 8032) -> KeyPair (user identity)
//!     |
//!     +-- HMAC-SHA512(key = seed, msg = "app.hns")[..32] -> child seed
//!     |       |
//!     |       +-- ed25519 -> per-application KeyPair
//!     |
//!     +-- mysky::derive_root_path_seed -> encrypted filesystem path seeds
//! ```
//!
//! Every step is deterministic except fresh seed generation.

use std::{fmt, str::FromStr};

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey as Ed25519SigningKey, Verifier,
    VerifyingKey,
};
use hmac::{Hmac, Mac, digest::Key};
use sha2::{Sha256, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    encoding::encode_prefixed_bytes,
    error::{EntropyError, SignatureError, ValidationError},
};

type HmacSha512 = Hmac<Sha512>;

/// Length of every seed in the identity domain.
pub const SEED_LENGTH: usize = 32;

/// Size of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Size of an expanded Ed25519 private key (seed followed by public key).
pub const PRIVATE_KEY_LENGTH: usize = 64;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// PBKDF2 rounds for passphrase seeds.
const PASSPHRASE_ROUNDS: u32 = 1000;

/// Sia specifier for ed25519 keys, zero padded to 16 bytes.
const ED25519_SPECIFIER: [u8; 16] = *b"ed25519\0\0\0\0\0\0\0\0\0";

/// A fixed-length secret from which keys and child seeds are derived.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LENGTH]);

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}

impl Seed {
    pub const fn from_bytes(bytes: [u8; SEED_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Copies a seed out of `bytes`, which must be exactly [`SEED_LENGTH`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let arr: [u8; SEED_LENGTH] = bytes
            .try_into()
            .map_err(|_| ValidationError::length("seed", SEED_LENGTH, bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let mut bytes = hex::decode(s.trim()).map_err(|_| ValidationError::InvalidHex {
            name: "seed",
            value: "<redacted>".to_owned(),
        })?;
        let seed = Self::from_slice(&bytes);
        bytes.zeroize();
        seed
    }

    /// Draws a fresh seed from the operating system's secure randomness source.
    pub fn generate() -> Result<Self, EntropyError> {
        let mut bytes = [0u8; SEED_LENGTH];
        getrandom::getrandom(&mut bytes).map_err(|e| EntropyError(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Stretches a memorised passphrase into a seed.
    ///
    /// PBKDF2-HMAC-SHA256 with an empty salt and 1000 rounds, matching the
    /// passphrase login of existing Skynet clients.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut bytes = [0u8; SEED_LENGTH];
        pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), b"", PASSPHRASE_ROUNDS, &mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// An Ed25519 public key.
///
/// The text form is `ed25519:<hex>`, the way portals expect it in registry
/// requests.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let arr: [u8; PUBLIC_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| ValidationError::length("public key", PUBLIC_KEY_LENGTH, bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Sia binary encoding: 16-byte algorithm specifier, then the
    /// length-prefixed key.
    pub fn sia_encoding(&self) -> Vec<u8> {
        let key = encode_prefixed_bytes(&self.0);
        [ED25519_SPECIFIER.as_slice(), key.as_slice()].concat()
    }

    /// Checks `signature` over `message`.
    ///
    /// Returns `Ok(false)` for a signature that does not verify and an error
    /// only when the key itself is not a valid curve point.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool, SignatureError> {
        let key = VerifyingKey::from_bytes(&self.0)
            .map_err(|_| SignatureError::MalformedPublicKey(self.to_string()))?;
        let signature = DalekSignature::from_bytes(&signature.0);
        Ok(key.verify(message, &signature).is_ok())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ed25519:{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_hex()).finish()
    }
}

impl FromStr for PublicKey {
    type Err = ValidationError;

    /// Accepts `ed25519:<hex>` or bare hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_part = match s.split_once(':') {
            Some(("ed25519", rest)) => rest,
            Some(_) => return Err(ValidationError::InvalidPublicKeyString(s.to_owned())),
            None => s,
        };
        let bytes = hex::decode(hex_part)
            .map_err(|_| ValidationError::InvalidPublicKeyString(s.to_owned()))?;
        Self::from_slice(&bytes)
    }
}

/// An expanded Ed25519 private key: the 32-byte seed followed by the
/// 32-byte public key.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; PRIVATE_KEY_LENGTH]);

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

impl PrivateKey {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let arr: [u8; PRIVATE_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            ValidationError::length("private key", PRIVATE_KEY_LENGTH, bytes.len())
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_LENGTH] {
        &self.0
    }

    /// The public half as stored in the key. Not checked against the seed;
    /// [`PrivateKey::sign`] does that.
    pub fn public_key(&self) -> PublicKey {
        let mut pk = [0u8; PUBLIC_KEY_LENGTH];
        pk.copy_from_slice(&self.0[32..]);
        PublicKey(pk)
    }

    fn signing_key(&self) -> Result<Ed25519SigningKey, SignatureError> {
        Ed25519SigningKey::from_keypair_bytes(&self.0)
            .map_err(|_| SignatureError::MalformedPrivateKey)
    }

    /// Signs `message`, failing if the embedded public key does not belong
    /// to the embedded seed.
    pub fn sign(&self, message: &[u8]) -> Result<Signature, SignatureError> {
        let key = self.signing_key()?;
        Ok(Signature(key.sign(message).to_bytes()))
    }
}

/// An Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        let arr: [u8; SIGNATURE_LENGTH] = bytes
            .try_into()
            .map_err(|_| ValidationError::length("signature", SIGNATURE_LENGTH, bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.to_hex()).finish()
    }
}

/// An Ed25519 keypair derived from a [`Seed`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    public_key: PublicKey,
    private_key: PrivateKey,
}

impl KeyPair {
    /// RFC 8032 key generation: the seed is expanded with SHA-512 into the
    /// signing scalar and nonce prefix.
    pub fn from_seed(seed: &Seed) -> Self {
        let signing_key = Ed25519SigningKey::from_bytes(seed.as_bytes());
        KeyPair {
            public_key: PublicKey(signing_key.verifying_key().to_bytes()),
            private_key: PrivateKey(signing_key.to_keypair_bytes()),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        let mut seed = [0u8; SEED_LENGTH];
        seed.copy_from_slice(&self.private_key.0[..SEED_LENGTH]);
        let signing_key = Ed25519SigningKey::from_bytes(&seed);
        seed.zeroize();
        Signature(signing_key.sign(message).to_bytes())
    }
}

/// Generates a fresh root seed and its keypair.
pub fn gen_key_pair_and_seed() -> Result<(Seed, KeyPair), EntropyError> {
    let seed = Seed::generate()?;
    let key_pair = gen_key_pair_from_seed(&seed);
    Ok((seed, key_pair))
}

/// Derives the keypair for `seed`. Same seed, same keys.
pub fn gen_key_pair_from_seed(seed: &Seed) -> KeyPair {
    KeyPair::from_seed(seed)
}

/// Derives the child seed of `parent` for `path`.
///
/// `HMAC-SHA512(key = parent, msg = UTF-8 path)` truncated to
/// [`SEED_LENGTH`]. Distinct paths give independent seeds and the parent is
/// not recoverable from any child.
pub fn derive_child_seed(parent: &Seed, path: &str) -> Seed {
    tracing::trace!(path, "deriving child seed");
    // HMAC zero-pads short keys to the block size, so this is the same MAC
    // as keying with the bare seed
    let mut key = Key::<HmacSha512>::default();
    key[..SEED_LENGTH].copy_from_slice(parent.as_bytes());
    let mut mac = <HmacSha512 as Mac>::new(&key);
    mac.update(path.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut child = [0u8; SEED_LENGTH];
    child.copy_from_slice(&digest[..SEED_LENGTH]);
    Seed(child)
}
