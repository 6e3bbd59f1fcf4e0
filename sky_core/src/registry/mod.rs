//! Registry entries: signing, verification and revision rules.
//!
//! The registry is a mutable key-value store keyed by
//! `(public key, data key hash)`. Each key holds at most one
//! [`SignedRegistryEntry`] and a new write must carry a strictly greater
//! revision than the stored one. This module computes and checks the bytes;
//! storage and transport sit behind [`RegistryApi`].

mod entry;
mod revision;
mod wire;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use url::Url;

pub use entry::{RegistryEntry, SignedRegistryEntry, sign_entry, verify_entry};
pub use revision::{check_revision, next_revision};
pub use wire::{RegistryEntryRequest, WirePublicKey};

use crate::{
    Hash, PublicKey,
    error::ValidationError,
    hash::hash_data_key,
    skylink::{ParseError, Skylink, SkylinkV2, parse_portal_url},
};

/// Maximum number of data bytes a registry entry may carry.
pub const MAX_ENTRY_DATA_LENGTH: usize = 70;

/// Reserved revision. Portals use it to mark a key as never written, so no
/// entry may carry it.
pub const MAX_REVISION: u64 = u64::MAX;

/// Portal route serving registry entries.
pub const REGISTRY_ENDPOINT: &str = "/skynet/registry";

/// Key of an entry under a public key.
///
/// Applications usually name entries (`"profile.json"`); the registry only
/// sees the hash. Derived tweaks are already hashes and are used as is.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum DataKey {
    Name(String),
    Hashed(Hash),
}

impl DataKey {
    /// Parses a pre-hashed key from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        Hash::from_hex(s).map(DataKey::Hashed)
    }

    /// The 32-byte key the registry stores the entry under.
    pub fn hash(&self) -> Hash {
        match self {
            DataKey::Name(name) => hash_data_key(name),
            DataKey::Hashed(hash) => *hash,
        }
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKey::Name(name) => f.debug_tuple("Name").field(name).finish(),
            DataKey::Hashed(hash) => f.debug_tuple("Hashed").field(&hash.fmt_short()).finish(),
        }
    }
}

impl From<&str> for DataKey {
    fn from(value: &str) -> Self {
        DataKey::Name(value.to_owned())
    }
}

impl From<String> for DataKey {
    fn from(value: String) -> Self {
        DataKey::Name(value)
    }
}

impl From<Hash> for DataKey {
    fn from(value: Hash) -> Self {
        DataKey::Hashed(value)
    }
}

/// The V2 skylink that resolves through the entry `(public_key, data_key)`.
pub fn get_entry_link(public_key: &PublicKey, data_key: &DataKey) -> Skylink {
    Skylink::V2(SkylinkV2::new(public_key, &data_key.hash()))
}

/// The portal URL that reads the entry `(public_key, data_key)`, e.g.
/// `https://siasky.net/skynet/registry?publickey=ed25519%3A...&datakey=...`.
///
/// Any path or query on `portal_url` is replaced.
pub fn get_entry_url_for_portal(
    portal_url: &str,
    public_key: &PublicKey,
    data_key: &DataKey,
) -> Result<Url, ParseError> {
    let mut url = parse_portal_url(portal_url)?;
    url.set_path(REGISTRY_ENDPOINT);
    url.set_fragment(None);
    url.query_pairs_mut()
        .clear()
        .append_pair("publickey", &public_key.to_string())
        .append_pair("datakey", &data_key.hash().to_hex());
    Ok(url)
}

/// Storage and transport for registry entries.
///
/// # Semantics
///
/// Implementations must reject a `set` whose signature does not verify or
/// whose revision does not pass [`check_revision`] against the stored entry.
/// Rejections are returned as `anyhow` errors wrapping the typed
/// [`crate::SignatureError`] or [`crate::RevisionError`], so callers can
/// downcast them.
#[async_trait]
pub trait RegistryApi: fmt::Debug + Send + Sync {
    /// Returns the current entry stored under `(public_key, data_key)`, if any.
    async fn get(
        &self,
        public_key: &PublicKey,
        data_key: &Hash,
    ) -> Result<Option<SignedRegistryEntry>>;

    /// Stores `entry` if it is validly signed and newer than the current one.
    async fn set(&self, entry: SignedRegistryEntry) -> Result<()>;
}

#[async_trait]
impl<T: RegistryApi + ?Sized + Send + Sync> RegistryApi for std::sync::Arc<T> {
    async fn get(
        &self,
        public_key: &PublicKey,
        data_key: &Hash,
    ) -> Result<Option<SignedRegistryEntry>> {
        (**self).get(public_key, data_key).await
    }

    async fn set(&self, entry: SignedRegistryEntry) -> Result<()> {
        (**self).set(entry).await
    }
}

#[async_trait]
impl<T: RegistryApi + ?Sized + Send + Sync> RegistryApi for Box<T> {
    async fn get(
        &self,
        public_key: &PublicKey,
        data_key: &Hash,
    ) -> Result<Option<SignedRegistryEntry>> {
        (**self).get(public_key, data_key).await
    }

    async fn set(&self, entry: SignedRegistryEntry) -> Result<()> {
        (**self).set(entry).await
    }
}
