//! Registry backends for Skynet entries.
//!
//! - [`MemoryRegistry`]: an in-process [`sky_core::RegistryApi`] that
//!   enforces the same acceptance rules as a portal. Useful in tests and
//!   as a local cache.

use std::collections::HashMap;

use anyhow::Result;
use sky_core::{Hash, PublicKey, RegistryApi, SignedRegistryEntry, check_revision};
use tokio::sync::RwLock;
use tracing::{debug, warn};

// ============================================================================
// In-Memory Registry
// ============================================================================

/// In-memory registry implementation.
///
/// Holds one entry per `(public key, data key hash)`. A write is accepted
/// only if its signature verifies against the public key it carries and its
/// revision is newer than the stored one; rejected writes return the typed
/// [`sky_core::SignatureError`] or [`sky_core::RevisionError`] inside the
/// `anyhow::Error`.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: RwLock<HashMap<(PublicKey, Hash), SignedRegistryEntry>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with a stored entry.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Revision currently stored under the key, if any.
    pub async fn revision(&self, public_key: &PublicKey, data_key: &Hash) -> Option<u64> {
        self.entries
            .read()
            .await
            .get(&(*public_key, *data_key))
            .map(|signed| signed.entry().revision())
    }
}

#[async_trait::async_trait]
impl RegistryApi for MemoryRegistry {
    async fn get(
        &self,
        public_key: &PublicKey,
        data_key: &Hash,
    ) -> Result<Option<SignedRegistryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(*public_key, *data_key)).cloned())
    }

    async fn set(&self, entry: SignedRegistryEntry) -> Result<()> {
        let public_key = *entry.public_key();
        let data_key = entry.entry().data_key().hash();
        let revision = entry.entry().revision();

        let entry = entry.verified().inspect_err(|err| {
            warn!(%public_key, data_key = %data_key.fmt_short(), "registry set rejected: {err}");
        })?;

        // held across the check and the insert so concurrent writers are ordered
        let mut entries = self.entries.write().await;
        let key = (public_key, data_key);
        let previous = entries.get(&key).map(|signed| signed.entry().revision());
        if let Err(err) = check_revision(previous, revision) {
            warn!(%public_key, data_key = %data_key.fmt_short(), "registry set rejected: {err}");
            return Err(err.into());
        }

        debug!(%public_key, data_key = %data_key.fmt_short(), revision, "registry entry stored");
        entries.insert(key, entry);
        Ok(())
    }
}
