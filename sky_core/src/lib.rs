//! Core Skynet client types and derivations.
//!
//! This crate is the addressing-and-cryptography layer of a Skynet client.
//! Everything in it is a pure function of its inputs; network transport,
//! portal selection and the identity handshake live elsewhere and talk to
//! this crate through plain values and the [`RegistryApi`] trait.
//!
//! ## Protocol types (wire-stable)
//!
//! - Hashes (`hash::Hash`, BLAKE2b-256) and the Sia-style encodings they are
//!   computed over (`encoding`)
//! - Skylinks (`skylink::Skylink`), their 34-byte raw form and their base64 /
//!   base32 text forms
//! - Registry entries (`registry::RegistryEntry`, `registry::SignedRegistryEntry`)
//!   and the canonical message their signatures cover
//!
//! Changes to these are protocol changes: other clients and portals must
//! compute the same bytes.
//!
//! ## Derivations
//!
//! - Seeds and Ed25519 keypairs (`keys`)
//! - Path-keyed encryption material and lookup tweaks (`mysky`)
//!
//! Each derivation is pinned by known-answer tests next to its code.

pub mod encoding;
pub mod error;
pub mod hash;
pub mod keys;
pub mod mysky;
pub mod registry;
pub mod skylink;

// --- Core Public Surface ---

pub use error::{EntropyError, Error, RevisionError, SignatureError, ValidationError};
pub use hash::{HASH_LENGTH, Hash, hash_all, hash_data_key};

pub use keys::{
    KeyPair, PrivateKey, PublicKey, SEED_LENGTH, Seed, Signature, derive_child_seed,
    gen_key_pair_and_seed, gen_key_pair_from_seed,
};

pub use skylink::{
    ParseError, ParseSkylinkOptions, ParsedSkylink, Skylink, SkylinkUrlOptions, SkylinkV1,
    SkylinkV2, convert_skylink_to_base32, convert_skylink_to_base64, get_skylink_url_for_portal,
    is_skylink_v1, is_skylink_v2, parse_skylink,
};

pub use registry::{
    DataKey, MAX_ENTRY_DATA_LENGTH, MAX_REVISION, RegistryApi, RegistryEntry,
    REGISTRY_ENDPOINT, RegistryEntryRequest, SignedRegistryEntry, check_revision,
    get_entry_link, get_entry_url_for_portal, next_revision, sign_entry, verify_entry,
};

pub use mysky::{
    ENCRYPTION_PATH_SEED_LENGTH, EncryptionError, EncryptionMaterial, PathSeed,
    decrypt_file_bytes, derive_discoverable_file_tweak, derive_encrypted_file_key_entropy,
    derive_encrypted_file_seed, derive_encrypted_file_tweak, derive_encrypted_path_seed,
    derive_root_path_seed, encrypt_file_bytes,
};
