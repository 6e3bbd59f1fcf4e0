use sha2::{Digest, Sha512};

use super::{ENCRYPTION_PATH_SEED_LENGTH, PathSeed, sanitize_path};
use crate::{Hash, Seed, error::ValidationError};

const SALT_ROOT_PATH_SEED: &[u8] = b"root path seed";
const SALT_ENCRYPTED_CHILD: &[u8] = b"encrypted filesystem child";
const SALT_ENCRYPTED_TWEAK: &[u8] = b"encrypted filesystem tweak";
const SALT_ENCRYPTION: &[u8] = b"encryption";

/// `sha512(sha512(salt) || parts...)`, truncated to 32 bytes.
fn salted_hash(salt: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    hasher.update(Sha512::digest(salt));
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();

    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

/// The path seed of `/` for the user owning `seed`.
pub fn derive_root_path_seed(seed: &Seed) -> PathSeed {
    let seed_hash = Sha512::digest(seed.as_bytes());
    PathSeed::from_bytes(salted_hash(SALT_ROOT_PATH_SEED, &[seed_hash.as_slice()]))
}

/// Walks from `path_seed` down `sub_path`, one segment at a time.
///
/// Every segment but the last is a directory; `is_directory` says what the
/// last one is, so a file and a directory at the same path get different
/// seeds.
pub fn derive_encrypted_file_seed(
    path_seed: &PathSeed,
    sub_path: &str,
    is_directory: bool,
) -> Result<PathSeed, ValidationError> {
    let segments = sanitize_path(sub_path)?;
    let last = segments.len() - 1;

    let mut current = path_seed.clone();
    for (i, segment) in segments.iter().enumerate() {
        let directory = i < last || is_directory;
        let mut hasher = Sha512::new();
        hasher.update(current.as_bytes());
        hasher.update([u8::from(directory)]);
        hasher.update(segment.as_bytes());
        let child_digest = hasher.finalize();

        current = PathSeed::from_bytes(salted_hash(SALT_ENCRYPTED_CHILD, &[child_digest.as_slice()]));
    }
    Ok(current)
}

/// The path seed of `path` for the user owning `seed`.
pub fn derive_encrypted_path_seed(
    seed: &Seed,
    path: &str,
    is_directory: bool,
) -> Result<PathSeed, ValidationError> {
    let root = derive_root_path_seed(seed);
    derive_encrypted_file_seed(&root, path, is_directory)
}

/// Key material for encrypting the contents stored under `path_seed`.
pub fn derive_encrypted_file_key_entropy(path_seed: &PathSeed) -> [u8; ENCRYPTION_PATH_SEED_LENGTH] {
    let seed_hash = Sha512::digest(path_seed.as_bytes());
    salted_hash(SALT_ENCRYPTION, &[seed_hash.as_slice()])
}

/// Data key of the registry entry holding the file at `path_seed`.
pub fn derive_encrypted_file_tweak(path_seed: &PathSeed) -> Hash {
    let seed_hash = Sha512::digest(path_seed.as_bytes());
    Hash::from_bytes(salted_hash(SALT_ENCRYPTED_TWEAK, &[seed_hash.as_slice()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_bytes() -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        bytes
    }

    fn counting_path_seed() -> PathSeed {
        PathSeed::from_bytes(counting_bytes())
    }

    #[test]
    fn test_key_entropy_known_value() {
        assert_eq!(
            hex::encode(derive_encrypted_file_key_entropy(&counting_path_seed())),
            "715a98475f5dc0bdebbd854e2e1c9adb9efc1608c707282952cfb6b91a79b8ff"
        );
    }

    #[test]
    fn test_encrypted_tweak_known_value() {
        assert_eq!(
            derive_encrypted_file_tweak(&counting_path_seed()).to_hex(),
            "8ff7a0690ef5ed05909f3aa7cdd77f29f1a810985bd88d79afa94d82cf1a2232"
        );
    }

    #[test]
    fn test_root_path_seed_known_value() {
        let root = derive_root_path_seed(&Seed::from_bytes(counting_bytes()));
        assert_eq!(
            root.to_hex(),
            "91fc3b62bae05c6b61172568c058443b4588210cdde107e84f8a04ed1a91d94d"
        );
    }

    #[test]
    fn test_file_seed_known_values() {
        let seed = counting_path_seed();
        assert_eq!(
            derive_encrypted_file_seed(&seed, "app.hns/data/file.json", false)
                .unwrap()
                .to_hex(),
            "4672ecc7c412203b0959cd7aa4871ac4f7d850ec51359425368537de41a7e419"
        );
        assert_eq!(
            derive_encrypted_file_seed(&seed, "app.hns/data", true)
                .unwrap()
                .to_hex(),
            "5a2021f8568791c30637c8954b4431b68e5dcbdb1d5c5b133bc73196986e2dff"
        );
    }

    #[test]
    fn test_file_seed_chains_through_directories() {
        let seed = counting_path_seed();
        let dir = derive_encrypted_file_seed(&seed, "app.hns/data", true).unwrap();
        let via_dir = derive_encrypted_file_seed(&dir, "file.json", false).unwrap();
        let direct = derive_encrypted_file_seed(&seed, "app.hns/data/file.json", false).unwrap();
        assert_eq!(via_dir, direct);
    }

    #[test]
    fn test_file_and_directory_seeds_differ() {
        let seed = counting_path_seed();
        assert_ne!(
            derive_encrypted_file_seed(&seed, "a/b", false).unwrap(),
            derive_encrypted_file_seed(&seed, "a/b", true).unwrap()
        );
    }

    #[test]
    fn test_file_seed_ignores_redundant_slashes() {
        let seed = counting_path_seed();
        assert_eq!(
            derive_encrypted_file_seed(&seed, "/app.hns//data/file.json/", false).unwrap(),
            derive_encrypted_file_seed(&seed, "app.hns/data/file.json", false).unwrap()
        );
        assert!(derive_encrypted_file_seed(&seed, "/", false).is_err());
    }

    #[test]
    fn test_encrypted_path_seed_starts_at_root() {
        let seed = Seed::from_bytes(counting_bytes());
        let root = derive_root_path_seed(&seed);
        assert_eq!(
            derive_encrypted_path_seed(&seed, "a/b.txt", false).unwrap(),
            derive_encrypted_file_seed(&root, "a/b.txt", false).unwrap()
        );
        assert_eq!(
            derive_encrypted_path_seed(&seed, "app.hns/data/file.json", false)
                .unwrap()
                .to_hex(),
            "65362e722aa124e733acf7b794727f3e502edbfdedce6d6d339525ada7fb07a0"
        );
    }

    #[test]
    fn test_tweak_and_key_are_separated() {
        let seed = counting_path_seed();
        assert_ne!(
            derive_encrypted_file_key_entropy(&seed),
            *derive_encrypted_file_tweak(&seed).as_bytes()
        );
    }
}
