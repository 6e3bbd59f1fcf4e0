use super::sanitize_path;
use crate::{Hash, error::ValidationError, hash::hash_all};

const DISCOVERABLE_TWEAK_VERSION: u8 = 1;

/// Data key of the publicly discoverable file at `path`.
///
/// `hash(version || hash(segment_1) || ... || hash(segment_n))`. No secret
/// goes in, so anyone who knows the owner and the path can find the entry.
pub fn derive_discoverable_file_tweak(path: &str) -> Result<Hash, ValidationError> {
    let segment_hashes: Vec<Hash> = sanitize_path(path)?
        .into_iter()
        .map(Hash::new)
        .collect();

    let mut parts: Vec<&[u8]> = Vec::with_capacity(segment_hashes.len() + 1);
    parts.push(&[DISCOVERABLE_TWEAK_VERSION]);
    parts.extend(segment_hashes.iter().map(|hash| hash.as_bytes().as_slice()));
    Ok(hash_all(&parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discoverable_tweak_known_value() {
        assert_eq!(
            derive_discoverable_file_tweak("app.hns/index.json")
                .unwrap()
                .to_hex(),
            "f089002a7812c69533d62155667a31f125ad3f814c13d899bac280bc336b4304"
        );
    }

    #[test]
    fn test_discoverable_tweak_normalizes_path() {
        assert_eq!(
            derive_discoverable_file_tweak("/app.hns//index.json/").unwrap(),
            derive_discoverable_file_tweak("app.hns/index.json").unwrap()
        );
    }

    #[test]
    fn test_discoverable_tweak_segment_boundaries_matter() {
        // segments are hashed individually, so joining them differently
        // gives a different tweak
        assert_ne!(
            derive_discoverable_file_tweak("ab/c").unwrap(),
            derive_discoverable_file_tweak("a/bc").unwrap()
        );
    }

    #[test]
    fn test_discoverable_tweak_rejects_empty_path() {
        assert_eq!(
            derive_discoverable_file_tweak(""),
            Err(ValidationError::InvalidPath(String::new()))
        );
    }
}
