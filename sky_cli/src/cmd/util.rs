use anyhow::{Context, Result, bail};
use sky_core::{DataKey, KeyPair, Seed, derive_child_seed, gen_key_pair_from_seed};

/// Keypair of the root seed, or of its child seed at `child`.
pub fn key_pair(seed: &Seed, child: Option<&str>) -> KeyPair {
    match child {
        Some(path) => gen_key_pair_from_seed(&derive_child_seed(seed, path)),
        None => gen_key_pair_from_seed(seed),
    }
}

pub fn parse_data_key(data_key: &str, hashed: bool) -> Result<DataKey> {
    if hashed {
        DataKey::from_hex(data_key).context("hashed data key must be 64 hex characters")
    } else {
        Ok(DataKey::from(data_key))
    }
}

pub fn entry_data(data_hex: Option<&str>, data_text: Option<&str>) -> Result<Vec<u8>> {
    match (data_hex, data_text) {
        (Some(hex_data), None) => hex::decode(hex_data.trim()).context("failed to decode hex data"),
        (None, Some(text)) => Ok(text.as_bytes().to_vec()),
        _ => bail!("exactly one of --data-hex or --data-text is required"),
    }
}
