use anyhow::{Context, Result};
use sky_core::{
    DataKey, RegistryEntry, RegistryEntryRequest, Seed, SignedRegistryEntry, get_entry_link,
};
use tracing::debug;

use super::util::{entry_data, key_pair, parse_data_key};

pub fn run_entry_link(
    seed: &Seed,
    child: Option<&str>,
    data_key: &str,
    hashed: bool,
) -> Result<()> {
    let key_pair = key_pair(seed, child);
    let data_key = parse_data_key(data_key, hashed)?;
    println!("{}", get_entry_link(key_pair.public_key(), &data_key));
    Ok(())
}

pub fn run_sign_entry(
    seed: &Seed,
    child: Option<&str>,
    data_key: &str,
    hashed: bool,
    revision: u64,
    data_hex: Option<&str>,
    data_text: Option<&str>,
) -> Result<()> {
    let request = sign_request(
        seed,
        child,
        parse_data_key(data_key, hashed)?,
        revision,
        entry_data(data_hex, data_text)?,
    )?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

fn sign_request(
    seed: &Seed,
    child: Option<&str>,
    data_key: DataKey,
    revision: u64,
    data: Vec<u8>,
) -> Result<RegistryEntryRequest> {
    let key_pair = key_pair(seed, child);
    let entry = RegistryEntry::new(data_key, data, revision).context("invalid registry entry")?;
    let signed = SignedRegistryEntry::sign(entry, &key_pair);
    debug!(
        public_key = %key_pair.public_key(),
        data_key = %signed.entry().data_key().hash().fmt_short(),
        revision,
        "signed registry entry"
    );
    Ok(RegistryEntryRequest::from(&signed))
}
