use anyhow::Result;
use sky_core::{EncryptionMaterial, Seed, derive_discoverable_file_tweak};

pub fn run_discoverable(path: &str) -> Result<()> {
    println!("{}", derive_discoverable_file_tweak(path)?);
    Ok(())
}

pub fn run_encrypted(seed: &Seed, path: &str, show_key: bool) -> Result<()> {
    let material = EncryptionMaterial::derive(seed, path)?;
    println!("{}", material.encrypted_tweak);
    if show_key {
        println!("{}", hex::encode(material.key_entropy));
    }
    Ok(())
}
