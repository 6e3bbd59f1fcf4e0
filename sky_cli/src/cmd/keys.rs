use anyhow::Result;
use sky_core::{Seed, derive_child_seed, gen_key_pair_and_seed};
use tracing::info;

use super::util::key_pair;

pub fn run_keygen() -> Result<()> {
    let (seed, key_pair) = gen_key_pair_and_seed()?;
    info!("generated a new root seed; keep it secret, it cannot be recovered");
    println!("seed:       {}", seed.to_hex());
    println!("public key: {}", key_pair.public_key());
    Ok(())
}

pub fn run_pubkey(seed: &Seed, child: Option<&str>) -> Result<()> {
    println!("{}", key_pair(seed, child).public_key());
    Ok(())
}

pub fn run_child_seed(seed: &Seed, path: &str) -> Result<()> {
    println!("{}", derive_child_seed(seed, path).to_hex());
    Ok(())
}
