use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sky_core::{ParseSkylinkOptions, SEED_LENGTH, Seed};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkyConfig {
    #[serde(default)]
    pub identity: Option<ConfigIdentity>,
    #[serde(default)]
    pub parse: ParseSkylinkOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigIdentity {
    pub seed_file: String,
}

impl SkyConfig {
    pub fn load(config_file: &Path) -> Result<Self> {
        let toml_content = std::fs::read_to_string(config_file)
            .with_context(|| format!("could not read config file {config_file:?}"))?;
        let config: SkyConfig = toml::from_str(&toml_content)
            .with_context(|| format!("could not parse config file {config_file:?}"))?;
        debug!(?config, "loaded config");
        Ok(config)
    }

    /// Like [`SkyConfig::load`], but a missing file means defaults.
    pub fn load_or_default(config_file: &Path) -> Result<Self> {
        if config_file.exists() {
            Self::load(config_file)
        } else {
            debug!("no config file at {config_file:?}, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads the root seed named by `[identity] seed_file`.
    pub fn load_seed(&self, config_file: &Path) -> Result<Seed> {
        let identity = self
            .identity
            .as_ref()
            .context("no [identity] section in config, run `sky config init` first")?;

        let resolved = resolve_path(config_file, &identity.seed_file);
        let bytes = std::fs::read(&resolved)
            .with_context(|| format!("could not read seed file {resolved:?}"))?;
        parse_seed_file(&bytes).with_context(|| format!("invalid seed file {resolved:?}"))
    }
}

/// Resolves `path` against the directory holding `config_file`.
pub fn resolve_path(config_file: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    match config_file.parent() {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

/// Seed files hold the seed as hex text; raw 32-byte files are accepted too.
pub fn parse_seed_file(bytes: &[u8]) -> Result<Seed> {
    if let Ok(text) = std::str::from_utf8(bytes)
        && let Ok(seed) = Seed::from_hex(text.trim())
    {
        return Ok(seed);
    }
    if bytes.len() == SEED_LENGTH {
        return Ok(Seed::from_slice(bytes)?);
    }
    bail!("expected {SEED_LENGTH} bytes of hex or raw seed data")
}
