use std::path::{Path, PathBuf};

use anyhow::Result;
use sky_core::{ParseSkylinkOptions, Seed};

use crate::{Commands, TweakCmd, config::SkyConfig};

mod keys;
mod registry;
mod skylink;
mod tweak;
mod util;

pub use keys::{run_child_seed, run_keygen, run_pubkey};
pub use registry::{run_entry_link, run_sign_entry};
pub use skylink::run_parse;
pub use tweak::{run_discoverable, run_encrypted};

pub fn run_command(config_file: PathBuf, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Config { cmd } => cmd.run(config_file),
        Commands::Keygen => run_keygen(),
        Commands::Parse {
            input,
            from_subdomain,
            only_root,
        } => {
            let config = SkyConfig::load_or_default(&config_file)?;
            // flags can only switch options on
            let options = ParseSkylinkOptions {
                from_subdomain: from_subdomain || config.parse.from_subdomain,
                only_root: only_root || config.parse.only_root,
            };
            run_parse(&input, &options)
        }
        Commands::Pubkey { child } => {
            run_pubkey(&configured_seed(&config_file)?, child.as_deref())
        }
        Commands::ChildSeed { path } => run_child_seed(&configured_seed(&config_file)?, &path),
        Commands::EntryLink {
            data_key,
            hashed,
            child,
        } => run_entry_link(
            &configured_seed(&config_file)?,
            child.as_deref(),
            &data_key,
            hashed,
        ),
        Commands::SignEntry {
            data_key,
            hashed,
            revision,
            data_hex,
            data_text,
            child,
        } => run_sign_entry(
            &configured_seed(&config_file)?,
            child.as_deref(),
            &data_key,
            hashed,
            revision,
            data_hex.as_deref(),
            data_text.as_deref(),
        ),
        Commands::Tweak {
            cmd: TweakCmd::Discoverable { path },
        } => run_discoverable(&path),
        Commands::Tweak {
            cmd: TweakCmd::Encrypted { path, show_key },
        } => run_encrypted(&configured_seed(&config_file)?, &path, show_key),
    }
}

/// The seed named by the `[identity]` section of `config_file`.
fn configured_seed(config_file: &Path) -> Result<Seed> {
    SkyConfig::load(config_file)?.load_seed(config_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_commands_need_identity() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.toml");

        let err = configured_seed(&config_file).unwrap_err();
        assert!(format!("{err:#}").contains("could not read config file"));

        std::fs::write(&config_file, "[parse]\nonly_root = true\n").unwrap();
        let err = configured_seed(&config_file).unwrap_err();
        assert!(format!("{err:#}").contains("no [identity] section"));
    }
}
