use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Subcommand;
use sky_core::Seed;
use toml_edit::{DocumentMut, Item, Table};
use tracing::info;

use crate::config::resolve_path;

#[derive(Subcommand)]
pub enum CmdConfig {
    /// Creates the config file if it doesn't exist and generates a root seed
    Init,
}

impl CmdConfig {
    pub fn run(self, config_file: PathBuf) -> anyhow::Result<()> {
        let mut doc = if config_file.exists() {
            fs::read_to_string(&config_file)?
        } else {
            if let Some(dir) = config_file.parent() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("could not create config directory {dir:?}"))?;
            }
            "".to_owned()
        }
        .parse::<DocumentMut>()
        .context("could not parse config file")?;

        match self {
            Self::Init => init(&mut doc, &config_file)?,
        }

        info!("writing to config file {config_file:?}");
        write_atomic(&config_file, doc.to_string().as_bytes(), false)
    }
}

fn init(doc: &mut DocumentMut, config_file: &Path) -> anyhow::Result<()> {
    let identity = doc
        .entry("identity")
        .or_insert(Item::Table(Table::new()))
        .as_table_mut()
        .context("`identity` in config file is not a table")?;

    // an existing seed is never replaced
    let seed_file = match identity.get("seed_file").and_then(Item::as_str) {
        Some(existing) => resolve_path(config_file, existing),
        None => {
            let seed_file = config_file.with_extension("seed");
            let name = seed_file
                .file_name()
                .and_then(|name| name.to_str())
                .context("seed file name is not valid UTF-8")?;
            identity.insert("seed_file", name.into());
            seed_file
        }
    };

    let parse = doc
        .entry("parse")
        .or_insert(Item::Table(Table::new()))
        .as_table_mut()
        .context("`parse` in config file is not a table")?;
    if !parse.contains_key("from_subdomain") {
        parse.insert("from_subdomain", false.into());
    }
    if !parse.contains_key("only_root") {
        parse.insert("only_root", false.into());
    }

    if !seed_file.exists() {
        info!("generating secure random root seed");
        let seed = Seed::generate()?;
        write_atomic(&seed_file, seed.to_hex().as_bytes(), true)?;
    }
    Ok(())
}

/// Writes `contents` through a temporary file and a rename. A `private` file
/// is readable by its owner only.
fn write_atomic(path: &Path, contents: &[u8], private: bool) -> anyhow::Result<()> {
    let tmp_path = path.with_extension("tmp");
    // an existing file would keep its old mode
    if tmp_path.exists() {
        fs::remove_file(&tmp_path).with_context(|| format!("could not remove {tmp_path:?}"))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    if private {
        owner_only(&mut options);
    }
    let mut tmp = options
        .open(&tmp_path)
        .with_context(|| format!("could not open {tmp_path:?}"))?;
    tmp.write_all(contents)?;
    tmp.sync_all()?;
    fs::rename(&tmp_path, path).with_context(|| format!("could not write {path:?}"))?;
    Ok(())
}

#[cfg(unix)]
fn owner_only(options: &mut fs::OpenOptions) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
}

#[cfg(not(unix))]
fn owner_only(_options: &mut fs::OpenOptions) {}
