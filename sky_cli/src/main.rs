use crate::init_config::CmdConfig;
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use clap_verbosity_flag::InfoLevel;
use directories::ProjectDirs;
use std::path::PathBuf;

mod cmd;
mod config;
mod init_config;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// config file to use instead of the default one
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity<InfoLevel>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Modify the sky config
    Config {
        #[command(subcommand)]
        cmd: CmdConfig,
    },
    /// Generate a fresh random seed and print it with its public key
    Keygen,
    /// Print the public key of the configured seed
    Pubkey {
        /// Use the child seed at this derivation path
        #[arg(long, value_name = "PATH")]
        child: Option<String>,
    },
    /// Print the child seed derived from the configured seed
    ChildSeed {
        /// Derivation path, usually an app domain
        path: String,
    },
    /// Extract the skylink from a skylink, sia: URI or portal URL
    Parse {
        input: String,
        /// Read the skylink from the first subdomain label (base32)
        #[arg(long, action = ArgAction::SetTrue)]
        from_subdomain: bool,
        /// Reject inputs that carry a path or query after the skylink
        #[arg(long, action = ArgAction::SetTrue)]
        only_root: bool,
    },
    /// Print the V2 skylink resolving to a registry entry
    EntryLink {
        /// Data key name, or a 64-character hex hash with --hashed
        data_key: String,
        /// Treat the data key as an already hashed hex value
        #[arg(long, action = ArgAction::SetTrue)]
        hashed: bool,
        /// Use the child seed at this derivation path
        #[arg(long, value_name = "PATH")]
        child: Option<String>,
    },
    /// Sign a registry entry and print the JSON write request
    SignEntry {
        /// Data key name, or a 64-character hex hash with --hashed
        data_key: String,
        /// Treat the data key as an already hashed hex value
        #[arg(long, action = ArgAction::SetTrue)]
        hashed: bool,
        #[arg(short, long)]
        revision: u64,
        /// Entry data as hex
        #[arg(
            long,
            value_name = "HEX",
            conflicts_with = "data_text",
            required_unless_present = "data_text"
        )]
        data_hex: Option<String>,
        /// Entry data as UTF-8 text
        #[arg(long, value_name = "TEXT")]
        data_text: Option<String>,
        /// Use the child seed at this derivation path
        #[arg(long, value_name = "PATH")]
        child: Option<String>,
    },
    /// Derive registry data keys for file paths
    Tweak {
        #[command(subcommand)]
        cmd: TweakCmd,
    },
}

#[derive(Subcommand)]
enum TweakCmd {
    /// Data key of a publicly discoverable file (no seed needed)
    Discoverable { path: String },
    /// Data key of an encrypted file under the configured seed
    Encrypted {
        path: String,
        /// Also print the file encryption key
        #[arg(long, action = ArgAction::SetTrue)]
        show_key: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    // Config lives under ~/.config/sky/config.toml unless --config is given.
    let config_file = match cli.config {
        Some(path) => path,
        None => ProjectDirs::from("", "", "sky")
            .context("failed to determine config directory path")?
            .config_dir()
            .join("config.toml"),
    };

    cmd::run_command(config_file, cli.cmd)
}
