//! `config` command - config file management

use crate::config::ConfigFile;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show config file path
    Path,

    /// Show current config
    Show,

    /// Store a provider credential (alchemy, infura, ankr, quicknode)
    SetKey {
        /// Provider name
        provider: String,
        /// API key (full endpoint URL for quicknode)
        key: String,
    },
}

pub async fn handle(action: &ConfigCommands) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Path => {
            println!("{}", ConfigFile::default_path().display());
        }

        ConfigCommands::Show => {
            let path = ConfigFile::default_path();
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                println!("# {}\n", path.display());
                println!("{}", content);
            } else {
                println!("No config file found at: {}", path.display());
                println!("\nCreate one with:");
                println!("  rpc-sentinel config set-key alchemy YOUR_KEY");
            }
        }

        ConfigCommands::SetKey { provider, key } => {
            let mut config = ConfigFile::load_default()?.unwrap_or_default();
            config.set_key(provider, key.clone())?;
            println!("{} credential saved to config file.", provider);
        }
    }

    Ok(())
}
