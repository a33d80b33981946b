//! Command-line interface parsing and handling
//!
//! This module parses arguments, sets up logging and the panic hook, loads
//! configuration, and dispatches to the interactive chat or a one-shot command.

pub mod say;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cli::say::run_say;
use crate::core::config::data::path_display;
use crate::core::config::{Config, ConfigKey};
use crate::ui::chat_loop::lifecycle::restore_terminal_after_panic;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::{init_tracing, install_diagnostic_sink, LogSink};

#[derive(Parser, Debug)]
#[command(name = "agentchat")]
#[command(version, about = "A terminal chat client for a multi-agent assistant service")]
#[command(
    long_about = "agentchat is a full-screen terminal chat interface. Each message you send is \
POSTed as JSON to the configured endpoint and the reply is appended to the transcript.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a newline\n\
  PgUp/PgDn         Scroll through the transcript\n\
  Ctrl+End          Jump back to the newest message\n\
  Ctrl+C            Quit the application\n\n\
Environment Variables:\n\
  AGENTCHAT_LOG     Tracing filter directive (default: agentchat=info)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Endpoint URL to POST messages to, for this session only
    #[arg(short = 'e', long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds for this session (0 waits forever)
    #[arg(short = 't', long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write diagnostics to the specified file (chat defaults to agentchat.log
    /// in the local data directory)
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message without the TUI and print the reply
    Say {
        /// Message to send (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        words: Vec<String>,
    },
    /// Print the effective configuration
    Config,
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    install_diagnostic_sink(restore_terminal_after_panic);

    let command = take_command(&mut args);
    let sink = match command {
        Commands::Chat => LogSink::for_interactive(args.log.as_deref()),
        _ => LogSink::for_batch(args.log.as_deref()),
    };
    init_tracing(sink)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main(command, args))
}

fn take_command(args: &mut Args) -> Commands {
    args.command.take().unwrap_or(Commands::Chat)
}

async fn async_main(command: Commands, args: Args) -> Result<(), Box<dyn Error>> {
    let config_path = resolve_config_path(args.config.as_deref())?;
    debug!(path = %path_display(&config_path), "Using config file");

    match command {
        Commands::Chat => {
            let config = session_config(&config_path, &args)?;
            run_chat(config).await
        }
        Commands::Say { words } => {
            let config = session_config(&config_path, &args)?;
            run_say(words, config).await
        }
        Commands::Config => {
            let config = session_config(&config_path, &args)?;
            println!("Config file: {}", path_display(&config_path));
            config.print_all();
            Ok(())
        }
        Commands::Set { key, value } => {
            let value = value.join(" ");
            let key: ConfigKey = key.parse()?;
            let mut config = Config::load_from_path(&config_path)?;
            config.set_key(key, &value)?;
            config.save_to_path(&config_path)?;
            println!("✅ Set {} to: {value}", key.as_str());
            Ok(())
        }
        Commands::Unset { key } => {
            let key: ConfigKey = key.parse()?;
            let mut config = Config::load_from_path(&config_path)?;
            config.unset_key(key);
            config.save_to_path(&config_path)?;
            println!("✅ Unset {}", key.as_str());
            Ok(())
        }
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, Box<dyn Error>> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Config::get_config_path()?),
    }
}

/// Persisted config with this invocation's flags layered on top.
fn session_config(config_path: &Path, args: &Args) -> Result<Config, Box<dyn Error>> {
    let config = Config::load_from_path(config_path)?;
    Ok(config.with_overrides(args.endpoint.clone(), args.timeout))
}

#[cfg(test)]
mod tests;
