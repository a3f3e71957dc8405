//! Command-line interface.
//!
//! Running `botdeck` with no subcommand opens the interactive panel.
//! Subcommands cover the same operations for scripts and quick checks.

mod commands;

use anyhow::{Context, Result};
use botdeck_core::config::Config;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "botdeck")]
#[command(about = "Terminal control panel for a Telegram bot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        /// Operator login
        login: String,
        /// Password. Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and discard the stored session token
    Logout,
    /// Show the signed-in operator
    Whoami,
    /// Register the owner account on a fresh deployment
    Setup {
        /// Owner login
        login: String,
        /// Password. Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
        /// Display name. Defaults to the login.
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Show bot statistics
    Stats,
    /// Broadcast messages to all bot users
    Broadcast {
        #[command(subcommand)]
        command: BroadcastCommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum BroadcastCommands {
    /// List past broadcasts
    List,
    /// Send a broadcast to all users
    Send {
        /// Message text
        text: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Create the default config file
    Init,
}

/// Entry point: parses arguments and runs the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands must work before any config or log directory exists.
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let _log_guard = botdeck_core::logging::init()?;
    let config = Config::load().context("load config")?;

    let Some(command) = cli.command else {
        return botdeck_tui::run_panel(&config).await;
    };

    match command {
        Commands::Login { login, password } => {
            commands::auth::login(&config, &login, password).await
        }
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Whoami => commands::auth::whoami(&config).await,
        Commands::Setup {
            login,
            password,
            display_name,
        } => commands::auth::setup(&config, &login, password, display_name).await,
        Commands::Stats => commands::panel::stats(&config).await,
        Commands::Broadcast { command } => match command {
            BroadcastCommands::List => commands::panel::broadcast_list(&config).await,
            BroadcastCommands::Send { text } => {
                commands::panel::broadcast_send(&config, &text).await
            }
        },
        Commands::Config { .. } => unreachable!("handled above"),
    }
}
