//! LoginBridge CLI
//!
//! Command-line access to a LoginBridge JSON vault through the same request
//! handling remote callers use.
//!
//! # Commands
//!
//! - `check-version` - Run the first-contact version check
//! - `list` - List every login
//! - `find` - Find logins for a site
//! - `count` - Count logins for a site
//! - `add` - Store a new login

mod commands;

use clap::{Parser, Subcommand};
use commands::SearchArgs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LoginBridge command-line credential tools.
#[derive(Parser)]
#[command(name = "loginbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the vault file
    #[arg(global = true, long)]
    vault: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(global = true, short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the first-contact version check
    CheckVersion {
        /// Client version, e.g. 0.4
        #[arg(long)]
        client: String,

        /// Oldest server version the client accepts
        #[arg(long, default_value = "0.0")]
        min_server: String,
    },

    /// List every login
    List {
        /// Print passwords in clear
        #[arg(long)]
        reveal: bool,
    },

    /// Find logins for a site
    Find {
        #[command(flatten)]
        search: SearchArgs,

        /// Look up one login by unique id
        #[arg(long)]
        unique_id: Option<String>,

        /// Print passwords in clear
        #[arg(long)]
        reveal: bool,
    },

    /// Count logins for a site
    Count {
        #[command(flatten)]
        search: SearchArgs,

        /// Count from a plaintext URL index instead of the vault
        #[arg(long)]
        plaintext: Option<PathBuf>,
    },

    /// Store a new login, creating the vault if needed
    Add {
        /// Site URL
        #[arg(long)]
        host: String,

        /// Entry title
        #[arg(long, default_value = "")]
        title: String,

        /// Form action URL
        #[arg(long, default_value = "")]
        action_url: String,

        /// HTTP realm
        #[arg(long, default_value = "")]
        realm: String,

        /// User name
        #[arg(long)]
        username: Option<String>,

        /// Password
        #[arg(long)]
        password: Option<String>,

        /// Extra text field as name=value (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::CheckVersion { client, min_server } => {
            commands::check_version::run(&client, &min_server, &cli.format)?;
        }
        Commands::List { reveal } => {
            let vault = cli.vault.ok_or("Vault path required for list")?;
            commands::list::run(&vault, reveal, &cli.format)?;
        }
        Commands::Find {
            search,
            unique_id,
            reveal,
        } => {
            let vault = cli.vault.ok_or("Vault path required for find")?;
            commands::find::run(&vault, &search, unique_id, reveal, &cli.format)?;
        }
        Commands::Count { search, plaintext } => {
            commands::count::run(cli.vault.as_deref(), plaintext, &search, &cli.format)?;
        }
        Commands::Add {
            host,
            title,
            action_url,
            realm,
            username,
            password,
            fields,
        } => {
            let vault = cli.vault.ok_or("Vault path required for add")?;
            let login = commands::add::build_login(
                host, title, action_url, realm, username, password, &fields,
            )?;
            commands::add::run(&vault, login, &cli.format)?;
        }
        Commands::Version => {
            println!("LoginBridge CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("LoginBridge Core v{}", loginbridge_core::VERSION);
            println!("Protocol v{}", loginbridge_server::SERVER_VERSION);
        }
    }

    Ok(())
}
