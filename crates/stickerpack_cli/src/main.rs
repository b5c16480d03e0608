//! Stickerpack CLI
//!
//! Command-line editor for sticker sets kept in a store directory.
//!
//! # Commands
//!
//! - `list` - List sets, most recently edited first
//! - `show` - Show the stickers of one set
//! - `add` - Add a sticker from an image file
//! - `remove` / `move` / `discard` - Edit a set
//! - `export` - Validate a set and write it to a directory
//! - `compact` - Rewrite the journal as a single snapshot

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sticker set editor and exporter.
#[derive(Parser)]
#[command(name = "stickerpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sticker sets, most recently edited first
    List,

    /// Show the stickers of a set
    Show {
        /// Set id
        set: String,
    },

    /// Add a sticker from an image file
    Add {
        /// Set to add to (a new set is created if omitted)
        #[arg(long)]
        set: Option<String>,

        /// Image file (any format the decoder understands)
        #[arg(short, long)]
        image: PathBuf,

        /// Emojis for the sticker
        #[arg(short, long)]
        emoji: String,

        /// Position to insert at (default: end)
        #[arg(long)]
        at: Option<usize>,
    },

    /// Remove the sticker at an index
    Remove {
        /// Set id
        set: String,
        /// Member index
        index: usize,
    },

    /// Move a sticker to another index
    Move {
        /// Set id
        set: String,
        /// Current index
        from: usize,
        /// New index
        to: usize,
    },

    /// Delete a set and all its stickers
    Discard {
        /// Set id
        set: String,
    },

    /// Validate a set and write it to a directory
    Export {
        /// Set id
        set: String,

        /// Output directory (must be empty or missing)
        #[arg(short, long)]
        out: PathBuf,

        /// Application identifier written to the manifest
        #[arg(long, default_value = commands::export::DEFAULT_SOFTWARE)]
        software: String,
    },

    /// Rewrite the journal as a single snapshot
    Compact,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Version = cli.command {
        println!("stickerpack {}", stickerpack_core::VERSION);
        return Ok(());
    }

    let path = cli.store.ok_or("Store path required (--store <dir>)")?;
    let mut store = commands::open_store(&path)?;

    match cli.command {
        Commands::List => commands::list::run(&store)?,
        Commands::Show { set } => commands::show::run(&store, &set)?,
        Commands::Add {
            set,
            image,
            emoji,
            at,
        } => commands::edit::add(&mut store, set.as_deref(), &image, &emoji, at)?,
        Commands::Remove { set, index } => commands::edit::remove(&mut store, &set, index)?,
        Commands::Move { set, from, to } => commands::edit::move_member(&mut store, &set, from, to)?,
        Commands::Discard { set } => commands::edit::discard(&mut store, &set)?,
        Commands::Export { set, out, software } => {
            commands::export::run(&store, &set, &out, &software)?;
        }
        Commands::Compact => commands::compact::run(&mut store)?,
        Commands::Version => {}
    }

    Ok(())
}
