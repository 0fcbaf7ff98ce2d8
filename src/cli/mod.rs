//! CLI module - Command-line interface for anisync
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// anisync - Anime catalog synchronizer
/// Imports and refreshes anime and episodes from MyAnimeList via Jikan
#[derive(Parser)]
#[command(name = "anisync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the admin HTTP server
    #[command(alias = "web")]
    Serve,

    /// Import an anime and all of its episodes
    #[command(alias = "a")]
    Add {
        /// MyAnimeList ID
        mal_id: i32,
    },

    /// Refresh an anime and append newly aired episodes
    #[command(alias = "u")]
    Update {
        /// MyAnimeList ID
        mal_id: i32,
    },

    /// Show recently added anime and episodes
    #[command(alias = "r")]
    Recent {
        /// Number of entries to show
        #[arg(long, default_value = "10")]
        limit: u64,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
