//! Command line interface
//!
//! - `serve`: run the HTTP proxy
//! - `search`: run one search through the cache and print the result

pub mod search;
pub mod serve;

use clap::{Parser, Subcommand};

/// Caching search proxy for the Spotify Web API
#[derive(Parser)]
#[command(name = "spotify-search-proxy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Run a single search and print the JSON result
    Search(search::SearchArgs),
}
