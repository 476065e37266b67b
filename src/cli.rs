use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tidepool_common::MediaKind;

#[derive(Parser)]
#[command(name = "tidepool")]
#[command(author, version, about = "Media gallery proxy with stock-media fallback")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gallery proxy server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one aggregated search and print the JSON page
    Search {
        /// Media kind: photos, videos or collections
        kind: MediaKind,

        /// Free-text query (omit to browse the catalog)
        query: Option<String>,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Items per page
        #[arg(long, default_value = "20")]
        per_page: u32,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
