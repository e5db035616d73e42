//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Admin REST resource tree CLI
#[derive(Parser, Debug)]
#[command(name = "resttree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Draw from the priority throttle tier
    #[arg(short, long, global = true)]
    pub priority: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// GET a resource path such as `Product:632910392/Image`
    Get {
        /// Resource path, `Name` or `Name:id` segments separated by `/`
        path: String,

        /// Query parameters (`key=value`, repeatable)
        #[arg(short, long = "query")]
        query: Vec<String>,

        /// Number of pages to fetch by following `next` links
        #[arg(long, default_value = "1")]
        pages: usize,
    },

    /// Count items in a collection
    Count {
        /// Resource path
        path: String,

        /// Query parameters (`key=value`, repeatable)
        #[arg(short, long = "query")]
        query: Vec<String>,
    },

    /// Search a collection
    Search {
        /// Resource path
        path: String,

        /// Search query
        query: String,
    },

    /// Invoke a custom action
    Action {
        /// Resource path
        path: String,

        /// Action name, e.g. `close`
        name: String,

        /// Inline JSON argument (body for POST/PUT, query for GET/DELETE)
        #[arg(long)]
        json: Option<String>,
    },

    /// List catalog resources, or describe one kind
    Resources {
        /// Kind to describe
        #[arg(long)]
        kind: Option<String>,
    },

    /// Show the tenant's throttle flags
    Throttle,
}
