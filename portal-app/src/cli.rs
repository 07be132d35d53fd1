use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line arguments accepted by the `portal` binary.
#[derive(Parser, Debug)]
#[command(name = "portal", version, about = "Search portal with quota-aware web search")]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        env = "PORTAL_CONFIG",
        help = "Configuration file to load (default: ./portal.yaml if present)"
    )]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Print machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Run a web search
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Autocomplete suggestions for partial input
    Suggest {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Top Hacker News stories
    News,
    /// Today's request counts per search credential
    Quota,
    /// Manage site shortcuts
    Shortcuts {
        #[command(subcommand)]
        action: ShortcutCmd,
    },
    /// Print a link with the configured referral tag applied
    Link {
        url: String,
        #[arg(long, help = "Override the configured referral tag")]
        tag: Option<String>,
    },
    /// Interactive loop; repeated queries are answered from the cache
    Shell,
}

#[derive(Subcommand, Debug)]
pub enum ShortcutCmd {
    List,
    Add {
        url: String,
        key: String,
    },
    Edit {
        index: usize,
        name: String,
        url: String,
        key: String,
    },
    Delete {
        index: usize,
    },
    /// Print the URL bound to a key
    Open {
        key: char,
    },
    /// Resolve missing favicons
    Icons,
}
