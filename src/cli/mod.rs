pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "freshet")]
#[command(about = "Print what is new in your feeds since the last fetch", long_about = None)]
pub struct Cli {
    /// Source list file (overrides `store_path` from the config file)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Config file to use instead of ~/.config/freshet/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Limit on feeds fetched at the same time (default: all at once)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Keep going with the readable part of a damaged source list.
    /// Records after the damage are dropped on the next save.
    #[arg(long, global = true)]
    pub salvage: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start tracking one or more feeds
    Add {
        /// Feed URLs
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Stop tracking one or more feeds
    Delete {
        /// Feed URLs
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// List tracked feeds
    List,
    /// Fetch every feed and print the new entries
    Fetch,
}
