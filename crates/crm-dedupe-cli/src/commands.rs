use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "crm-dedupe")]
#[command(about = "Find duplicate CRM clients and manage bulk selections", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import clients from a CSV or JSON export into the local database
    Import {
        /// Path to a .csv or .json file
        input: PathBuf,
    },
    /// Scan clients for likely duplicates
    Scan {
        /// Scan this file instead of the local database
        #[arg(long)]
        input: Option<PathBuf>,
        /// Print the groups as JSON
        #[arg(long)]
        json: bool,
    },
    /// Propose how each duplicate group would be merged
    MergePlan {
        /// Scan this file instead of the local database
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Interactively build a selection across pages of stored clients
    Select,
    /// Print configuration values
    PrintConfig,
    /// Delete every stored client
    TruncateDb,
}
