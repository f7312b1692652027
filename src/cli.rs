//! Command-line surface of the `ngfield` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ngfield")]
#[command(about = "Load and inspect NextGIS Web field projects", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file; defaults to the OS config directory.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch a project from the remote service and make it active.
    Load {
        id: i64,
        /// Use the private (authenticated) feed.
        #[arg(short, long)]
        private: bool,
        /// Credential hash sent with the feed request.
        #[arg(long)]
        hash: Option<String>,
    },
    /// Normalize a project document from a local file and make it active.
    Import {
        file: PathBuf,
        #[arg(short, long)]
        private: bool,
    },
    /// Show a stored project (the active one by default).
    Show { id: Option<i64> },
    /// List the resource-tree level under NODE (top level by default).
    Level {
        #[arg(short, long)]
        project: Option<i64>,
        #[arg(default_value = "")]
        node: String,
    },
    /// List stored projects.
    List,
    /// Delete a stored project.
    Remove { id: i64 },
    /// Decode an obfuscated password.
    Decode { hash: String, version: u32 },
    /// Obfuscate a password.
    Encode { password: String, version: u32 },
}
