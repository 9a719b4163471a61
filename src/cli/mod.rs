use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "marine-flow")]
#[command(about = "Drive the import/export marine cargo workflow")]
#[command(long_about = "marine-flow advances a trade-and-insurance workflow between importer, exporter, \
                       insurer, shipper and surveyor. Each workflow instance keeps its current state in a \
                       local key/value store. Start one with 'marine-flow init initial'.")]
pub struct Cli {
    /// Workflow instance to operate on
    #[arg(long, global = true, help = "Workflow instance id (defaults to the configured instance)")]
    pub instance: Option<String>,

    /// Store directory
    #[arg(long, global = true, help = "Directory of the key/value store (overrides configuration)")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed the instance with its starting state
    Init {
        /// Wire name of the starting state, e.g. "initial"
        state: String,
    },
    /// Call a mutating operation (init, send, write)
    Invoke {
        /// Operation name
        function: String,
        /// Operation arguments
        args: Vec<String>,
    },
    /// Call a read-only operation (read, state); the payload goes to stdout
    Query {
        /// Operation name
        function: String,
        /// Operation arguments
        args: Vec<String>,
    },
    /// Show the current state, who holds it, and the events that apply
    Status,
    /// Print the transition table and its analysis
    Rules {
        /// Emit the analysis as JSON
        #[arg(long, help = "Print the table report as JSON")]
        json: bool,
        /// Fail when the table has conflicting rules
        #[arg(long, help = "Exit with an error if any (state, event) pair has conflicting targets")]
        check: bool,
        /// State to compute reachability from
        #[arg(long, default_value = "initial", help = "Starting state for the reachability analysis")]
        from: String,
    },
}
