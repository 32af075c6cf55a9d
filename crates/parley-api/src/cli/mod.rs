//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod check_db;
pub mod conversation;

use clap::{Parser, Subcommand};

/// Chat backend with a tiered AI responder.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Write logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (defaults to config / PORT, else 5000).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config, else 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
    },

    /// Verify the database is reachable and migrated.
    CheckDb,

    /// Send one message through the responder and print the reply.
    Ask {
        /// The message to send.
        message: String,
    },

    /// Print the conversation history.
    #[command(alias = "log")]
    History,

    /// Clear the conversation history.
    Clear,
}

impl Cli {
    /// Default tracing filter for this invocation when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 if matches!(self.command, Commands::Serve { .. }) => "info",
            0 => "warn",
            1 => "info,parley=debug",
            _ => "trace",
        }
    }
}
