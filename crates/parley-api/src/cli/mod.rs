//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod services;
pub mod widget;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Chat widget backend: HTTP endpoint plus admin commands.
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

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Config file (default: <data dir>/config.toml).
    #[arg(long, global = true, env = "PARLEY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter directives for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn,parley_api=info",
            1 => "info,parley=debug,parley_core=debug,parley_infra=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP endpoint.
    Serve {
        /// Host to bind to (default from config).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default from config).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the AI services the widget can pick from.
    Services,

    /// Manage stored widget configuration blobs.
    Widget {
        #[command(subcommand)]
        action: WidgetCommand,
    },
}

#[derive(Subcommand)]
pub enum WidgetCommand {
    /// Store a JSON document, or replace an existing one with --id.
    Set {
        /// Inline JSON, or @path to read it from a file.
        data: String,

        /// Replace the blob with this id instead of creating one.
        #[arg(long)]
        id: Option<i64>,
    },

    /// Print a stored blob.
    Show {
        id: i64,
    },

    /// Delete a stored blob.
    #[command(alias = "rm")]
    Delete {
        id: i64,
    },
}
