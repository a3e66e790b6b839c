//! CLI command definitions for the `opsforge` binary.
//!
//! Uses clap derive macros for argument parsing.

use clap::{Parser, Subcommand};

/// Agentic analysis and provisioning API for AWS infrastructure.
#[derive(Parser)]
#[command(name = "opsforge", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Bridge tracing spans to an OpenTelemetry stdout exporter.
        #[arg(long)]
        otel: bool,
    },

    /// Show effective configuration and credential status.
    Status,
}
