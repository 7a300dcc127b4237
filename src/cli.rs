//! CLI argument definitions.

use std::net::IpAddr;

use clap::{Parser, Subcommand};

use crate::resolve::BlockedPolicy;

/// Top-level CLI parser for `actionables`.
#[derive(Debug, Parser)]
#[command(
    name = "actionables",
    version,
    about = "Compute the actionable open Redmine issues of a user"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service until SIGTERM or SIGINT.
    Serve {
        /// Address to bind (overrides `BIND`).
        #[arg(long)]
        bind: Option<IpAddr>,
        /// Port to listen on (overrides `PORT`).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Resolve once and print the result as JSON.
    Resolve {
        /// Base URL of the Redmine server.
        #[arg(long)]
        url: String,
        /// Redmine API key of the user to resolve for.
        #[arg(long)]
        apikey: String,
        /// How candidates with open blockers are reported
        /// (overrides `ACTIONABLES_BLOCKED_POLICY`).
        #[arg(long, value_enum)]
        blocked_policy: Option<BlockedPolicy>,
    },
}
