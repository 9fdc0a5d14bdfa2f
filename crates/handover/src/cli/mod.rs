//! Command-line interface for handover.
//!
//! This module provides the CLI structure for the `handover` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ExportCommand, ListCommand, ServeCommand, StatusCommand};

use crate::logging::Verbosity;

/// handover - IT asset handover forms
///
/// Collects handover submissions over the web, stores them in SQLite, mails
/// IT staff about each one and prints them as signed acknowledgment forms.
#[derive(Debug, Parser)]
#[command(name = "handover")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web service
    Serve(ServeCommand),

    /// List stored handover records, newest first
    List(ListCommand),

    /// Write the PDF form of one record
    Export(ExportCommand),

    /// Show database location and record count
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
