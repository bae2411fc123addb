//! Command-line interface for squirrel-tracker.
//!
//! This module provides the CLI structure for the `squirrels` binary and the
//! interactive shell it can start.

mod commands;
pub mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, EditCommand, FavoriteCommand, FieldArgs, ListCommand, OutputFormat,
    StatsCommand, ViewCommand,
};
pub use shell::{Flow, Shell};

use crate::logging::Verbosity;

/// squirrels - Keep track of all the squirrels you encounter
///
/// Record sightings with species, location and behavior, mark favorites,
/// and browse what you have seen.
#[derive(Debug, Parser)]
#[command(name = "squirrels")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
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
    /// List recorded sightings, one page at a time
    List(ListCommand),

    /// Show sighting totals
    Stats(StatsCommand),

    /// Record a new sighting
    Add(FieldArgs),

    /// Change an existing sighting
    Edit(EditCommand),

    /// Show one sighting in detail
    View(ViewCommand),

    /// Toggle the favorite flag of a sighting
    Favorite(FavoriteCommand),

    /// Start an interactive session
    Shell,

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
