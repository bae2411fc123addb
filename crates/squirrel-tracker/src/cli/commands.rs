//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::config::DisplayFormat;
use crate::sighting::{Behavior, Color, SightingId, Size, Species};
use crate::validation::FormValues;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Page to show, starting at 1
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output format (defaults to `display.format`)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Sighting fields accepted by `add` and `edit`.
///
/// Every flag is optional at parse time so that missing required fields are
/// reported by form validation with the same messages the shell uses.
#[derive(Debug, Default, Args)]
pub struct FieldArgs {
    /// Squirrel name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Species, e.g. "Gray Squirrel"
    #[arg(short, long)]
    pub species: Option<Species>,

    /// Where it was spotted
    #[arg(short, long)]
    pub location: Option<String>,

    /// Small, Medium or Large
    #[arg(long)]
    pub size: Option<Size>,

    /// Main fur color
    #[arg(long)]
    pub color: Option<Color>,

    /// What it was doing, e.g. "Climbing trees"
    #[arg(long)]
    pub behavior: Option<Behavior>,

    /// Date spotted (defaults to today)
    #[arg(short, long = "date", value_name = "YYYY-MM-DD")]
    pub date_spotted: Option<NaiveDate>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Mark as favorite
    #[arg(long, value_name = "BOOL")]
    pub favorite: Option<bool>,
}

impl FieldArgs {
    /// Overwrite the form fields that were given on the command line.
    pub fn apply(&self, values: &mut FormValues) {
        if let Some(name) = &self.name {
            values.name.clone_from(name);
        }
        if let Some(location) = &self.location {
            values.location.clone_from(location);
        }
        if self.species.is_some() {
            values.species = self.species;
        }
        if self.size.is_some() {
            values.size = self.size;
        }
        if self.color.is_some() {
            values.color = self.color;
        }
        if self.behavior.is_some() {
            values.behavior = self.behavior;
        }
        if self.date_spotted.is_some() {
            values.date_spotted = self.date_spotted;
        }
        if let Some(notes) = &self.notes {
            values.notes = Some(notes.clone());
        }
        if self.favorite.is_some() {
            values.is_favorite = self.favorite;
        }
    }
}

/// Edit command arguments.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Id of the sighting to edit
    pub id: SightingId,

    /// Fields to change
    #[command(flatten)]
    pub fields: FieldArgs,
}

/// View command arguments.
#[derive(Debug, Args)]
pub struct ViewCommand {
    /// Id of the sighting to show
    pub id: SightingId,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Favorite command arguments.
#[derive(Debug, Args)]
pub struct FavoriteCommand {
    /// Id of the sighting to toggle
    pub id: SightingId,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}

impl From<OutputFormat> for DisplayFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Plain => Self::Plain,
            OutputFormat::Table => Self::Table,
            OutputFormat::Json => Self::Json,
        }
    }
}
