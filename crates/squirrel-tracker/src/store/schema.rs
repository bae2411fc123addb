//! `SQLite` schema definitions for squirrel-tracker.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the sightings table.
///
/// `AUTOINCREMENT` keeps ids from being reused after a row disappears.
pub const CREATE_SIGHTINGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS sightings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    location TEXT NOT NULL,
    size TEXT,
    color TEXT,
    behavior TEXT,
    date_spotted TEXT NOT NULL,
    notes TEXT,
    is_favorite INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index on species for the species counts.
pub const CREATE_SPECIES_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_sightings_species ON sightings(species)
";

/// SQL statement to create an index on `date_spotted`.
pub const CREATE_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_sightings_date ON sightings(date_spotted DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_SIGHTINGS_TABLE,
    CREATE_SPECIES_INDEX,
    CREATE_DATE_INDEX,
    CREATE_METADATA_TABLE,
];
