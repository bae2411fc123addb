//! `SQLite`-backed record store.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use super::{migrations, RecordStore, StoreResponse};
use crate::error::{Error, Result};
use crate::sighting::{Sighting, SightingData, SightingId, Species};

const SELECT_COLUMNS: &str = r"
    SELECT id, name, species, location, size, color, behavior,
           date_spotted, notes, is_favorite
    FROM sightings
";

/// Persistent storage for sightings.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Sighting insertion with store-assigned, never-reused ids
/// - Whole-row replacement by id
/// - Listing in insertion order
///
/// The connection sits behind a mutex so the store can be shared with the
/// async controller.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // WAL keeps readers from blocking on a writer
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))
    }

    /// Insert a new sighting and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert(&self, data: &SightingData) -> Result<Sighting> {
        let conn = self.conn()?;
        conn.execute(
            r"
            INSERT INTO sightings
                (name, species, location, size, color, behavior,
                 date_spotted, notes, is_favorite, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
            ",
            params![
                data.name,
                data.species.label(),
                data.location,
                data.size.map(|s| s.label()),
                data.color.map(|c| c.label()),
                data.behavior.map(|b| b.label()),
                data.date_spotted.to_string(),
                data.notes,
                data.is_favorite,
            ],
        )?;

        let id = SightingId::new(conn.last_insert_rowid());
        debug!("Inserted sighting with id {}", id);
        Ok(Sighting::new(id, data.clone()))
    }

    /// Replace every field of the sighting with the given id and return the
    /// row as stored.
    ///
    /// Returns `None` if no such sighting exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn replace(&self, id: SightingId, data: &SightingData) -> Result<Option<Sighting>> {
        let affected = self.conn()?.execute(
            r"
            UPDATE sightings SET
                name = ?2, species = ?3, location = ?4, size = ?5, color = ?6,
                behavior = ?7, date_spotted = ?8, notes = ?9, is_favorite = ?10,
                updated_at = datetime('now')
            WHERE id = ?1
            ",
            params![
                id.get(),
                data.name,
                data.species.label(),
                data.location,
                data.size.map(|s| s.label()),
                data.color.map(|c| c.label()),
                data.behavior.map(|b| b.label()),
                data.date_spotted.to_string(),
                data.notes,
                data.is_favorite,
            ],
        )?;

        if affected == 0 {
            debug!("No sighting with id {} to update", id);
            return Ok(None);
        }
        debug!("Updated sighting with id {}", id);
        self.get(id)
    }

    /// Get a sighting by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: SightingId) -> Result<Option<Sighting>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let result = self
            .conn()?
            .query_row(&sql, [id.get()], Self::row_to_sighting)
            .optional()?;
        Ok(result)
    }

    /// Get every sighting, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn all(&self) -> Result<Vec<Sighting>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id ASC"))?;
        let sightings = stmt
            .query_map([], Self::row_to_sighting)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sightings)
    }

    /// Count stored sightings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM sightings", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_sightings = self.count()?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_sightings,
            db_size_bytes,
        })
    }

    /// Convert a database row to a `Sighting`.
    ///
    /// Unknown option labels degrade instead of failing the whole list: an
    /// unknown species becomes `Other`, unknown size/color/behavior become
    /// unset.
    fn row_to_sighting(row: &rusqlite::Row) -> rusqlite::Result<Sighting> {
        let id: i64 = row.get(0)?;
        let species_str: String = row.get(2)?;
        let date_str: String = row.get(7)?;

        let species = Species::from_str(&species_str).unwrap_or_else(|_| {
            warn!(
                "Unknown species '{}' on sighting {}, defaulting to Other",
                species_str, id
            );
            Species::Other
        });

        let date_spotted = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

        Ok(Sighting::new(
            SightingId::new(id),
            SightingData {
                name: row.get(1)?,
                species,
                location: row.get(3)?,
                size: optional_label(row, 4, id)?,
                color: optional_label(row, 5, id)?,
                behavior: optional_label(row, 6, id)?,
                date_spotted,
                notes: row.get(8)?,
                is_favorite: row.get(9)?,
            },
        ))
    }
}

fn optional_label<T: FromStr>(
    row: &rusqlite::Row,
    idx: usize,
    id: i64,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw.and_then(|value| match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring unknown value '{}' on sighting {}", value, id);
            None
        }
    }))
}

#[async_trait]
impl RecordStore for Storage {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn list(&self) -> Result<StoreResponse<Vec<Sighting>>> {
        self.all().map(StoreResponse::ok)
    }

    async fn create(&self, data: &SightingData) -> Result<StoreResponse<Sighting>> {
        self.insert(data).map(StoreResponse::ok)
    }

    async fn update(
        &self,
        id: SightingId,
        data: &SightingData,
    ) -> Result<StoreResponse<Sighting>> {
        Ok(self
            .replace(id, data)?
            .map_or_else(StoreResponse::rejected, StoreResponse::ok))
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of sightings stored.
    pub total_sightings: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
