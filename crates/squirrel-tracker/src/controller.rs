//! Record controller: the displayed list, its statistics, and every
//! conversation with the record store.
//!
//! The local list is a read-through cache of the store. It is only ever
//! replaced wholesale by [`RecordController::refresh`]; create, update and
//! favorite toggles never patch it locally, they refresh after the store
//! confirms. The one exception is [`RecordController::remove`], which drops a
//! row from the local list without telling the store (the store has no
//! delete call), so a removed sighting comes back on the next refresh.

use std::collections::HashSet;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sighting::{Sighting, SightingId};
use crate::store::{RecordStore, StoreResponse};
use crate::validation::SightingInput;

/// Derived statistics over the current list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of sightings in the list.
    pub total_count: usize,
    /// Number of distinct species across the list.
    pub unique_species_count: usize,
    /// Number of sightings marked as favorite.
    pub favorite_count: usize,
}

impl Stats {
    /// Compute statistics for `records`.
    #[must_use]
    pub fn of(records: &[Sighting]) -> Self {
        Self {
            total_count: records.len(),
            unique_species_count: records
                .iter()
                .map(|r| r.data.species)
                .collect::<HashSet<_>>()
                .len(),
            favorite_count: records.iter().filter(|r| r.data.is_favorite).count(),
        }
    }
}

/// One fixed-size page of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number actually returned.
    pub number: usize,
    /// Total number of pages (at least 1).
    pub total_pages: usize,
    /// Number of sightings across all pages.
    pub total_records: usize,
    /// The sightings on this page.
    pub records: Vec<Sighting>,
}

/// Whether a submission created or updated a sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    /// A new sighting was created.
    Created,
    /// An existing sighting was updated.
    Updated,
}

impl SaveKind {
    /// User-facing confirmation message.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Created => "Squirrel added successfully!",
            Self::Updated => "Squirrel updated successfully!",
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saved {
    /// Created or updated.
    pub kind: SaveKind,
    /// The sighting as returned by the store, if it returned one.
    pub record: Option<Sighting>,
    /// True when the follow-up refresh failed and the list still shows the
    /// pre-save data.
    pub stale: bool,
}

/// Direction of a favorite toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    /// The sighting is now a favorite.
    Favorited,
    /// The sighting is no longer a favorite.
    Unfavorited,
}

impl FavoriteToggle {
    /// User-facing confirmation message.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Favorited => "Added to favorites!",
            Self::Unfavorited => "Removed from favorites!",
        }
    }
}

impl fmt::Display for FavoriteToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of a successful favorite toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggled {
    /// Which way the flag went.
    pub direction: FavoriteToggle,
    /// True when the follow-up refresh failed.
    pub stale: bool,
}

/// Owns the displayed sighting list and mediates all store traffic.
///
/// Operations take `&self` so a caller may issue a second operation before
/// the first resolves. Nothing is queued, coalesced or cancelled: when two
/// refreshes overlap, the last one to complete wins.
pub struct RecordController<S> {
    store: S,
    records: RwLock<Vec<Sighting>>,
    loading: watch::Sender<bool>,
    today: fn() -> NaiveDate,
}

impl<S: fmt::Debug> fmt::Debug for RecordController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordController")
            .field("store", &self.store)
            .field(
                "records",
                &self.records.read().map(|r| r.len()).unwrap_or_default(),
            )
            .field("loading", &*self.loading.borrow())
            .finish_non_exhaustive()
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl<S: RecordStore> RecordController<S> {
    /// Create a controller with an empty list. Call [`refresh`](Self::refresh)
    /// to load the store's contents.
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: RwLock::new(Vec::new()),
            loading: watch::Sender::new(false),
            today: utc_today,
        }
    }

    /// Replace the clock used to default `date_spotted`.
    #[must_use]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Sighting>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Sighting>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current list.
    pub fn records(&self) -> Vec<Sighting> {
        self.read().clone()
    }

    /// Number of sightings in the current list.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the current list is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Look up a sighting in the current list.
    pub fn find(&self, id: SightingId) -> Option<Sighting> {
        self.read().iter().find(|r| r.id == id).cloned()
    }

    /// Like [`find`](Self::find), but a missing id is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` is not in the current list.
    pub fn get(&self, id: SightingId) -> Result<Sighting> {
        self.find(id).ok_or(Error::NotFound { id })
    }

    /// Statistics over the current list, computed fresh on every call.
    pub fn stats(&self) -> Stats {
        Stats::of(&self.read())
    }

    /// The given 1-based page of the current list.
    ///
    /// Page numbers past the end clamp to the last page; `0` is treated as 1.
    /// A `page_size` of 0 is treated as 1.
    pub fn page(&self, number: usize, page_size: usize) -> Page {
        let records = self.read();
        let page_size = page_size.max(1);
        let total_records = records.len();
        let total_pages = total_records.div_ceil(page_size).max(1);
        let number = number.clamp(1, total_pages);
        let start = (number - 1) * page_size;

        Page {
            number,
            total_pages,
            total_records,
            records: records.iter().skip(start).take(page_size).cloned().collect(),
        }
    }

    /// Whether a refresh is in flight.
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Subscribe to the loading flag.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Reload the list from the store.
    ///
    /// On success the local list is replaced wholesale and its new length is
    /// returned. An accepted reply without a payload counts as an empty list. On failure the existing list is left untouched. There is no
    /// retry and no partial merge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoadFailure`] if the store errors or declines.
    pub async fn refresh(&self) -> Result<usize> {
        self.loading.send_replace(true);
        let response = self.store.list().await;
        self.loading.send_replace(false);

        match settle(response) {
            Ok(Reply::Accepted(records)) => {
                let records = records.unwrap_or_default();
                let count = records.len();
                *self.write() = records;
                debug!("Loaded {} sightings from {}", count, self.store.name());
                Ok(count)
            }
            Ok(Reply::Declined) => {
                warn!("Store {} declined to list sightings", self.store.name());
                Err(Error::load_failure("store rejected the request"))
            }
            Err(e) => {
                warn!("Failed to list sightings: {}", e);
                Err(Error::load_failure(e.to_string()))
            }
        }
    }

    /// Persist validated form values.
    ///
    /// The payload's date defaults to today and its favorite flag to false.
    /// With `editing` the sighting with that id is updated, otherwise a new
    /// sighting is created. A successful save is followed by a refresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SaveFailure`] if the store errors or declines. The
    /// local list is not touched in that case.
    pub async fn submit(
        &self,
        input: SightingInput,
        editing: Option<SightingId>,
    ) -> Result<Saved> {
        let payload = input.into_data((self.today)());

        let (kind, response) = match editing {
            Some(id) => {
                debug!("Updating sighting {}", id);
                (SaveKind::Updated, self.store.update(id, &payload).await)
            }
            None => {
                debug!("Creating sighting '{}'", payload.name);
                (SaveKind::Created, self.store.create(&payload).await)
            }
        };

        let record = match settle(response) {
            Ok(Reply::Accepted(record)) => record,
            Ok(Reply::Declined) => {
                warn!("Store {} declined to save sighting", self.store.name());
                return Err(Error::save_failure("store rejected the request"));
            }
            Err(e) => {
                warn!("Failed to save sighting: {}", e);
                return Err(Error::save_failure(e.to_string()));
            }
        };

        if let Some(record) = &record {
            info!("{:?} sighting {}", kind, record.id);
        }

        let stale = self.refresh().await.is_err();
        Ok(Saved {
            kind,
            record,
            stale,
        })
    }

    /// Flip the favorite flag of `record` through the store.
    ///
    /// Nothing changes locally until the store confirms, so a failure needs
    /// no rollback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToggleFailure`] if the store errors or declines.
    pub async fn toggle_favorite(&self, record: &Sighting) -> Result<Toggled> {
        let payload = record.with_favorite_toggled();
        let direction = if payload.is_favorite {
            FavoriteToggle::Favorited
        } else {
            FavoriteToggle::Unfavorited
        };

        match settle(self.store.update(record.id, &payload).await) {
            Ok(Reply::Accepted(_)) => {}
            Ok(Reply::Declined) => {
                warn!(
                    "Store {} declined favorite update for {}",
                    self.store.name(),
                    record.id
                );
                return Err(Error::toggle_failure("store rejected the request"));
            }
            Err(e) => {
                warn!("Failed to update favorite for {}: {}", record.id, e);
                return Err(Error::toggle_failure(e.to_string()));
            }
        }

        info!("Sighting {}: {}", record.id, direction);
        let stale = self.refresh().await.is_err();
        Ok(Toggled { direction, stale })
    }

    /// Drop a sighting from the local list only.
    ///
    /// The store is never asked to delete anything; it has no such call. The
    /// sighting reappears on the next refresh. Returns whether a sighting
    /// with `id` was in the list.
    pub fn remove(&self, id: SightingId) -> bool {
        let mut records = self.write();
        let before = records.len();
        records.retain(|r| r.id != id);
        let removed = records.len() < before;
        if removed {
            info!("Removed sighting {} from the local list", id);
        }
        removed
    }
}

/// How the store answered a call that did not error.
enum Reply<T> {
    /// `success` was true; the payload is optional.
    Accepted(Option<T>),
    /// `success` was false.
    Declined,
}

/// Decide on the success flag alone.
fn settle<T>(response: Result<StoreResponse<T>>) -> Result<Reply<T>> {
    response.map(|reply| {
        if reply.success {
            Reply::Accepted(reply.data)
        } else {
            Reply::Declined
        }
    })
}
