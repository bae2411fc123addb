//! Record store abstraction for squirrel-tracker.
//!
//! The record store is the persistence collaborator behind the controller. It
//! offers exactly three calls: list, create and update. There is no delete.
//! Every call reports a success flag alongside its payload; a transport or
//! database error is reported through `Err` instead.

pub mod migrations;
pub mod schema;
mod sqlite;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sighting::{Sighting, SightingData, SightingId};

pub use sqlite::{Storage, StorageStats};

/// Response envelope returned by every store call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResponse<T> {
    /// Whether the store accepted the request.
    pub success: bool,
    /// The payload. A store may accept a request without returning one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> StoreResponse<T> {
    /// A successful response carrying `data`.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }

    /// A response signalling that the store declined the request.
    #[must_use]
    pub fn rejected() -> Self {
        Self {
            success: false,
            data: None,
        }
    }

    /// The payload, if the call succeeded and carried one.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

/// Persistence collaborator for sightings.
///
/// Implementors assign ids on `create` and must never reuse them.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// The name of this store (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Fetch every stored sighting.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn list(&self) -> Result<StoreResponse<Vec<Sighting>>>;

    /// Persist a new sighting and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn create(&self, data: &SightingData) -> Result<StoreResponse<Sighting>>;

    /// Replace the fields of an existing sighting.
    ///
    /// Responds with `success = false` if `id` is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn update(&self, id: SightingId, data: &SightingData)
        -> Result<StoreResponse<Sighting>>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn list(&self) -> Result<StoreResponse<Vec<Sighting>>> {
        (**self).list().await
    }

    async fn create(&self, data: &SightingData) -> Result<StoreResponse<Sighting>> {
        (**self).create(data).await
    }

    async fn update(
        &self,
        id: SightingId,
        data: &SightingData,
    ) -> Result<StoreResponse<Sighting>> {
        (**self).update(id, data).await
    }
}
