//! `squirrel-tracker` - Keep track of all the squirrels you encounter
//!
//! This library manages the lifecycle of squirrel sightings: loading them
//! from a record store, creating and editing them through a validated form,
//! toggling favorites, and presenting a list with summary statistics.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod render;
pub mod session;
pub mod sighting;
pub mod store;
pub mod validation;
pub mod viewer;

pub use config::Config;
pub use controller::{RecordController, Stats};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use session::FormSession;
pub use sighting::{Sighting, SightingData, SightingId, Species};
pub use store::{RecordStore, Storage, StorageStats};
pub use validation::FormValues;
pub use viewer::DetailViewer;
