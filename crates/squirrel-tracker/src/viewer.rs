//! Read-only detail view of a single sighting.

use crate::sighting::Sighting;

/// Holds at most one sighting for display. Viewing never mutates data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailViewer {
    showing: Option<Sighting>,
}

impl DetailViewer {
    /// A viewer showing nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `record`, replacing whatever was shown.
    pub fn open(&mut self, record: Sighting) {
        self.showing = Some(record);
    }

    /// Show nothing.
    pub fn close(&mut self) {
        self.showing = None;
    }

    /// The sighting being shown.
    #[must_use]
    pub fn current(&self) -> Option<&Sighting> {
        self.showing.as_ref()
    }

    /// Whether anything is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.showing.is_some()
    }
}
