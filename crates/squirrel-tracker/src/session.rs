//! The add/edit form session.
//!
//! At most one form is open at a time. Opening a form while another is open
//! replaces it. The session keeps its working values until a save succeeds or
//! the form is cancelled, so a failed save never loses what the user typed.

use tracing::debug;

use crate::controller::{RecordController, Saved};
use crate::error::{Error, Result};
use crate::sighting::{Sighting, SightingId};
use crate::store::RecordStore;
use crate::validation::FormValues;

/// What the form is doing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    /// No form is open.
    #[default]
    Closed,
    /// Adding a new sighting.
    Creating,
    /// Editing the given sighting.
    Editing(Sighting),
}

/// Transient state of the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSession {
    state: FormState,
    values: FormValues,
}

impl FormSession {
    /// A closed session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Whether a form is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self.state, FormState::Closed)
    }

    /// Id of the sighting being edited, if any.
    #[must_use]
    pub fn target(&self) -> Option<SightingId> {
        match &self.state {
            FormState::Editing(record) => Some(record.id),
            FormState::Closed | FormState::Creating => None,
        }
    }

    /// Form heading for the current state.
    #[must_use]
    pub fn title(&self) -> Option<&'static str> {
        match self.state {
            FormState::Closed => None,
            FormState::Creating => Some("Add New Squirrel"),
            FormState::Editing(_) => Some("Edit Squirrel"),
        }
    }

    /// The working values.
    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Mutable access to the working values of an open form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormClosed`] if no form is open.
    pub fn values_mut(&mut self) -> Result<&mut FormValues> {
        if self.is_open() {
            Ok(&mut self.values)
        } else {
            Err(Error::FormClosed)
        }
    }

    /// Open a blank form for a new sighting.
    pub fn open_for_create(&mut self) {
        debug!("Opening add form");
        self.values = FormValues::default();
        self.state = FormState::Creating;
    }

    /// Open a form pre-filled with `record`'s fields.
    pub fn open_for_edit(&mut self, record: Sighting) {
        debug!("Opening edit form for sighting {}", record.id);
        self.values = FormValues::from(&record);
        self.state = FormState::Editing(record);
    }

    /// Close the form and discard its values.
    pub fn cancel(&mut self) {
        self.values = FormValues::default();
        self.state = FormState::Closed;
    }

    /// Submit `values` through the controller.
    ///
    /// `values` become the working copy first. Validation runs before the
    /// controller is involved; a validation or save failure leaves the form
    /// open with those values. On success the form closes.
    ///
    /// # Errors
    ///
    /// - [`Error::FormClosed`] if no form is open.
    /// - [`Error::Validation`] if a required field is missing.
    /// - [`Error::SaveFailure`] if the store did not accept the save.
    pub async fn confirm<S: RecordStore>(
        &mut self,
        values: FormValues,
        controller: &RecordController<S>,
    ) -> Result<Saved> {
        if !self.is_open() {
            return Err(Error::FormClosed);
        }
        self.values = values;

        let input = self.values.validate()?;
        let saved = controller.submit(input, self.target()).await?;

        self.cancel();
        Ok(saved)
    }

    /// Submit the current working values.
    ///
    /// # Errors
    ///
    /// Same as [`confirm`](Self::confirm).
    pub async fn confirm_current<S: RecordStore>(
        &mut self,
        controller: &RecordController<S>,
    ) -> Result<Saved> {
        let values = self.values.clone();
        self.confirm(values, controller).await
    }
}
