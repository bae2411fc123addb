//! Form values and required-field validation.
//!
//! `FormValues` is the working copy behind the add/edit form. It is checked
//! by [`FormValues::validate`] before anything is sent to the store; a
//! successful check yields a [`SightingInput`] whose required fields are
//! guaranteed present.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sighting::{Behavior, Color, Sighting, SightingData, Size, Species};

/// Fields the form knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Squirrel name.
    Name,
    /// Species selection.
    Species,
    /// Location spotted.
    Location,
    /// Size selection.
    Size,
    /// Color selection.
    Color,
    /// Behavior selection.
    Behavior,
    /// Date spotted.
    DateSpotted,
    /// Free-form notes.
    Notes,
    /// Favorite flag.
    IsFavorite,
}

impl Field {
    /// Look up a field by its form key (`name`, `dateSpotted`, `date_spotted`, ...).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "name" => Some(Self::Name),
            "species" => Some(Self::Species),
            "location" => Some(Self::Location),
            "size" => Some(Self::Size),
            "color" => Some(Self::Color),
            "behavior" => Some(Self::Behavior),
            "datespotted" | "date" => Some(Self::DateSpotted),
            "notes" => Some(Self::Notes),
            "isfavorite" | "favorite" => Some(Self::IsFavorite),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::Name => "name",
            Self::Species => "species",
            Self::Location => "location",
            Self::Size => "size",
            Self::Color => "color",
            Self::Behavior => "behavior",
            Self::DateSpotted => "dateSpotted",
            Self::Notes => "notes",
            Self::IsFavorite => "isFavorite",
        };
        f.write_str(key)
    }
}

/// A validation failure attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The offending field.
    pub field: Field,
    /// User-facing message.
    pub message: &'static str,
}

/// All field errors produced by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// The individual field errors, in form order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether the given field failed validation.
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Message for the given field, if it failed.
    #[must_use]
    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    fn push(&mut self, field: Field, message: &'static str) {
        self.0.push(FieldError { field, message });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A raw value that cannot be stored in a form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for {field}: {message}")]
pub struct InvalidFieldValue {
    /// The field being set.
    pub field: Field,
    /// What was wrong with the value.
    pub message: String,
}

fn parse_choice<T>(field: Field, raw: &str) -> Result<Option<T>, InvalidFieldValue>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|e: T::Err| InvalidFieldValue {
        field,
        message: e.to_string(),
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Working copy of the add/edit form.
///
/// Every field may be blank here; [`validate`](Self::validate) decides
/// whether the values can be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormValues {
    /// Squirrel name.
    pub name: String,
    /// Selected species.
    pub species: Option<Species>,
    /// Location spotted.
    pub location: String,
    /// Selected size.
    pub size: Option<Size>,
    /// Selected color.
    pub color: Option<Color>,
    /// Selected behavior.
    pub behavior: Option<Behavior>,
    /// Date spotted; today when left blank.
    pub date_spotted: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Favorite flag; false when left blank.
    pub is_favorite: Option<bool>,
}

impl From<&Sighting> for FormValues {
    fn from(sighting: &Sighting) -> Self {
        let data = &sighting.data;
        Self {
            name: data.name.clone(),
            species: Some(data.species),
            location: data.location.clone(),
            size: data.size,
            color: data.color,
            behavior: data.behavior,
            date_spotted: Some(data.date_spotted),
            notes: data.notes.clone(),
            is_favorite: Some(data.is_favorite),
        }
    }
}

impl FormValues {
    /// Set one field from its text form.
    ///
    /// An empty `raw` clears the field. Option fields accept their labels
    /// case-insensitively, `dateSpotted` takes `YYYY-MM-DD`, `isFavorite`
    /// takes `true`/`false`/`yes`/`no`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFieldValue`] if `raw` does not fit the field. The
    /// field keeps its previous value in that case.
    pub fn set(&mut self, field: Field, raw: &str) -> Result<(), InvalidFieldValue> {
        let text = raw.trim();
        match field {
            Field::Name => self.name = text.to_string(),
            Field::Location => self.location = text.to_string(),
            Field::Species => self.species = parse_choice(field, text)?,
            Field::Size => self.size = parse_choice(field, text)?,
            Field::Color => self.color = parse_choice(field, text)?,
            Field::Behavior => self.behavior = parse_choice(field, text)?,
            Field::DateSpotted => {
                self.date_spotted = if text.is_empty() {
                    None
                } else {
                    Some(NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
                        InvalidFieldValue {
                            field,
                            message: format!("'{text}' is not a YYYY-MM-DD date"),
                        }
                    })?)
                };
            }
            Field::Notes => {
                self.notes = (!text.is_empty()).then(|| text.to_string());
            }
            Field::IsFavorite => {
                self.is_favorite = if text.is_empty() {
                    None
                } else {
                    Some(parse_flag(text).ok_or_else(|| InvalidFieldValue {
                        field,
                        message: format!("'{text}' is not true or false"),
                    })?)
                };
            }
        }
        Ok(())
    }

    /// Check the required fields.
    ///
    /// `name` and `location` must contain something other than whitespace and
    /// a species must be selected. Every failing field is reported, not just
    /// the first one.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors when any required field is missing.
    pub fn validate(&self) -> Result<SightingInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(Field::Name, "Please enter a name for the squirrel!");
        }
        if self.species.is_none() {
            errors.push(Field::Species, "Please select a species!");
        }
        let location = self.location.trim();
        if location.is_empty() {
            errors.push(Field::Location, "Please enter the location!");
        }

        match self.species {
            Some(species) if errors.0.is_empty() => Ok(SightingInput {
                name: name.to_string(),
                species,
                location: location.to_string(),
                size: self.size,
                color: self.color,
                behavior: self.behavior,
                date_spotted: self.date_spotted,
                notes: self
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
                is_favorite: self.is_favorite,
            }),
            _ => Err(errors),
        }
    }
}

/// Form values that passed validation.
///
/// Date and favorite flag are still optional; the controller fills them in
/// when it builds the store payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SightingInput {
    /// Squirrel name, trimmed and non-empty.
    pub name: String,
    /// Selected species.
    pub species: Species,
    /// Location, trimmed and non-empty.
    pub location: String,
    /// Selected size.
    pub size: Option<Size>,
    /// Selected color.
    pub color: Option<Color>,
    /// Selected behavior.
    pub behavior: Option<Behavior>,
    /// Date spotted, if the user gave one.
    pub date_spotted: Option<NaiveDate>,
    /// Notes, if any.
    pub notes: Option<String>,
    /// Favorite flag, if the user gave one.
    pub is_favorite: Option<bool>,
}

impl SightingInput {
    /// Build the store payload, defaulting the date to `today` and the
    /// favorite flag to false.
    #[must_use]
    pub fn into_data(self, today: NaiveDate) -> SightingData {
        SightingData {
            name: self.name,
            species: self.species,
            location: self.location,
            size: self.size,
            color: self.color,
            behavior: self.behavior,
            date_spotted: self.date_spotted.unwrap_or(today),
            notes: self.notes,
            is_favorite: self.is_favorite.unwrap_or(false),
        }
    }
}
