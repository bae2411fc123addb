//! Core sighting types for squirrel-tracker.
//!
//! This module defines the record kept for every observed squirrel, the
//! payload sent to the record store, and the fixed option sets offered for
//! species, size, color and behavior.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value that is not part of one of the fixed option sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownOption {
    /// Which option set was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Comma-separated list of accepted labels.
    pub expected: String,
}

/// Declares a closed set of labelled options.
///
/// Each variant carries the human label used on the wire and in the UI.
/// Parsing is case-insensitive on that label.
macro_rules! option_set {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( #[doc = $label] #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            /// Every option, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The display label for this option.
            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownOption {
                        kind: $kind,
                        value: s.to_string(),
                        expected: Self::ALL
                            .iter()
                            .map(|option| option.label())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }
    };
}

option_set! {
    /// Squirrel species a sighting can be filed under.
    Species, "species" {
        Gray => "Gray Squirrel",
        Red => "Red Squirrel",
        Flying => "Flying Squirrel",
        Ground => "Ground Squirrel",
        Fox => "Fox Squirrel",
        Chipmunk => "Chipmunk",
        Tree => "Tree Squirrel",
        Other => "Other",
    }
}

option_set! {
    /// Rough size of the observed squirrel.
    Size, "size" {
        Small => "Small",
        Medium => "Medium",
        Large => "Large",
    }
}

option_set! {
    /// Dominant fur color.
    Color, "color" {
        Gray => "Gray",
        Brown => "Brown",
        Red => "Red",
        Black => "Black",
        White => "White",
        Mixed => "Mixed",
    }
}

option_set! {
    /// What the squirrel was doing when spotted.
    Behavior, "behavior" {
        Foraging => "Foraging for nuts",
        Climbing => "Climbing trees",
        Nesting => "Building nest",
        Playing => "Playing",
        Sleeping => "Sleeping",
        Eating => "Eating",
        Running => "Running",
        Jumping => "Jumping between trees",
        Burying => "Burying food",
        Grooming => "Grooming",
    }
}

/// Store-assigned identifier of a persisted sighting.
///
/// Identifiers are never reused, even after the row behind them is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SightingId(i64);

impl SightingId {
    /// Wrap a raw store identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw store identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SightingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SightingId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Everything a sighting holds apart from its identifier.
///
/// This is the payload handed to the record store on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingData {
    /// Name given to the squirrel.
    pub name: String,
    /// Species the sighting is filed under.
    pub species: Species,
    /// Where the squirrel was spotted.
    pub location: String,
    /// Observed size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Observed fur color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Observed behavior.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Behavior>,
    /// Calendar date of the sighting.
    pub date_spotted: NaiveDate,
    /// Free-form observations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Whether the user marked this sighting as a favorite.
    #[serde(default)]
    pub is_favorite: bool,
}

/// A persisted squirrel sighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sighting {
    /// Identifier assigned by the record store.
    pub id: SightingId,
    /// The recorded fields.
    #[serde(flatten)]
    pub data: SightingData,
}

impl Sighting {
    /// Pair store-assigned id with its data.
    #[must_use]
    pub fn new(id: SightingId, data: SightingData) -> Self {
        Self { id, data }
    }

    /// Copy of this sighting's data with the favorite flag flipped.
    #[must_use]
    pub fn with_favorite_toggled(&self) -> SightingData {
        SightingData {
            is_favorite: !self.data.is_favorite,
            ..self.data.clone()
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A minimal sighting for tests.
    pub fn data(name: &str, species: Species) -> SightingData {
        SightingData {
            name: name.to_string(),
            species,
            location: "Central Park".to_string(),
            size: None,
            color: None,
            behavior: None,
            date_spotted: NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date"),
            notes: None,
            is_favorite: false,
        }
    }

    pub fn sighting(id: i64, name: &str, species: Species) -> Sighting {
        Sighting::new(SightingId::new(id), data(name, species))
    }
}
