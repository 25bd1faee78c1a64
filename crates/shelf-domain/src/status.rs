//! Closed enumerations attached to a book: reading status, rating, ownership

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a book sits in the reader's queue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingStatus {
    #[default]
    ToRead,
    Reading,
    Finished,
    OnHold,
    Abandoned,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 5] = [
        ReadingStatus::ToRead,
        ReadingStatus::Reading,
        ReadingStatus::Finished,
        ReadingStatus::OnHold,
        ReadingStatus::Abandoned,
    ];

    /// Canonical wire label (`to-read`, `on-hold`, ...)
    pub fn label(&self) -> &'static str {
        match self {
            ReadingStatus::ToRead => "to-read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Finished => "finished",
            ReadingStatus::OnHold => "on-hold",
            ReadingStatus::Abandoned => "abandoned",
        }
    }

    /// Human-facing name
    pub fn display_name(&self) -> &'static str {
        match self {
            ReadingStatus::ToRead => "To Read",
            ReadingStatus::Reading => "Reading",
            ReadingStatus::Finished => "Finished",
            ReadingStatus::OnHold => "On Hold",
            ReadingStatus::Abandoned => "Abandoned",
        }
    }

    /// Exact match against the canonical label, case-insensitive
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The reader's verdict on a book
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    #[default]
    None,
    Positive,
    Negative,
    Favourite,
}

impl Rating {
    /// Sort priority: favourite > positive > negative > none
    pub fn priority(&self) -> u8 {
        match self {
            Rating::Favourite => 3,
            Rating::Positive => 2,
            Rating::Negative => 1,
            Rating::None => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::None => "none",
            Rating::Positive => "positive",
            Rating::Negative => "negative",
            Rating::Favourite => "favourite",
        }
    }
}

/// How (or whether) the reader owns a copy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ownership {
    NotOwned,
    Physical,
    Digital,
    Loaned,
}

impl Ownership {
    pub fn label(&self) -> &'static str {
        match self {
            Ownership::NotOwned => "not-owned",
            Ownership::Physical => "physical",
            Ownership::Digital => "digital",
            Ownership::Loaned => "loaned",
        }
    }
}
