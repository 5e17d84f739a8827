//! Business objects shared by storage, validation and the HTTP layer.
//!
//! These types are independent of the wire format; the DTOs in
//! [`crate::entities`] map to and from them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date format used in path segments and blob names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// City
// =============================================================================

/// Cities a diary entry can belong to.
///
/// Parsing is case-sensitive and only accepts the exact variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Malaga,
    Granada,
    Sevilla,
    Cadiz,
    Almeria,
    Cordoba,
    Huelva,
    Jaen,
}

impl City {
    /// All supported cities in declaration order.
    pub const ALL: [City; 8] = [
        City::Malaga,
        City::Granada,
        City::Sevilla,
        City::Cadiz,
        City::Almeria,
        City::Cordoba,
        City::Huelva,
        City::Jaen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            City::Malaga => "Malaga",
            City::Granada => "Granada",
            City::Sevilla => "Sevilla",
            City::Cadiz => "Cadiz",
            City::Almeria => "Almeria",
            City::Cordoba => "Cordoba",
            City::Huelva => "Huelva",
            City::Jaen => "Jaen",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a supported city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCity(pub String);

impl fmt::Display for UnknownCity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown city: {}", self.0)
    }
}

impl std::error::Error for UnknownCity {}

impl FromStr for City {
    type Err = UnknownCity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::ALL
            .iter()
            .copied()
            .find(|city| city.as_str() == s)
            .ok_or_else(|| UnknownCity(s.to_string()))
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user. The nickname is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub nickname: String,
    pub password: String,
    pub city: City,
    pub name: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub registration_date: DateTime<Utc>,
}

// =============================================================================
// News
// =============================================================================

/// Address of a news item: its diary entry `(city, date)` plus its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NewsKey {
    pub city: City,
    pub date: NaiveDate,
    pub id: Uuid,
}

impl NewsKey {
    pub fn new(city: City, date: NaiveDate, id: Uuid) -> Self {
        Self { city, date, id }
    }

    /// Blob name of the full-size image attached to this news.
    pub fn blob_name(&self) -> String {
        format!(
            "{};{};{}",
            self.city,
            self.date.format(DATE_FORMAT),
            self.id
        )
    }

    /// Blob name of the thumbnail derived from the full-size image.
    pub fn thumbnail_blob_name(&self) -> String {
        format!("thumbnail;{}", self.blob_name())
    }
}

/// A news entry posted to a diary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub city: City,
    pub date: NaiveDate,
    pub rating: i64,
}

impl News {
    /// Create a fresh news item with a generated id and zero rating.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
        city: City,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            author: author.into(),
            city,
            date,
            rating: 0,
        }
    }

    pub fn key(&self) -> NewsKey {
        NewsKey::new(self.city, self.date, self.id)
    }

    /// Two news are duplicates when they share diary entry, title and author.
    pub fn same_content(&self, other: &News) -> bool {
        self.city == other.city
            && self.date == other.date
            && self.title == other.title
            && self.author == other.author
    }
}
