//! Movie record and its write-side shapes.

use serde::{Deserialize, Serialize};

use super::StarRating;
use crate::domain::foundation::{MovieId, ValidationError};

/// A movie in the collection.
///
/// The id is assigned by the storage backend and never changes; every other
/// field can be updated independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub rating: StarRating,
    pub watched: bool,
}

impl Movie {
    /// Builds a stored movie from a validated draft and a backend-assigned id.
    pub fn from_new(id: MovieId, movie: NewMovie) -> Self {
        Self {
            id,
            title: movie.title,
            year: movie.year,
            genre: movie.genre,
            rating: movie.rating,
            watched: movie.watched,
        }
    }

    /// Returns a copy with the fields present in `update` replaced.
    pub fn with_update(&self, update: &MovieUpdate) -> Self {
        let mut movie = self.clone();
        if let Some(title) = &update.title {
            movie.title = title.clone();
        }
        if let Some(year) = update.year {
            movie.year = year;
        }
        if let Some(genre) = &update.genre {
            movie.genre = genre.clone();
        }
        if let Some(rating) = update.rating {
            movie.rating = rating;
        }
        if let Some(watched) = update.watched {
            movie.watched = watched;
        }
        movie
    }

    /// Card subtitle, e.g. `1999 • Action`.
    pub fn subtitle(&self) -> String {
        format!("{} • {}", self.year, self.genre)
    }

    /// Watched badge text.
    pub fn status_label(&self) -> &'static str {
        if self.watched {
            "Watched"
        } else {
            "Unwatched"
        }
    }
}

/// A movie that has not been stored yet (no id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    title: String,
    year: i32,
    genre: String,
    rating: StarRating,
    watched: bool,
}

impl NewMovie {
    /// Creates a new movie, trimming the title.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the trimmed title is empty
    /// - `OutOfRange` if the rating is outside 1..=5
    pub fn new(
        title: impl AsRef<str>,
        year: i32,
        genre: impl Into<String>,
        rating: u8,
        watched: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: normalize_title(title.as_ref())?,
            year,
            genre: genre.into(),
            rating: StarRating::try_new(rating)?,
            watched,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    pub fn rating(&self) -> StarRating {
        self.rating
    }

    pub fn watched(&self) -> bool {
        self.watched
    }
}

/// Partial set of movie fields for an update. Absent fields are left alone.
///
/// Serializes to only the present fields, which is also the PATCH body sent
/// to the remote table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MovieUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<StarRating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    watched: Option<bool>,
}

impl MovieUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title, trimming it.
    pub fn title(mut self, title: impl AsRef<str>) -> Result<Self, ValidationError> {
        self.title = Some(normalize_title(title.as_ref())?);
        Ok(self)
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn rating(mut self, rating: u8) -> Result<Self, ValidationError> {
        self.rating = Some(StarRating::try_new(rating)?);
        Ok(self)
    }

    pub fn watched(mut self, watched: bool) -> Self {
        self.watched = Some(watched);
        self
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.rating.is_none()
            && self.watched.is_none()
    }
}

fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("title"));
    }
    Ok(trimmed.to_string())
}
