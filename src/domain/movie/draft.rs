//! Add-movie form model with its defaults.

use chrono::{Datelike, Local};

use super::{default_genre, NewMovie, StarRating};
use crate::domain::foundation::ValidationError;

/// Raw form input for a new movie.
///
/// The year is kept as text because it comes straight from user input; text
/// that does not parse falls back to the current year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDraft {
    pub title: String,
    pub year: String,
    pub genre: String,
    pub rating: u8,
    pub watched: bool,
}

impl Default for MovieDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            year: current_year().to_string(),
            genre: default_genre().to_string(),
            rating: StarRating::default().value(),
            watched: false,
        }
    }
}

impl MovieDraft {
    /// Starts a draft with the given title and default values elsewhere.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Validates the draft into a [`NewMovie`].
    pub fn into_new_movie(self) -> Result<NewMovie, ValidationError> {
        let year = self.year.trim().parse::<i32>().unwrap_or_else(|_| current_year());
        NewMovie::new(self.title, year, self.genre, self.rating, self.watched)
    }
}

/// The current calendar year in local time.
pub fn current_year() -> i32 {
    Local::now().year()
}
