//! Row shapes for the `movies` table.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MovieId, UserId};
use crate::domain::movie::{Movie, NewMovie, StarRating};
use crate::ports::StorageError;

/// The `id` column may be text (uuid) or a bigint identity.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Number(i64),
}

impl RowId {
    fn into_string(self) -> String {
        match self {
            RowId::Text(id) => id,
            RowId::Number(id) => id.to_string(),
        }
    }
}

/// A `movies` row as PostgREST returns it.
///
/// `user_id` and `created_at` are not read; unknown columns are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct MovieRow {
    id: RowId,
    title: String,
    year: i32,
    genre: String,
    rating: u8,
    watched: bool,
}

impl MovieRow {
    pub fn into_movie(self) -> Result<Movie, StorageError> {
        let id = MovieId::new(self.id.into_string())
            .map_err(|e| StorageError::Deserialization(e.to_string()))?;
        let rating = StarRating::try_new(self.rating)
            .map_err(|e| StorageError::Deserialization(e.to_string()))?;

        Ok(Movie {
            id,
            title: self.title,
            year: self.year,
            genre: self.genre,
            rating,
            watched: self.watched,
        })
    }
}

/// Body of an insert; ownership is stamped with the caller's user id.
#[derive(Debug, Serialize)]
pub(crate) struct InsertRow<'a> {
    title: &'a str,
    year: i32,
    genre: &'a str,
    rating: u8,
    watched: bool,
    user_id: &'a str,
}

impl<'a> InsertRow<'a> {
    pub fn new(movie: &'a NewMovie, user_id: &'a UserId) -> Self {
        Self {
            title: movie.title(),
            year: movie.year(),
            genre: movie.genre(),
            rating: movie.rating().value(),
            watched: movie.watched(),
            user_id: user_id.as_str(),
        }
    }
}

/// Normalizes a batch of rows, failing on the first bad one.
pub(crate) fn into_movies(rows: Vec<MovieRow>) -> Result<Vec<Movie>, StorageError> {
    rows.into_iter().map(MovieRow::into_movie).collect()
}
