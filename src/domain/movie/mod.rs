//! Movie module - the collection's records and their value objects.

mod draft;
mod genre;
mod movie;
mod rating;

pub use draft::{current_year, MovieDraft};
pub use genre::{default_genre, is_recommended, GENRES};
pub use movie::{Movie, MovieUpdate, NewMovie};
pub use rating::StarRating;
