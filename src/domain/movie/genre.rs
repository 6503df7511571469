//! Recommended genre list.
//!
//! Genres are plain strings at the data layer; this list only drives form
//! defaults and hints.

/// Genres offered when adding a movie, in display order.
pub const GENRES: [&str; 10] = [
    "Action",
    "Comedy",
    "Drama",
    "Horror",
    "Romance",
    "Sci-Fi",
    "Thriller",
    "Documentary",
    "Animation",
    "Other",
];

/// Genre preselected for a new movie.
pub fn default_genre() -> &'static str {
    GENRES[0]
}

/// Returns true if `genre` is one of the recommended genres (case-sensitive).
pub fn is_recommended(genre: &str) -> bool {
    GENRES.contains(&genre)
}
