//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, validation errors)
//! - `movie` - Movie records, ratings, genres and the add-movie draft
//! - `auth` - Identities, sessions, auth events and the session state machine

pub mod auth;
pub mod foundation;
pub mod movie;
