//! Movie Collection - a personal movie tracker.
//!
//! Movies are persisted either locally (a JSON blob in a key-value store) or
//! in a Supabase table gated by email/password auth. The collection reloads
//! whenever the signed-in identity changes.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
