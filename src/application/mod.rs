//! Application layer - coordinates the session and the collection.
//!
//! - `SessionManager` owns auth state and turns provider notifications into
//!   an ordered stream of session events.
//! - `CollectionController` consumes that stream and keeps the in-memory
//!   collection in step with the active storage backend.

mod collection_controller;
mod session_manager;

pub use collection_controller::{CollectionController, CollectionState};
pub use session_manager::{SessionError, SessionEvent, SessionEvents, SessionManager};
