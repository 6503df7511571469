//! Auth module - identities, sessions and the session state machine.

mod credentials;
mod errors;
mod events;
mod identity;
mod state;

pub use credentials::{Credentials, MIN_PASSWORD_LENGTH};
pub use errors::AuthError;
pub use events::{AuthChangeEvent, AuthEventKind};
pub use identity::{AuthSession, Identity};
pub use state::{AuthState, IdentityTransition, SessionPhase};
