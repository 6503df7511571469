//! Authentication adapters.
//!
//! Implementations of the `AuthProvider` port:
//!
//! - `mock` - In-memory implementation that doesn't require external services
//! - `supabase::SupabaseAuthProvider` - Production GoTrue implementation

mod mock;

pub use mock::MockAuthProvider;
