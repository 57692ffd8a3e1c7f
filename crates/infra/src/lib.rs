//! Infrastructure layer: identity provider, directory store, sessions, and
//! the account workflows that orchestrate them.

pub mod accounts;
pub mod directory;
pub mod identity;
pub mod sessions;

pub use accounts::{
    AccountService, LoginError, LoginSuccess, ReviewError, SignupError, SignupOutcome,
};
pub use directory::{DirectoryStore, InMemoryDirectory, PostgresDirectory, StoreError};
pub use identity::{
    Identity, IdentityError, IdentityProvider, InMemoryIdentityProvider, PostgresIdentityProvider,
};
pub use sessions::{InMemorySessionStore, SessionStore};
