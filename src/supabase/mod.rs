//! Supabase Auth client.
//!
//! `client` builds API handles, `backend` declares the operations the service
//! depends on, `auth` implements them over the GoTrue REST API and
//! `scripted` provides an in-memory substitute for tests.

mod auth;
pub mod backend;
pub mod client;
pub mod credentials;
pub mod error;
pub mod scripted;

pub use self::backend::{HealthProbe, IdentityBackend, User};
pub use self::client::{Clients, SupabaseClient};
pub use self::credentials::ServiceCredentials;
pub use self::error::{BackendError, ClientError};
