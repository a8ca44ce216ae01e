//! # Farewell (Self-Service Account Deletion)
//!
//! `farewell` is a small HTTP service that lets an authenticated user delete
//! their own account from a Supabase project. All identity state lives in
//! Supabase Auth; this service only holds two API handles:
//!
//! - the **public** handle, bound to the anonymous key, used for health probes;
//! - the **admin** handle, bound to the service-role key, used to resolve the
//!   caller's bearer token and to delete the resolved user.
//!
//! The admin handle is built once at startup and injected into the router. It
//! is never exposed to callers and the service-role key is never logged.
//!
//! ## Error transparency
//!
//! Authentication failures are opaque (`401 Invalid token`, whatever the
//! backend said). Operational failures on the delete call are transparent
//! (`500` carrying the backend's message).

pub mod api;
pub mod cli;
pub mod supabase;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
