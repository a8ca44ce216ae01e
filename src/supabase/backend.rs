use super::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User record as returned by Supabase Auth.
///
/// Only `id` is interpreted locally; everything else is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            extra: Map::new(),
        }
    }
}

/// Identity operations used by the account deletion flow.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Resolve a bearer token to the user it was issued for.
    async fn get_user(&self, token: &str) -> Result<Option<User>, BackendError>;

    /// Permanently delete the user with the given id.
    async fn delete_user(&self, id: &str) -> Result<(), BackendError>;
}

/// Reachability check against the backend.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> Result<(), BackendError>;
}
