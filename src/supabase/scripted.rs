//! In-memory backend returning scripted results.
//!
//! Used by handler tests and available to integration tests so the request
//! flow can be exercised without a Supabase project.

use super::{
    backend::{HealthProbe, IdentityBackend, User},
    error::BackendError,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError},
};

#[derive(Debug, Default)]
struct Script {
    tokens: HashMap<String, User>,
    resolve_failures: HashMap<String, String>,
    anonymous: HashSet<String>,
    delete_failure: Option<String>,
    probe_failure: Option<String>,
    deleted: Vec<String>,
    get_user_calls: usize,
    delete_user_calls: usize,
}

#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `token` resolve to a user with `id`.
    #[must_use]
    pub fn with_user(self, token: &str, id: &str) -> Self {
        self.lock().tokens.insert(token.to_string(), User::new(id));
        self
    }

    /// Make resolving `token` fail with `message`.
    #[must_use]
    pub fn with_resolve_failure(self, token: &str, message: &str) -> Self {
        self.lock()
            .resolve_failures
            .insert(token.to_string(), message.to_string());
        self
    }

    /// Make `token` resolve successfully but to no user.
    #[must_use]
    pub fn with_no_user(self, token: &str) -> Self {
        self.lock().anonymous.insert(token.to_string());
        self
    }

    /// Make every delete fail with `message`.
    #[must_use]
    pub fn with_delete_failure(self, message: &str) -> Self {
        self.lock().delete_failure = Some(message.to_string());
        self
    }

    /// Make the health probe fail with `message`.
    #[must_use]
    pub fn with_probe_failure(self, message: &str) -> Self {
        self.lock().probe_failure = Some(message.to_string());
        self
    }

    /// Ids deleted so far, in order.
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.lock().deleted.clone()
    }

    #[must_use]
    pub fn get_user_calls(&self) -> usize {
        self.lock().get_user_calls
    }

    #[must_use]
    pub fn delete_user_calls(&self) -> usize {
        self.lock().delete_user_calls
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityBackend for ScriptedBackend {
    async fn get_user(&self, token: &str) -> Result<Option<User>, BackendError> {
        let mut script = self.lock();
        script.get_user_calls += 1;

        if let Some(message) = script.resolve_failures.get(token) {
            return Err(BackendError::Api {
                status: StatusCode::FORBIDDEN,
                message: message.clone(),
            });
        }

        if script.anonymous.contains(token) {
            return Ok(None);
        }

        match script.tokens.get(token) {
            Some(user) => Ok(Some(user.clone())),
            None => Err(BackendError::Api {
                status: StatusCode::FORBIDDEN,
                message: "invalid JWT: unable to parse or verify signature".to_string(),
            }),
        }
    }

    async fn delete_user(&self, id: &str) -> Result<(), BackendError> {
        let mut script = self.lock();
        script.delete_user_calls += 1;

        if let Some(message) = &script.delete_failure {
            return Err(BackendError::Api {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: message.clone(),
            });
        }

        let before = script.tokens.len();
        script.tokens.retain(|_, user| user.id != id);
        if script.tokens.len() == before {
            return Err(BackendError::Api {
                status: StatusCode::NOT_FOUND,
                message: "User not found".to_string(),
            });
        }

        script.deleted.push(id.to_string());
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for ScriptedBackend {
    async fn probe(&self) -> Result<(), BackendError> {
        match &self.lock().probe_failure {
            Some(message) => Err(BackendError::Api {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}
