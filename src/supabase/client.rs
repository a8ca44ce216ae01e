use super::{credentials::ServiceCredentials, error::ClientError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use tracing::debug;
use url::Url;

/// Connection handle to a Supabase project bound to a single API key.
///
/// Construction never touches the network; reqwest opens connections on the
/// first request. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: Url,
    api_key: SecretString,
    http: Client,
}

impl SupabaseClient {
    /// Build a handle for `base_url` authenticated with `api_key`.
    ///
    /// `timeout` bounds every request made through the handle; `None` leaves
    /// requests unbounded.
    ///
    /// # Errors
    /// Returns an error if the URL or key is empty, the URL does not parse, its
    /// scheme is not http(s), or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(ClientError::MissingUrl);
        }

        if api_key.expose_secret().is_empty() {
            return Err(ClientError::MissingKey);
        }

        let mut url = Url::parse(base_url)?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ClientError::UnsupportedScheme(other.to_string())),
        }

        // Endpoints are joined relative to the base, so self-hosted path
        // prefixes need a trailing slash to survive `Url::join`.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);

        let mut builder = Client::builder().user_agent(crate::APP_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        debug!("supabase client for {}", url);

        Ok(Self {
            base_url: url,
            api_key,
            http,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(super) fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }

    pub(super) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    pub(super) fn http(&self) -> &Client {
        &self.http
    }
}

/// The two process-wide handles.
#[derive(Debug, Clone)]
pub struct Clients {
    /// Anonymous-key handle, safe to use anywhere.
    pub public: Arc<SupabaseClient>,
    /// Service-role handle, server side only.
    pub admin: Arc<SupabaseClient>,
}

impl Clients {
    /// # Errors
    /// Returns an error if either handle cannot be constructed.
    pub fn new(
        credentials: &ServiceCredentials,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let public = SupabaseClient::new(
            &credentials.base_url,
            credentials.anon_key.clone(),
            timeout,
        )?;
        let admin = SupabaseClient::new(
            &credentials.base_url,
            credentials.service_role_key.clone(),
            timeout,
        )?;

        Ok(Self {
            public: Arc::new(public),
            admin: Arc::new(admin),
        })
    }
}
